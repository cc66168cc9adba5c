// Procedurally generated city-map landing page.
// One static mesh holds the whole map (backdrop, river, roads, lots);
// traffic dots rebuild every frame from the ECS world, and egui draws
// the profile card, legend, and social pins on top.

mod engine;
mod world;

use std::path::Path;
use std::time::{Duration, Instant};

use bevy_ecs::prelude::World as EcsWorld;
use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Window},
};

use engine::camera::MapCamera;
use engine::input::InputState;
use engine::mesh::{GpuVertex, MeshBuilder};
use engine::overlay::{MarkerOverlay, OverlayActions};
use engine::scene::{build_traffic_mesh, build_world_mesh};
use engine::systems::{advance_traffic, respawn_traffic};
use engine::theme::{load_theme, save_theme, startup_theme, Theme, PREFS_FILE};
use world::markers::FixedLayout;
use world::{random_seed, WorldConfig, WorldState};

// ============================================================================
// UNIFORM DATA (camera only)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    // Static map geometry, rebuilt on regeneration and theme change
    map_vertex_buffer: wgpu::Buffer,
    map_index_buffer: wgpu::Buffer,
    map_index_count: u32,

    // Traffic dot geometry, rewritten every frame
    traffic_vertex_buffer: wgpu::Buffer,
    traffic_index_buffer: wgpu::Buffer,
    traffic_index_count: u32,

    world: WorldState,
    ecs: EcsWorld,
    camera: MapCamera,
    input: InputState,
    overlay: MarkerOverlay,
    theme: Theme,

    last_update: Instant,
    last_mouse: Vec2,
    pinch_distance: Option<f32>,
    touch_anchor: Option<Vec2>,
}

impl State {
    async fn new(window: std::sync::Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_map.wgsl").into()),
        });

        let uniforms = Uniforms {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    // Layered translucent fills need ordinary alpha blending
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // 2D quads are emitted in both windings, so no culling
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let theme = startup_theme(load_theme(Path::new(PREFS_FILE)), window.theme());

        let scale = window.scale_factor() as f32;
        let view = Vec2::new(size.width as f32, size.height as f32) / scale;

        // First generation runs before any overlay layout exists, so the
        // fixed exclusion geometry stands in for the measured rects.
        let mut world = WorldState::new(random_seed(), view, WorldConfig::default());
        world.generate_all(&FixedLayout { map: world.map });

        let mut ecs = EcsWorld::new();
        respawn_traffic(&mut ecs, &world.roads, world.seed);

        let mut camera = MapCamera::new(view, world.map);
        let (min, max) = world.marker_bounds();
        camera.start_fit(
            min,
            max,
            Duration::from_millis(world.cfg.animation_duration_ms),
            Instant::now(),
        );

        let mesh = build_world_mesh(&world, theme.palette());
        let map_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Map Vertex Buffer"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let map_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Map Index Buffer"),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let map_index_count = mesh.index_count();

        let traffic_mesh = build_traffic_mesh(&mut ecs, &world.roads, theme.palette());
        let (traffic_vertex_buffer, traffic_index_buffer) =
            create_traffic_buffers(&device, &traffic_mesh);

        let overlay = MarkerOverlay::new(&window, &device, surface_format);

        Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            map_vertex_buffer,
            map_index_buffer,
            map_index_count,
            traffic_vertex_buffer,
            traffic_index_buffer,
            traffic_index_count: 0,
            world,
            ecs,
            camera,
            input: InputState::new(),
            overlay,
            theme,
            last_update: Instant::now(),
            last_mouse: Vec2::ZERO,
            pinch_distance: None,
            touch_anchor: None,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, window: &Window) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            // Same seed, new extents: the map regenerates to fill the
            // resized viewport without reshuffling its contents.
            let scale = window.scale_factor() as f32;
            let view = Vec2::new(new_size.width as f32, new_size.height as f32) / scale;
            let layout = self.overlay.layout(&self.camera, self.world.map);
            self.world.resize(view, &layout);
            self.camera.set_extents(view, self.world.map);

            respawn_traffic(&mut self.ecs, &self.world.roads, self.world.seed);
            self.rebuild_map_mesh();
            self.rebuild_traffic_buffers();
        }
    }

    /// New seed, full regeneration, then a fit animation over the new
    /// marker spread.
    fn reshuffle(&mut self) {
        let layout = self.overlay.layout(&self.camera, self.world.map);
        self.world.reshuffle(&layout);

        respawn_traffic(&mut self.ecs, &self.world.roads, self.world.seed);
        self.rebuild_map_mesh();
        self.rebuild_traffic_buffers();

        let (min, max) = self.world.marker_bounds();
        self.camera.start_fit(
            min,
            max,
            Duration::from_millis(self.world.cfg.animation_duration_ms),
            Instant::now(),
        );
    }

    fn apply_actions(&mut self, actions: OverlayActions) {
        if actions.toggle_theme {
            self.theme = self.theme.toggled();
            save_theme(Path::new(PREFS_FILE), self.theme);
            self.rebuild_map_mesh();
        }
        if actions.toggle_edit {
            self.overlay.toggle_edit_mode();
        }
        if actions.reshuffle {
            self.reshuffle();
        }
    }

    fn rebuild_map_mesh(&mut self) {
        let mesh = build_world_mesh(&self.world, self.theme.palette());
        self.map_vertex_buffer =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Map Vertex Buffer"),
                    contents: mesh.vertex_bytes(),
                    usage: wgpu::BufferUsages::VERTEX,
                });
        self.map_index_buffer =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Map Index Buffer"),
                    contents: mesh.index_bytes(),
                    usage: wgpu::BufferUsages::INDEX,
                });
        self.map_index_count = mesh.index_count();
    }

    fn rebuild_traffic_buffers(&mut self) {
        let mesh = build_traffic_mesh(&mut self.ecs, &self.world.roads, self.theme.palette());
        let (vertex_buffer, index_buffer) = create_traffic_buffers(&self.device, &mesh);
        self.traffic_vertex_buffer = vertex_buffer;
        self.traffic_index_buffer = index_buffer;
        self.traffic_index_count = 0;
    }

    fn update(&mut self, window: &Window) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;

        let scale = window.scale_factor() as f32;
        let mouse = self.input.mouse_position / scale;

        let mut actions = OverlayActions::default();
        actions.reshuffle = self.input.was_key_pressed(KeyCode::KeyR);
        actions.toggle_theme = self.input.was_key_pressed(KeyCode::KeyM);
        actions.toggle_edit = self.input.was_key_pressed(KeyCode::KeyE);
        self.apply_actions(actions);

        // Left-drag pans, unless the cursor sits on an overlay element
        let panning = self.input.left_held()
            && !self.overlay.pointer_over_ui()
            && self.input.touch_count() == 0;
        if panning {
            let delta = mouse - self.last_mouse;
            if delta != Vec2::ZERO {
                self.camera.pan(delta);
            }
        }
        self.last_mouse = mouse;
        window.set_cursor(if panning {
            CursorIcon::Grabbing
        } else {
            CursorIcon::Grab
        });

        // Each wheel click applies one fixed zoom step at the cursor
        let steps = self.input.wheel_steps();
        if steps != 0 && !self.overlay.pointer_over_ui() {
            let factor = if steps > 0 {
                1.1f32.powi(steps)
            } else {
                0.9f32.powi(-steps)
            };
            self.camera.zoom_at(mouse, factor);
        }

        // Touch: two fingers pinch-zoom about their midpoint, one pans
        let touches: Vec<Vec2> = self
            .input
            .touch_points()
            .iter()
            .map(|p| *p / scale)
            .collect();
        match touches.len() {
            2 => {
                let dist = touches[0].distance(touches[1]);
                let center = (touches[0] + touches[1]) / 2.0;
                if let Some(prev) = self.pinch_distance {
                    if prev > 1.0 {
                        self.camera.zoom_at(center, dist / prev);
                    }
                }
                self.pinch_distance = Some(dist);
                self.touch_anchor = None;
            }
            1 => {
                if let Some(prev) = self.touch_anchor {
                    self.camera.pan(touches[0] - prev);
                }
                self.touch_anchor = Some(touches[0]);
                self.pinch_distance = None;
            }
            _ => {
                self.pinch_distance = None;
                self.touch_anchor = None;
            }
        }

        advance_traffic(&mut self.ecs, dt);
        self.camera.tick(now);
        self.input.end_frame();
    }

    fn render(&mut self, window: &Window) -> Result<OverlayActions, wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = Uniforms {
            view_proj: self.camera.view_projection().to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        // Traffic dots move every frame; rewrite their mesh before the pass
        let traffic_mesh =
            build_traffic_mesh(&mut self.ecs, &self.world.roads, self.theme.palette());
        if !traffic_mesh.is_empty() {
            self.queue
                .write_buffer(&self.traffic_vertex_buffer, 0, traffic_mesh.vertex_bytes());
            self.queue
                .write_buffer(&self.traffic_index_buffer, 0, traffic_mesh.index_bytes());
        }
        self.traffic_index_count = traffic_mesh.index_count();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.theme.palette().background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            render_pass.set_vertex_buffer(0, self.map_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.map_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.map_index_count, 0, 0..1);

            if self.traffic_index_count > 0 {
                render_pass.set_vertex_buffer(0, self.traffic_vertex_buffer.slice(..));
                render_pass.set_index_buffer(
                    self.traffic_index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..self.traffic_index_count, 0, 0..1);
            }
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let actions = self.overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &screen_descriptor,
            &self.camera,
            &mut self.world.markers,
            self.theme,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(actions)
    }
}

/// Fixed-capacity buffers sized from a freshly built traffic mesh; the
/// dot population only changes on regeneration, so per-frame writes fit.
fn create_traffic_buffers(device: &wgpu::Device, mesh: &MeshBuilder) -> (wgpu::Buffer, wgpu::Buffer) {
    let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Traffic Vertex Buffer"),
        size: (mesh.vertex_bytes().len().max(std::mem::size_of::<GpuVertex>())) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Traffic Index Buffer"),
        size: (mesh.index_bytes().len().max(std::mem::size_of::<u32>())) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    (vertex_buffer, index_buffer)
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().unwrap();

    let window_attributes = Window::default_attributes()
        .with_title("Alex Carter - Creative Technologist")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

    let window = std::sync::Arc::new(event_loop.create_window(window_attributes).unwrap());

    let mut state = pollster::block_on(State::new(window.clone()));
    let mut frame_count = 0;
    let mut last_fps_update = Instant::now();

    #[allow(deprecated)]
    event_loop
        .run(move |event, control_flow| {
            match event {
                WinitEvent::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == window.id() => {
                    let egui_response = state.overlay.handle_window_event(&window, event);
                    if !egui_response.consumed {
                        state.input.process_event(event);
                    }

                    match event {
                        WindowEvent::CloseRequested
                        | WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    state: ElementState::Pressed,
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    ..
                                },
                            ..
                        } => control_flow.exit(),
                        WindowEvent::Resized(physical_size) => {
                            state.resize(*physical_size, &window);
                        }
                        WindowEvent::RedrawRequested => {
                            state.update(&window);
                            match state.render(&window) {
                                Ok(actions) => state.apply_actions(actions),
                                Err(wgpu::SurfaceError::Lost) => {
                                    state.resize(state.size, &window)
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => control_flow.exit(),
                                Err(e) => log::warn!("surface error: {:?}", e),
                            }

                            frame_count += 1;
                            let now = Instant::now();
                            if (now - last_fps_update).as_secs_f32() >= 1.0 {
                                log::debug!(
                                    "FPS: {} | roads: {} | markers: {}",
                                    frame_count,
                                    state.world.roads.len(),
                                    state.world.markers.len()
                                );
                                frame_count = 0;
                                last_fps_update = now;
                            }
                        }
                        _ => {}
                    }
                }
                WinitEvent::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
}

// egui overlay pass: profile card, legend, and the social-link pins.
//
// Pins are screen-anchored widgets bound to world coordinates: their
// screen position is recomputed from the live camera every frame, so
// panning and zooming never desynchronize them. In edit mode each pin
// grows a drag handle; dragging moves its world coordinate by the screen
// delta divided by the current zoom.

use egui::epaint::Shadow;
use glam::Vec2;

use super::camera::MapCamera;
use super::theme::Theme;
use crate::world::markers::{CircleZone, LayoutProvider, Marker, RectZone};
use crate::world::{LINKS, PROFILE_CHIPS, PROFILE_NAME, PROFILE_ROLE, PROFILE_TAGLINE};

/// Pin diameter in world units (screen size is this times zoom).
pub const PIN_SIZE: f32 = 68.0;
/// Height of the card's pin stem, used for the exclusion circle.
const CARD_PIN_HEIGHT: f32 = 60.0;

/// What the user did on the overlay this frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlayActions {
    pub reshuffle: bool,
    pub toggle_theme: bool,
    pub toggle_edit: bool,
}

pub struct MarkerOverlay {
    pub edit_mode: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    /// Last-frame screen rects, feeding the exclusion zones.
    card_rect: Option<egui::Rect>,
    legend_rect: Option<egui::Rect>,
    /// Whether the pointer sat over any overlay element last frame; the
    /// pan handler checks this before grabbing the map.
    pointer_over_ui: bool,
}

impl MarkerOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            edit_mode: false,
            egui_ctx,
            egui_state,
            egui_renderer,
            card_rect: None,
            legend_rect: None,
            pointer_over_ui: false,
        }
    }

    pub fn toggle_edit_mode(&mut self) {
        self.edit_mode = !self.edit_mode;
    }

    pub fn pointer_over_ui(&self) -> bool {
        self.pointer_over_ui
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Exclusion-zone geometry snapshot for the marker placement stage,
    /// in world coordinates. Rects not seen yet fall back to fixed
    /// geometry.
    pub fn layout<'a>(&'a self, camera: &'a MapCamera, map: Vec2) -> OverlayLayout<'a> {
        OverlayLayout {
            overlay: self,
            camera,
            map,
        }
    }

    fn apply_style(&self, theme: Theme) {
        let mut visuals = match theme {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        };
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        self.egui_ctx.set_visuals(visuals);
    }

    /// Render one egui frame: card, legend, and pins. Returns the button
    /// presses so the caller can run the same paths as the keyboard
    /// shortcuts.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        camera: &MapCamera,
        markers: &mut [Marker],
        theme: Theme,
    ) -> OverlayActions {
        self.apply_style(theme);

        let mut actions = OverlayActions::default();
        let edit_mode = self.edit_mode;
        let mut card_rect = None;
        let mut legend_rect = None;

        let raw_input = self.egui_state.take_egui_input(window);

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            card_rect = Some(draw_card(ctx, camera, edit_mode, theme, &mut actions));
            legend_rect = Some(draw_legend(ctx, camera.view, theme));
            draw_pins(ctx, camera, markers, edit_mode, theme);
        });

        self.card_rect = card_rect;
        self.legend_rect = legend_rect;
        self.pointer_over_ui =
            self.egui_ctx.is_pointer_over_area() || self.egui_ctx.wants_pointer_input();

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        actions
    }
}

/// Profile card, centered on the map's world center. Like the pins it is
/// anchored in world space, so its frame, margins, and type all scale
/// with the camera zoom.
fn draw_card(
    ctx: &egui::Context,
    camera: &MapCamera,
    edit_mode: bool,
    theme: Theme,
    actions: &mut OverlayActions,
) -> egui::Rect {
    let center = camera.world_to_screen(camera.map / 2.0);
    let zoom = camera.zoom();
    let fill = match theme {
        Theme::Dark => egui::Color32::from_rgba_premultiplied(10, 14, 22, 230),
        Theme::Light => egui::Color32::from_rgba_premultiplied(248, 250, 252, 235),
    };

    let response = egui::Area::new(egui::Id::new("profile_card"))
        .fixed_pos(egui::pos2(center.x, center.y))
        .pivot(egui::Align2::CENTER_CENTER)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(fill)
                .inner_margin(egui::Margin::same(18.0 * zoom))
                .rounding(10.0 * zoom)
                .show(ui, |ui| {
                    ui.set_max_width(340.0 * zoom);
                    ui.spacing_mut().item_spacing *= zoom;

                    ui.label(
                        egui::RichText::new(PROFILE_NAME)
                            .strong()
                            .size(20.0 * zoom),
                    );
                    ui.label(
                        egui::RichText::new(PROFILE_ROLE)
                            .strong()
                            .size(13.0 * zoom),
                    );
                    ui.add_space(6.0 * zoom);
                    ui.label(egui::RichText::new(PROFILE_TAGLINE).size(12.5 * zoom));

                    ui.add_space(8.0 * zoom);
                    ui.horizontal_wrapped(|ui| {
                        for chip in PROFILE_CHIPS {
                            ui.label(
                                egui::RichText::new(chip).italics().size(10.5 * zoom),
                            );
                        }
                    });

                    ui.separator();
                    ui.horizontal(|ui| {
                        let button = |label: &str| {
                            egui::Button::new(egui::RichText::new(label).size(12.5 * zoom))
                        };
                        if ui.add(button("Recreate map  [R]")).clicked() {
                            actions.reshuffle = true;
                        }
                        let edit_label = if edit_mode {
                            "Done editing  [E]"
                        } else {
                            "Edit markers  [E]"
                        };
                        if ui.add(button(edit_label)).clicked() {
                            actions.toggle_edit = true;
                        }
                        let mode_label = match theme {
                            Theme::Dark => "Light mode  [M]",
                            Theme::Light => "Dark mode  [M]",
                        };
                        if ui.add(button(mode_label)).clicked() {
                            actions.toggle_theme = true;
                        }
                    });

                    ui.add_space(4.0 * zoom);
                    ui.label(
                        egui::RichText::new(
                            "Tip: move and zoom around the map to explore different areas.",
                        )
                        .weak()
                        .size(10.0 * zoom),
                    );
                });
        });

    response.response.rect
}

/// Map key, pinned to the bottom-left viewport corner.
fn draw_legend(ctx: &egui::Context, view: Vec2, theme: Theme) -> egui::Rect {
    let palette = theme.palette();
    let swatch = |c: [f32; 4]| {
        egui::Color32::from_rgba_unmultiplied(
            (c[0] * 255.0) as u8,
            (c[1] * 255.0) as u8,
            (c[2] * 255.0) as u8,
            255,
        )
    };

    let response = egui::Area::new(egui::Id::new("legend"))
        .fixed_pos(egui::pos2(12.0, view.y - 12.0))
        .pivot(egui::Align2::LEFT_BOTTOM)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 140))
                .inner_margin(egui::Margin::same(8.0))
                .rounding(6.0)
                .show(ui, |ui| {
                    for (color, label) in [
                        (swatch(palette.road_center), "Road"),
                        (swatch(palette.river_body), "River"),
                        (swatch(palette.park_fill(1.0)), "Park"),
                        (swatch(palette.building_fill(1.0)), "Building"),
                    ] {
                        ui.horizontal(|ui| {
                            let (rect, _) = ui
                                .allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                            ui.painter().circle_filled(rect.center(), 4.0, color);
                            ui.label(egui::RichText::new(label).small());
                        });
                    }
                });
        });

    response.response.rect
}

/// One pin per placed social link. Clicking opens the URL; in edit mode
/// dragging moves the pin's world anchor instead.
fn draw_pins(
    ctx: &egui::Context,
    camera: &MapCamera,
    markers: &mut [Marker],
    edit_mode: bool,
    theme: Theme,
) {
    let zoom = camera.zoom();

    for marker in markers.iter_mut() {
        let Some(link_idx) = marker.link else {
            continue;
        };
        let link = &LINKS[link_idx];
        let screen = camera.world_to_screen(marker.pos);
        let size = egui::vec2(PIN_SIZE * zoom, PIN_SIZE * zoom * 1.3);

        egui::Area::new(egui::Id::new(("pin", link_idx)))
            .fixed_pos(egui::pos2(screen.x, screen.y))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .show(ctx, |ui| {
                let sense = if edit_mode {
                    egui::Sense::click_and_drag()
                } else {
                    egui::Sense::click()
                };
                let (rect, response) = ui.allocate_exact_size(size, sense);
                let painter = ui.painter();

                let head = egui::pos2(rect.center().x, rect.top() + rect.width() / 2.0);
                let head_r = rect.width() / 2.0;
                let (fill, stroke_color) = match theme {
                    Theme::Dark => (
                        egui::Color32::from_rgb(16, 42, 52),
                        egui::Color32::from_rgb(101, 245, 255),
                    ),
                    Theme::Light => (
                        egui::Color32::from_rgb(235, 243, 250),
                        egui::Color32::from_rgb(60, 130, 200),
                    ),
                };

                // Stem down to the world anchor, then the head disc with
                // the link's initial.
                painter.line_segment(
                    [head, rect.center_bottom()],
                    egui::Stroke::new(2.0 * zoom, stroke_color),
                );
                painter.circle(head, head_r, fill, egui::Stroke::new(2.0, stroke_color));
                painter.text(
                    head,
                    egui::Align2::CENTER_CENTER,
                    link.name.chars().next().unwrap_or('?'),
                    egui::FontId::proportional(head_r),
                    stroke_color,
                );

                if edit_mode {
                    // Drag-handle ring marks the pin as movable.
                    painter.circle_stroke(
                        head,
                        head_r + 4.0,
                        egui::Stroke::new(1.5, egui::Color32::from_rgba_unmultiplied(255, 220, 0, 200)),
                    );
                    if response.dragged() {
                        let delta = response.drag_delta();
                        marker.pos += Vec2::new(delta.x, delta.y) / zoom;
                    }
                } else if response.clicked() {
                    ctx.open_url(egui::OpenUrl::new_tab(link.url));
                }

                response.on_hover_text(link.name);
            });
    }
}

/// `LayoutProvider` view over the overlay's last-frame rects and the
/// current camera.
pub struct OverlayLayout<'a> {
    overlay: &'a MarkerOverlay,
    camera: &'a MapCamera,
    map: Vec2,
}

impl LayoutProvider for OverlayLayout<'_> {
    fn card_zone(&self) -> CircleZone {
        let center = self.map / 2.0;
        let Some(rect) = self.overlay.card_rect else {
            return CircleZone {
                center,
                radius: 340.0,
            };
        };

        // Bounding circle over the card and its pin stem, plus padding,
        // converted from screen to world scale.
        let half = Vec2::new(rect.width(), rect.height()) / 2.0;
        let radius = half.length().max(half.y + CARD_PIN_HEIGHT) + 40.0;
        CircleZone {
            center,
            radius: radius / self.camera.zoom(),
        }
    }

    fn legend_zone(&self) -> RectZone {
        let Some(rect) = self.overlay.legend_rect else {
            // Off-map rect: no legend measured yet.
            return RectZone {
                min: Vec2::new(-1000.0, -1000.0),
                max: Vec2::new(-900.0, -900.0),
            };
        };

        let pad = 10.0;
        let min = self
            .camera
            .screen_to_world(Vec2::new(rect.min.x - pad, rect.min.y - pad));
        let max = self
            .camera
            .screen_to_world(Vec2::new(rect.max.x + pad, rect.max.y + pad));
        RectZone { min, max }
    }

    fn pin_radius(&self) -> f32 {
        PIN_SIZE / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_rect_at(camera: &MapCamera) -> egui::Rect {
        let ctx = egui::Context::default();
        let mut raw_input = egui::RawInput::default();
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(1600.0, 1200.0),
        ));

        let mut rect = egui::Rect::NOTHING;
        let _ = ctx.run(raw_input, |ctx| {
            let mut actions = OverlayActions::default();
            rect = draw_card(ctx, camera, false, Theme::Dark, &mut actions);
        });
        rect
    }

    #[test]
    fn card_scales_with_zoom() {
        let view = Vec2::new(800.0, 600.0);
        let map = Vec2::new(1600.0, 1200.0);

        let base = MapCamera::new(view, map);
        let mut zoomed = MapCamera::new(view, map);
        zoomed.zoom_at(Vec2::new(400.0, 300.0), 2.0);
        assert!(zoomed.zoom() > base.zoom());

        let small = card_rect_at(&base);
        let large = card_rect_at(&zoomed);
        assert!(large.width() > small.width() * 1.5);
        assert!(large.height() > small.height() * 1.5);
    }
}

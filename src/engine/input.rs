// Input state tracking for keyboard, mouse, and touch
// Abstracts winit events into a queryable per-frame snapshot

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub struct InputState {
    // Keyboard
    keys_held: HashSet<KeyCode>,
    keys_pressed: Vec<KeyCode>,

    // Mouse
    pub mouse_position: Vec2,
    mouse_prev_position: Vec2,
    pub mouse_delta: Vec2,
    left_held: bool,

    // Wheel: net click count this frame (positive = toward the screen),
    // reset in end_frame()
    wheel_steps: i32,

    // Active touch points by id; BTreeMap so the pinch pair is stable
    touches: BTreeMap<u64, Vec2>,

    pub window_size: (u32, u32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: Vec::new(),
            mouse_position: Vec2::ZERO,
            mouse_prev_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            left_held: false,
            wheel_steps: 0,
            touches: BTreeMap::new(),
            window_size: (0, 0),
        }
    }

    /// Feed a winit WindowEvent into the input state.
    /// Call this once per event before the app's own event handling.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !event.repeat {
                                self.keys_pressed.push(key);
                            }
                            self.keys_held.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_held.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *button == MouseButton::Left {
                    self.left_held = *state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                if y > 0.0 {
                    self.wheel_steps += 1;
                } else if y < 0.0 {
                    self.wheel_steps -= 1;
                }
            }
            WindowEvent::Touch(touch) => {
                let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started | TouchPhase::Moved => {
                        self.touches.insert(touch.id, pos);
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touches.remove(&touch.id);
                    }
                }
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            _ => {}
        }
    }

    /// Call once per frame after update() and render() have consumed
    /// input. Resets per-frame accumulators.
    pub fn end_frame(&mut self) {
        self.wheel_steps = 0;
        self.keys_pressed.clear();
        self.mouse_delta = self.mouse_position - self.mouse_prev_position;
        self.mouse_prev_position = self.mouse_position;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// True only on the frame the key went down (auto-repeat ignored).
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn left_held(&self) -> bool {
        self.left_held
    }

    /// Net wheel clicks this frame; each click maps to one fixed zoom
    /// factor application.
    pub fn wheel_steps(&self) -> i32 {
        self.wheel_steps
    }

    /// Up to the first two active touch points, in stable id order.
    pub fn touch_points(&self) -> Vec<Vec2> {
        self.touches.values().copied().take(2).collect()
    }

    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_frame_resets_accumulators() {
        let mut input = InputState::new();
        input.wheel_steps = 3;
        input.keys_pressed.push(KeyCode::KeyR);
        input.mouse_position = Vec2::new(10.0, 20.0);

        input.end_frame();

        assert_eq!(input.wheel_steps(), 0);
        assert!(!input.was_key_pressed(KeyCode::KeyR));
        assert_eq!(input.mouse_delta, Vec2::new(10.0, 20.0));

        input.end_frame();
        assert_eq!(input.mouse_delta, Vec2::ZERO);
    }

    #[test]
    fn left_held_survives_end_frame() {
        let mut input = InputState::new();
        assert!(!input.left_held());

        // Holding is level state, not a per-frame accumulator; only the
        // release event clears it.
        input.left_held = true;
        input.end_frame();
        assert!(input.left_held());
    }

    #[test]
    fn touch_points_are_ordered_and_capped() {
        let mut input = InputState::new();
        input.touches.insert(7, Vec2::new(1.0, 1.0));
        input.touches.insert(2, Vec2::new(2.0, 2.0));
        input.touches.insert(9, Vec2::new(3.0, 3.0));

        let points = input.touch_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Vec2::new(2.0, 2.0));
        assert_eq!(points[1], Vec2::new(1.0, 1.0));
    }
}

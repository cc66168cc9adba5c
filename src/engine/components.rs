// ECS components for the animated map layer

use bevy_ecs::prelude::*;

/// Animated traffic dot gliding along a road path.
#[derive(Component, Debug, Clone, Copy)]
pub struct TrafficDot {
    /// Index into the world's road list.
    pub road: usize,
    /// Position along the path in [0, 1].
    pub cycle: f32,
    /// Cycle advance per second.
    pub speed: f32,
    /// Dot radius in world units.
    pub radius: f32,
}

// Engine module - camera, input, mesh building, and the overlay pass

pub mod camera;
pub mod components;
pub mod input;
pub mod mesh;
pub mod overlay;
pub mod scene;
pub mod systems;
pub mod theme;

// Re-export commonly used items
pub use components::*;

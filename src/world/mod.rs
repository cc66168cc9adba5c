// Procedural city world. Generation order is a hard invariant: each
// stage queries the earlier ones for collision avoidance:
//
//   River -> Roads -> Buildings -> Parks -> Markers
//
// Regeneration replaces every collection wholesale; a stage always runs
// to completion before the next begins, so nothing can observe a
// half-built world.

pub mod lots;
pub mod markers;
pub mod noise;
pub mod river;
pub mod roads;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use lots::{Building, Park, generate_buildings, generate_parks};
use markers::{LayoutProvider, Marker, place_markers};
use river::River;
use roads::{NodeCache, Road, generate_roads};

pub struct SocialLink {
    pub name: &'static str,
    pub url: &'static str,
}

pub const LINKS: [SocialLink; 4] = [
    SocialLink {
        name: "Email",
        url: "mailto:hello@example.dev",
    },
    SocialLink {
        name: "GitHub",
        url: "https://github.com/example",
    },
    SocialLink {
        name: "LinkedIn",
        url: "https://www.linkedin.com/in/example",
    },
    SocialLink {
        name: "Mastodon",
        url: "https://mastodon.social/@example",
    },
];

pub const PROFILE_NAME: &str = "Alex Carter";
pub const PROFILE_ROLE: &str = "Senior Developer \u{2022} GIS / Geodata \u{2022} Web Mapping";
pub const PROFILE_TAGLINE: &str = "Building fast, reliable apps and mapping experiences, \
from geospatial analysis to interactive cartography.";
pub const PROFILE_CHIPS: [&str; 4] = [
    "GIS & Spatial Analysis",
    "Web Mapping (Vector/Tile)",
    "OGC APIs & Data Engineering",
    "Apps (Fullstack/UX/UI)",
];

/// Tunables for the generator. Values are world-space pixels unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub grid_size: f32,
    /// Every Nth grid row/column carries major roads.
    pub major_spacing: i32,

    pub river_width: f32,
    pub river_road_clearance: f32,
    pub river_parallel_buffer: f32,

    pub major_prob: f32,
    pub minor_prob: f32,
    pub minor_diag_prob: f32,

    pub building_road_buffer: f32,
    pub park_road_buffer: f32,

    pub marker_padding: f32,
    pub marker_min_distance: f32,

    /// World size as a multiple of the window size.
    pub map_scale: f32,

    /// Camera fit-animation duration in milliseconds.
    pub animation_duration_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 150.0,
            major_spacing: 3,
            river_width: 26.0,
            river_road_clearance: 22.0,
            river_parallel_buffer: 30.0,
            major_prob: 0.92,
            minor_prob: 0.7,
            minor_diag_prob: 0.55,
            building_road_buffer: 8.0,
            park_road_buffer: 15.0,
            marker_padding: 80.0,
            marker_min_distance: 180.0,
            map_scale: 2.0,
            animation_duration_ms: 1500,
        }
    }
}

/// Fresh session seed for initial load and reshuffle.
pub fn random_seed() -> u32 {
    rand::thread_rng().gen_range(0..100_000)
}

/// The whole generated world plus the seed that produced it. Destroyed
/// and rebuilt wholesale on load, resize (same seed), and reshuffle
/// (fresh seed).
pub struct WorldState {
    pub cfg: WorldConfig,
    pub seed: u32,
    /// Window size in logical pixels.
    pub view: Vec2,
    /// World size (`view * map_scale`).
    pub map: Vec2,

    pub river: Option<River>,
    pub nodes: NodeCache,
    pub roads: Vec<Road>,
    pub buildings: Vec<Building>,
    pub parks: Vec<Park>,
    pub markers: Vec<Marker>,
}

impl WorldState {
    pub fn new(seed: u32, view: Vec2, cfg: WorldConfig) -> Self {
        let map = (view * cfg.map_scale).floor();
        WorldState {
            cfg,
            seed,
            view,
            map,
            river: None,
            nodes: NodeCache::new(),
            roads: Vec::new(),
            buildings: Vec::new(),
            parks: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Run every generation stage in order. All randomness flows from the
    /// session seed, so the same seed and map size reproduce the same
    /// world exactly.
    pub fn generate_all(&mut self, layout: &dyn LayoutProvider) {
        let started = std::time::Instant::now();
        let mut rng = StdRng::seed_from_u64(self.seed as u64);

        let river = River::generate(self.map, &self.cfg, &mut rng);
        let (roads, nodes) = generate_roads(self.map, &self.cfg, &river, self.seed);
        let buildings = generate_buildings(&roads, &river, &self.cfg, self.seed);
        let parks = generate_parks(self.map, &self.cfg, &roads, &river, &buildings, self.seed);
        let markers = place_markers(
            self.map,
            self.view,
            &roads,
            &self.cfg,
            layout,
            LINKS.len(),
            &mut rng,
        );

        self.river = Some(river);
        self.roads = roads;
        self.nodes = nodes;
        self.buildings = buildings;
        self.parks = parks;
        self.markers = markers;

        log::info!(
            "generated world (seed {}): {} roads, {} buildings, {} parks, {} markers in {:.1} ms",
            self.seed,
            self.roads.len(),
            self.buildings.len(),
            self.parks.len(),
            self.markers.len(),
            started.elapsed().as_secs_f32() * 1000.0,
        );
    }

    /// Fresh seed, full regeneration.
    pub fn reshuffle(&mut self, layout: &dyn LayoutProvider) {
        self.seed = random_seed();
        self.generate_all(layout);
    }

    /// Window resized: world dimensions depend on the view, so recompute
    /// them and regenerate at the SAME seed.
    pub fn resize(&mut self, view: Vec2, layout: &dyn LayoutProvider) {
        self.view = view;
        self.map = (view * self.cfg.map_scale).floor();
        self.generate_all(layout);
    }

    /// Bounding box of all placed markers, for the camera fit animation.
    pub fn marker_bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for m in &self.markers {
            min = min.min(m.pos);
            max = max.max(m.pos);
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markers::FixedLayout;

    fn generated(seed: u32, view: Vec2) -> WorldState {
        let mut world = WorldState::new(seed, view, WorldConfig::default());
        let layout = FixedLayout { map: world.map };
        world.generate_all(&layout);
        world
    }

    #[test]
    fn generate_all_is_deterministic() {
        let view = Vec2::new(800.0, 600.0);
        let a = generated(31_337, view);
        let b = generated(31_337, view);

        assert_eq!(a.river, b.river);
        assert_eq!(a.roads, b.roads);
        assert_eq!(a.buildings, b.buildings);
        assert_eq!(a.parks, b.parks);
        assert_eq!(a.markers, b.markers);
    }

    #[test]
    fn different_seeds_differ() {
        let view = Vec2::new(800.0, 600.0);
        let a = generated(1, view);
        let b = generated(2, view);
        assert_ne!(a.roads, b.roads);
    }

    #[test]
    fn resize_keeps_seed_and_scales_map() {
        let mut world = generated(99, Vec2::new(800.0, 600.0));
        let layout = FixedLayout {
            map: Vec2::new(2048.0, 1536.0),
        };
        world.resize(Vec2::new(1024.0, 768.0), &layout);

        assert_eq!(world.seed, 99);
        assert_eq!(world.map, Vec2::new(2048.0, 1536.0));
        assert!(world.river.is_some());
        assert!(!world.roads.is_empty());
    }

    #[test]
    fn marker_bounds_cover_all_markers() {
        let world = generated(7, Vec2::new(800.0, 600.0));
        let (min, max) = world.marker_bounds();
        for m in &world.markers {
            assert!(m.pos.x >= min.x && m.pos.x <= max.x);
            assert!(m.pos.y >= min.y && m.pos.y <= max.y);
        }
    }
}

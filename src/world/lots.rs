// Buildings and parks: rotated rectangles placed with distance-buffer
// collision checks against roads, the river, and each other. A proposal
// that fails any check is silently dropped.

use glam::Vec2;

use super::WorldConfig;
use super::noise::{cell_seed, prand};
use super::river::River;
use super::roads::Road;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// True if the two boxes overlap once each is grown by `buffer`.
    pub fn overlaps(&self, other: &Aabb, buffer: f32) -> bool {
        !(self.max.x + buffer < other.min.x
            || other.max.x + buffer < self.min.x
            || self.max.y + buffer < other.min.y
            || other.max.y + buffer < self.min.y)
    }
}

/// Axis-aligned bounds of a w x h rectangle rotated by `angle` about `pos`.
pub fn rotated_bounds(pos: Vec2, w: f32, h: f32, angle: f32) -> Aabb {
    let (s, c) = angle.sin_cos();
    let corners = [
        Vec2::new(-w / 2.0, -h / 2.0),
        Vec2::new(w / 2.0, -h / 2.0),
        Vec2::new(w / 2.0, h / 2.0),
        Vec2::new(-w / 2.0, h / 2.0),
    ];

    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for p in corners {
        let world = pos + Vec2::new(p.x * c - p.y * s, p.x * s + p.y * c);
        min = min.min(world);
        max = max.max(world);
    }
    Aabb { min, max }
}

fn near_any_road(roads: &[Road], center: Vec2, radius: f32) -> bool {
    roads
        .iter()
        .flat_map(|r| r.path.iter())
        .any(|p| p.distance(center) < radius)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub pos: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub opacity: f32,
}

impl Building {
    pub fn bounds(&self) -> Aabb {
        rotated_bounds(self.pos, self.size.x, self.size.y, self.angle)
    }

    pub fn overlaps_building(&self, other: &Building) -> bool {
        self.bounds().overlaps(&other.bounds(), 2.0)
    }

    pub fn overlaps_road(&self, roads: &[Road], buffer: f32) -> bool {
        let r = buffer + self.size.max_element() / 2.0;
        near_any_road(roads, self.pos, r)
    }

    pub fn overlaps_river(&self, river: &River) -> bool {
        river.is_near(self.pos, 10.0 + self.size.x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Park {
    pub pos: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub opacity: f32,
}

impl Park {
    pub fn bounds(&self) -> Aabb {
        rotated_bounds(self.pos, self.size.x, self.size.y, self.angle)
    }

    pub fn overlaps_park(&self, other: &Park) -> bool {
        self.bounds().overlaps(&other.bounds(), 3.0)
    }

    pub fn overlaps_road(&self, roads: &[Road], buffer: f32) -> bool {
        let r = buffer + self.size.max_element() / 2.0;
        near_any_road(roads, self.pos, r)
    }

    pub fn overlaps_river(&self, river: &River) -> bool {
        let b = self.bounds();
        let center = (b.min + b.max) / 2.0;
        river.is_near(center, 18.0 + self.size.max_element())
    }

    pub fn overlaps_buildings(&self, buildings: &[Building]) -> bool {
        let a = self.bounds();
        buildings.iter().any(|bld| a.overlaps(&bld.bounds(), 3.0))
    }
}

/// Propose small rotated rectangles perpendicular to each road, keeping
/// only proposals clear of every road, the river, and earlier buildings.
pub fn generate_buildings(
    roads: &[Road],
    river: &River,
    cfg: &WorldConfig,
    session: u32,
) -> Vec<Building> {
    let mut buildings: Vec<Building> = Vec::new();

    for (road_idx, road) in roads.iter().enumerate() {
        let start = road.path[0];
        let end = *road.path.last().unwrap();
        let angle = (end.y - start.y).atan2(end.x - start.x);
        let perp = angle + std::f32::consts::FRAC_PI_2;

        let count = road.path.len() / 3;
        for i in 0..count {
            let idx = ((i as f32 / count.max(1) as f32) * (road.path.len() - 1) as f32) as usize;
            let p = road.path[idx];

            let seed = (road_idx as u32)
                .wrapping_mul(1000)
                .wrapping_add(i as u32 * 100)
                ^ session;
            let side = if prand(seed) > 0.5 { 1.0 } else { -1.0 };
            let offset = 18.0 + prand(seed.wrapping_add(10)) * 8.0;
            let w = 12.0 + prand(seed.wrapping_add(20)) * 9.0;
            let h = 18.0 + prand(seed.wrapping_add(30)) * 14.0;

            let pos = p + Vec2::from_angle(perp) * offset * side;
            let b = Building {
                pos,
                size: Vec2::new(w, h),
                angle: if prand(seed.wrapping_add(40)) > 0.5 {
                    angle
                } else {
                    angle + std::f32::consts::FRAC_PI_2
                },
                opacity: 0.06 + prand(seed.wrapping_add(50)) * 0.08,
            };

            let ok = !b.overlaps_road(roads, cfg.building_road_buffer)
                && !b.overlaps_river(river)
                && !buildings.iter().any(|other| b.overlaps_building(other));
            if ok {
                buildings.push(b);
            }
        }
    }

    buildings
}

/// Per grid cell, roll 2-5 park proposals at seeded offsets, sizes, and
/// right-angle rotations; accept only proposals inside the extended map
/// bounds and clear of everything placed so far.
pub fn generate_parks(
    map: Vec2,
    cfg: &WorldConfig,
    roads: &[Road],
    river: &River,
    buildings: &[Building],
    session: u32,
) -> Vec<Park> {
    let mut parks: Vec<Park> = Vec::new();

    let cols = (map.x / cfg.grid_size).ceil() as i32 + 2;
    let rows = (map.y / cfg.grid_size).ceil() as i32 + 2;

    for gy in -1..rows {
        for gx in -1..cols {
            let seed = cell_seed(gx, gy, session);
            let cell = Vec2::new(gx as f32 * cfg.grid_size, gy as f32 * cfg.grid_size);

            let park_count = (prand(seed.wrapping_add(3000)) * 4.0) as u32 + 2;
            for p in 0..park_count {
                let s = seed.wrapping_add(3000).wrapping_add(p * 500);
                if prand(s) <= 0.2 {
                    continue;
                }

                let pos = cell
                    + Vec2::new(
                        prand(s.wrapping_add(100)) * 110.0 - 55.0,
                        prand(s.wrapping_add(200)) * 110.0 - 55.0,
                    );
                let w = 28.0 + prand(s.wrapping_add(300)) * 46.0;
                let h = 24.0 + prand(s.wrapping_add(400)) * 46.0;
                let quarter_turns = (prand(s.wrapping_add(500)) * 4.0) as u32;
                let park = Park {
                    pos,
                    size: Vec2::new(w, h),
                    angle: quarter_turns as f32 * std::f32::consts::FRAC_PI_2,
                    opacity: 0.07 + prand(s.wrapping_add(600)) * 0.06,
                };

                let in_bounds = pos.x > -w && pos.x < map.x + w && pos.y > -h && pos.y < map.y + h;
                let ok = in_bounds
                    && !park.overlaps_road(roads, cfg.park_road_buffer)
                    && !park.overlaps_river(river)
                    && !park.overlaps_buildings(buildings)
                    && !parks.iter().any(|other| park.overlaps_park(other));
                if ok {
                    parks.push(park);
                }
            }
        }
    }

    parks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::roads::generate_roads;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SESSION: u32 = 9001;

    fn fixture() -> (Vec2, WorldConfig, River, Vec<Road>) {
        let cfg = WorldConfig::default();
        let map = Vec2::new(800.0, 600.0);
        let river = River::generate(map, &cfg, &mut StdRng::seed_from_u64(3));
        let (roads, _) = generate_roads(map, &cfg, &river, SESSION);
        (map, cfg, river, roads)
    }

    #[test]
    fn rotated_bounds_quarter_turn_swaps_extent() {
        let b = rotated_bounds(Vec2::ZERO, 10.0, 4.0, std::f32::consts::FRAC_PI_2);
        assert!((b.max.x - 2.0).abs() < 1e-4);
        assert!((b.max.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn aabb_buffer_counts_as_overlap() {
        let a = Aabb {
            min: Vec2::ZERO,
            max: Vec2::splat(10.0),
        };
        let b = Aabb {
            min: Vec2::splat(11.0),
            max: Vec2::splat(20.0),
        };
        assert!(!a.overlaps(&b, 0.0));
        assert!(a.overlaps(&b, 2.0));
    }

    #[test]
    fn buildings_deterministic_and_disjoint() {
        let (_, cfg, river, roads) = fixture();
        let a = generate_buildings(&roads, &river, &cfg, SESSION);
        let b = generate_buildings(&roads, &river, &cfg, SESSION);
        assert_eq!(a, b);
        assert!(!a.is_empty());

        for i in 0..a.len() {
            for j in (i + 1)..a.len() {
                assert!(
                    !a[i].overlaps_building(&a[j]),
                    "buildings {i} and {j} overlap"
                );
            }
        }
    }

    #[test]
    fn buildings_keep_road_and_river_buffers() {
        let (_, cfg, river, roads) = fixture();
        let buildings = generate_buildings(&roads, &river, &cfg, SESSION);
        for b in &buildings {
            assert!(!b.overlaps_road(&roads, cfg.building_road_buffer));
            assert!(!b.overlaps_river(&river));
        }
    }

    #[test]
    fn parks_clear_of_everything() {
        let (map, cfg, river, roads) = fixture();
        let buildings = generate_buildings(&roads, &river, &cfg, SESSION);
        let parks = generate_parks(map, &cfg, &roads, &river, &buildings, SESSION);

        assert!(!parks.is_empty());
        for p in &parks {
            assert!(!p.overlaps_road(&roads, cfg.park_road_buffer));
            assert!(!p.overlaps_river(&river));
            assert!(!p.overlaps_buildings(&buildings));
        }
        for i in 0..parks.len() {
            for j in (i + 1)..parks.len() {
                assert!(!parks[i].overlaps_park(&parks[j]));
            }
        }
    }

    #[test]
    fn park_rotation_is_right_angled() {
        let (map, cfg, river, roads) = fixture();
        let parks = generate_parks(map, &cfg, &roads, &river, &[], SESSION);
        for p in &parks {
            let turns = p.angle / std::f32::consts::FRAC_PI_2;
            assert!((turns - turns.round()).abs() < 1e-5);
        }
    }
}

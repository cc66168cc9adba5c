// ECS systems for the traffic-dot layer

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use super::components::TrafficDot;
use crate::world::roads::{Road, RoadTier};

/// Seed salt so dot randomness does not mirror the generator's stream.
const DOT_SEED_SALT: u64 = 0x5EED_D075;

/// Replace the dot population after a world regeneration. Major roads
/// carry more, slightly faster dots.
pub fn respawn_traffic(ecs: &mut World, roads: &[Road], seed: u32) {
    ecs.clear_entities();
    let mut rng = StdRng::seed_from_u64(seed as u64 ^ DOT_SEED_SALT);

    for (idx, road) in roads.iter().enumerate() {
        let (count, tier_factor) = match road.tier {
            RoadTier::Major => (rng.gen_range(3..6), 1.25),
            RoadTier::Minor => (rng.gen_range(1..3), 1.0),
        };

        for _ in 0..count {
            ecs.spawn(TrafficDot {
                road: idx,
                cycle: rng.r#gen::<f32>(),
                // Per-frame speeds from a 60 Hz reference, expressed per
                // second so frame rate does not change dot pacing.
                speed: (rng.r#gen::<f32>() * 0.0008 + 0.0003) * 60.0 * tier_factor,
                radius: rng.r#gen::<f32>() * 1.5 + 0.8,
            });
        }
    }
}

/// Advance every dot by its own speed; past 1.0 the cycle wraps back to
/// the start of the road.
pub fn advance_traffic(ecs: &mut World, dt: f32) {
    let mut query = ecs.query::<&mut TrafficDot>();
    for mut dot in query.iter_mut(ecs) {
        dot.cycle += dot.speed * dt;
        if dot.cycle > 1.0 {
            dot.cycle = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldConfig;
    use crate::world::river::River;
    use crate::world::roads::generate_roads;
    use glam::Vec2;

    fn test_roads() -> Vec<Road> {
        let cfg = WorldConfig::default();
        let map = Vec2::new(800.0, 600.0);
        let river = River::generate(map, &cfg, &mut StdRng::seed_from_u64(5));
        generate_roads(map, &cfg, &river, 77).0
    }

    fn dot_snapshot(ecs: &mut World) -> Vec<(usize, u32)> {
        let mut query = ecs.query::<&TrafficDot>();
        let mut dots: Vec<(usize, u32)> = query
            .iter(ecs)
            .map(|d| (d.road, d.cycle.to_bits()))
            .collect();
        dots.sort_unstable();
        dots
    }

    #[test]
    fn respawn_replaces_population_deterministically() {
        let roads = test_roads();
        let mut a = World::new();
        let mut b = World::new();
        respawn_traffic(&mut a, &roads, 123);
        respawn_traffic(&mut b, &roads, 123);
        assert!(!dot_snapshot(&mut a).is_empty());
        assert_eq!(dot_snapshot(&mut a), dot_snapshot(&mut b));

        // A second respawn fully replaces the first population.
        respawn_traffic(&mut a, &roads, 123);
        assert_eq!(dot_snapshot(&mut a), dot_snapshot(&mut b));
    }

    #[test]
    fn dots_stay_in_cycle_range_and_wrap() {
        let roads = test_roads();
        let mut ecs = World::new();
        respawn_traffic(&mut ecs, &roads, 9);

        for _ in 0..10_000 {
            advance_traffic(&mut ecs, 1.0 / 60.0);
        }

        let mut query = ecs.query::<&TrafficDot>();
        for dot in query.iter(&ecs) {
            assert!((0.0..=1.0).contains(&dot.cycle));
            assert!(dot.speed > 0.0);
            assert!(dot.road < roads.len());
        }
    }
}

// Meandering river polyline plus the distance queries the road stage uses
// to enforce its crossing policy.

use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;

use super::WorldConfig;

/// Polyline walk step in world units.
const STEP: f32 = 15.0;
/// Meander accumulator is clamped to +/- this each step.
const MAX_MEANDER: f32 = 46.0;
/// The river never gets closer than this to the long map edges.
const EDGE_MARGIN: f32 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct River {
    pub points: Vec<Vec2>,
    pub width: f32,
    pub vertical: bool,
}

impl River {
    /// Walk a step-wise path from one map edge to the other, applying a
    /// bounded random meander delta each step. Orientation is a coin flip.
    pub fn generate(map: Vec2, cfg: &WorldConfig, rng: &mut StdRng) -> Self {
        let vertical = rng.r#gen::<f32>() > 0.5;

        let mut points = Vec::new();
        let mut meander = 0.0f32;

        // Start slightly off-map so the stroke never shows an end cap.
        let mut x = if vertical {
            map.x * (0.3 + rng.r#gen::<f32>() * 0.4)
        } else {
            -50.0
        };
        let mut y = if vertical {
            -50.0
        } else {
            map.y * (0.3 + rng.r#gen::<f32>() * 0.4)
        };

        if vertical {
            while y < map.y + 100.0 {
                points.push(Vec2::new(x, y));
                meander += (rng.r#gen::<f32>() - 0.5) * 15.0;
                meander = meander.clamp(-MAX_MEANDER, MAX_MEANDER);
                x += meander * 0.12;
                x = x.clamp(EDGE_MARGIN, map.x - EDGE_MARGIN);
                y += STEP;
            }
        } else {
            while x < map.x + 100.0 {
                points.push(Vec2::new(x, y));
                meander += (rng.r#gen::<f32>() - 0.5) * 15.0;
                meander = meander.clamp(-MAX_MEANDER, MAX_MEANDER);
                y += meander * 0.12;
                y = y.clamp(EDGE_MARGIN, map.y - EDGE_MARGIN);
                x += STEP;
            }
        }

        River {
            points,
            width: cfg.river_width,
            vertical,
        }
    }

    /// Distance from `p` to the nearest polyline point.
    pub fn distance_to(&self, p: Vec2) -> f32 {
        self.points
            .iter()
            .map(|q| p.distance(*q))
            .fold(f32::INFINITY, f32::min)
    }

    pub fn is_near(&self, p: Vec2, buffer: f32) -> bool {
        self.distance_to(p) < buffer
    }

    /// True if the segment a-b comes within `width/2 + clearance` of the
    /// river at any sampled parameter.
    pub fn line_crosses(&self, a: Vec2, b: Vec2, clearance: f32) -> bool {
        let len = a.distance(b);
        if len == 0.0 {
            return false;
        }

        let samples = ((len / 12.0).floor() as usize).max(6);
        let threshold = self.width / 2.0 + clearance;

        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            if self.distance_to(a.lerp(b, t)) < threshold {
                return true;
            }
        }
        false
    }

    /// True if the majority of sampled points along a-b hug the river,
    /// i.e. the segment runs alongside it rather than across it.
    pub fn line_parallel(&self, a: Vec2, b: Vec2, buffer: f32) -> bool {
        let len = a.distance(b);
        if len == 0.0 {
            return false;
        }

        let samples = ((len / 16.0).floor() as usize).max(6);
        let mut near = 0usize;
        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            if self.is_near(a.lerp(b, t), buffer) {
                near += 1;
            }
        }
        near as f32 / (samples + 1) as f32 > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn straight_river() -> River {
        // Horizontal river along y = 100 from x = 0 to x = 600.
        let points = (0..=40).map(|i| Vec2::new(i as f32 * 15.0, 100.0)).collect();
        River {
            points,
            width: 26.0,
            vertical: false,
        }
    }

    #[test]
    fn generate_is_deterministic_per_rng_seed() {
        let cfg = WorldConfig::default();
        let map = Vec2::new(800.0, 600.0);
        let a = River::generate(map, &cfg, &mut StdRng::seed_from_u64(9));
        let b = River::generate(map, &cfg, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn generate_stays_inside_margins() {
        let cfg = WorldConfig::default();
        let map = Vec2::new(800.0, 600.0);
        for seed in 0..20 {
            let river = River::generate(map, &cfg, &mut StdRng::seed_from_u64(seed));
            assert!(river.points.len() > 10);
            for p in &river.points {
                if river.vertical {
                    assert!(p.x >= 60.0 && p.x <= map.x - 60.0);
                } else {
                    assert!(p.y >= 60.0 && p.y <= map.y - 60.0);
                }
            }
        }
    }

    #[test]
    fn distance_to_nearest_point() {
        let river = straight_river();
        assert!((river.distance_to(Vec2::new(300.0, 160.0)) - 60.0).abs() < 1.0);
        assert!(river.is_near(Vec2::new(300.0, 110.0), 15.0));
        assert!(!river.is_near(Vec2::new(300.0, 300.0), 15.0));
    }

    #[test]
    fn perpendicular_segment_crosses() {
        let river = straight_river();
        let crosses = river.line_crosses(Vec2::new(300.0, 0.0), Vec2::new(300.0, 200.0), 22.0);
        assert!(crosses);
    }

    #[test]
    fn distant_segment_does_not_cross() {
        let river = straight_river();
        let crosses = river.line_crosses(Vec2::new(0.0, 400.0), Vec2::new(600.0, 400.0), 22.0);
        assert!(!crosses);
    }

    #[test]
    fn hugging_segment_is_parallel() {
        let river = straight_river();
        assert!(river.line_parallel(Vec2::new(0.0, 110.0), Vec2::new(600.0, 110.0), 30.0));
        // A perpendicular crossing only touches the river briefly.
        assert!(!river.line_parallel(Vec2::new(300.0, 0.0), Vec2::new(300.0, 600.0), 30.0));
    }
}

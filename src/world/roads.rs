// Road network: jittered grid nodes, tiered edges rolled against density
// probabilities, and the river-crossing policy ("bridges" only for major
// roads that cross cleanly).

use std::collections::HashMap;

use glam::Vec2;

use super::WorldConfig;
use super::noise::{cell_seed, prand, smooth_noise};
use super::river::River;

/// Grid intersection with a noise-jittered world position. Nodes are
/// cached by `(gx, gy)` so every road touching the same intersection sees
/// the identical position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub gx: i32,
    pub gy: i32,
    pub pos: Vec2,
}

impl Node {
    pub fn new(gx: i32, gy: i32, grid_size: f32, session: u32) -> Self {
        let base = Vec2::new(gx as f32 * grid_size, gy as f32 * grid_size);

        // Two independent noise fields, one per axis.
        let n1 = smooth_noise(gx as f32 * 0.5, gy as f32 * 0.5, session);
        let n2 = smooth_noise(gx as f32 * 0.5 + 100.0, gy as f32 * 0.5 + 100.0, session);

        Node {
            gx,
            gy,
            pos: base + Vec2::new((n1 - 0.5) * 100.0, (n2 - 0.5) * 100.0),
        }
    }
}

pub type NodeCache = HashMap<(i32, i32), Node>;

fn get_node(nodes: &mut NodeCache, gx: i32, gy: i32, grid_size: f32, session: u32) -> Node {
    *nodes
        .entry((gx, gy))
        .or_insert_with(|| Node::new(gx, gy, grid_size, session))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadTier {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub a: Node,
    pub b: Node,
    pub tier: RoadTier,
    /// Ordered sample points; straight for major roads, a jittered
    /// quadratic Bezier for minor ones.
    pub path: Vec<Vec2>,
}

impl Road {
    pub fn new(a: Node, b: Node, tier: RoadTier, session: u32) -> Self {
        let path = match tier {
            RoadTier::Major => vec![a.pos, b.pos],
            RoadTier::Minor => minor_path(a, b, session),
        };
        Road { a, b, tier, path }
    }

    /// Linear interpolation along the stored path, `t` in [0, 1].
    pub fn point_at(&self, t: f32) -> Vec2 {
        let idx = t.clamp(0.0, 1.0) * (self.path.len() - 1) as f32;
        let lo = idx.floor() as usize;
        let hi = (idx.ceil() as usize).min(self.path.len() - 1);
        let u = idx - lo as f32;
        self.path[lo].lerp(self.path[hi], u)
    }
}

/// Quadratic Bezier through a control point pushed perpendicular off the
/// midpoint. The curvature comes from a fixed per-edge seed so the same
/// session regenerates the same curve.
fn minor_path(a: Node, b: Node, session: u32) -> Vec<Vec2> {
    let delta = b.pos - a.pos;
    let d = delta.length().max(1.0);

    let seed = (a.gx.wrapping_mul(73_856_093)
        ^ a.gy.wrapping_mul(19_349_663)
        ^ b.gx.wrapping_mul(83_492_791)
        ^ b.gy.wrapping_mul(12_345_677)
        ^ session as i32) as u32;

    let perp = Vec2::new(-delta.y, delta.x) / d;
    let curve = (prand(seed) - 0.5) * d * 0.38;
    let ctrl = a.pos + delta / 2.0 + perp * curve;

    let steps = ((d / 18.0).floor() as usize).max(5);
    let mut path = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let mt = 1.0 - t;
        path.push(a.pos * (mt * mt) + ctrl * (2.0 * mt * t) + b.pos * (t * t));
    }

    // Pin the endpoints so shared intersections stay exact.
    path[0] = a.pos;
    *path.last_mut().unwrap() = b.pos;
    path
}

/// Cells on the periodic major spacing carry the wide, straight roads.
pub fn is_major_cell(gx: i32, gy: i32, major_spacing: i32) -> bool {
    (gx % major_spacing).abs() == 0 || (gy % major_spacing).abs() == 0
}

/// River policy for a candidate edge:
/// - running parallel and close to the river rejects it outright;
/// - minor roads never cross;
/// - major roads cross only as a clean bridge (midpoint near the
///   centerline, neither endpoint near).
fn add_road_if_allowed(
    roads: &mut Vec<Road>,
    river: &River,
    cfg: &WorldConfig,
    a: Node,
    b: Node,
    tier: RoadTier,
    session: u32,
) {
    if river.line_parallel(a.pos, b.pos, cfg.river_parallel_buffer) {
        return;
    }

    let crosses = river.line_crosses(a.pos, b.pos, cfg.river_road_clearance);

    if tier == RoadTier::Minor {
        if crosses {
            return;
        }
        // The Bezier bow can dip closer to the river than the straight
        // segment did, so the generated path itself is checked too.
        let road = Road::new(a, b, tier, session);
        let threshold = river.width / 2.0 + cfg.river_road_clearance;
        if road.path.iter().all(|p| river.distance_to(*p) >= threshold) {
            roads.push(road);
        }
        return;
    }

    if !crosses {
        roads.push(Road::new(a, b, tier, session));
        return;
    }

    let mid = (a.pos + b.pos) / 2.0;
    let near = river.width / 2.0 + cfg.river_road_clearance;

    if river.is_near(mid, near) && !river.is_near(a.pos, near) && !river.is_near(b.pos, near) {
        roads.push(Road::new(a, b, tier, session));
    }
}

/// Build the node grid (one-cell margin on every side) and roll every
/// horizontal, vertical, and minor-diagonal edge against its density
/// probability.
pub fn generate_roads(
    map: Vec2,
    cfg: &WorldConfig,
    river: &River,
    session: u32,
) -> (Vec<Road>, NodeCache) {
    let mut roads = Vec::new();
    let mut nodes = NodeCache::new();

    let cols = (map.x / cfg.grid_size).ceil() as i32 + 2;
    let rows = (map.y / cfg.grid_size).ceil() as i32 + 2;

    for gy in -1..rows {
        for gx in -1..cols {
            get_node(&mut nodes, gx, gy, cfg.grid_size, session);
        }
    }

    for gy in -1..rows {
        for gx in -1..cols {
            let seed = cell_seed(gx, gy, session);
            let node = get_node(&mut nodes, gx, gy, cfg.grid_size, session);
            let major = is_major_cell(gx, gy, cfg.major_spacing);
            let (tier, prob) = if major {
                (RoadTier::Major, cfg.major_prob)
            } else {
                (RoadTier::Minor, cfg.minor_prob)
            };

            if prand(seed) < prob {
                let right = get_node(&mut nodes, gx + 1, gy, cfg.grid_size, session);
                add_road_if_allowed(&mut roads, river, cfg, node, right, tier, session);
            }

            if prand(seed.wrapping_add(500)) < prob {
                let down = get_node(&mut nodes, gx, gy + 1, cfg.grid_size, session);
                add_road_if_allowed(&mut roads, river, cfg, node, down, tier, session);
            }

            if !major && prand(seed.wrapping_add(1000)) < cfg.minor_diag_prob {
                let dx = if prand(seed.wrapping_add(1500)) > 0.5 { 1 } else { -1 };
                let dy = if prand(seed.wrapping_add(2000)) > 0.5 { 1 } else { -1 };
                let diag = get_node(&mut nodes, gx + dx, gy + dy, cfg.grid_size, session);
                add_road_if_allowed(&mut roads, river, cfg, node, diag, RoadTier::Minor, session);
            }
        }
    }

    (roads, nodes)
}

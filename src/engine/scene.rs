// Turns the generated world into triangle meshes, in the fixed paint
// order: backdrop grid, buildings, parks, river, roads, traffic dots.
// The static layers are rebuilt only on regeneration or theme change;
// the dot layer is rebuilt every frame.

use bevy_ecs::world::World as EcsWorld;
use glam::Vec2;

use super::components::TrafficDot;
use super::mesh::MeshBuilder;
use super::theme::Palette;
use crate::world::WorldState;
use crate::world::roads::{Road, RoadTier};

/// Spacing of the faint diagonal backdrop lines.
const BACKDROP_STEP: f32 = 90.0;

/// Road stroke styling per tier: casing and centerline widths plus an
/// alpha factor that fades minor roads back.
fn road_style(tier: RoadTier) -> (f32, f32, f32) {
    match tier {
        RoadTier::Major => (8.0, 2.6, 1.0),
        RoadTier::Minor => (5.0, 1.25, 0.6),
    }
}

fn faded(color: [f32; 4], factor: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * factor]
}

pub fn build_world_mesh(world: &WorldState, palette: &Palette) -> MeshBuilder {
    let mut mesh = MeshBuilder::new();
    let map = world.map;

    // Diagonal backdrop grid across the full map.
    let mut x = -map.y;
    while x < map.x + map.y {
        mesh.push_segment(
            Vec2::new(x, 0.0),
            Vec2::new(x + map.y, map.y),
            1.0,
            palette.backdrop_grid,
        );
        x += BACKDROP_STEP;
    }

    for b in &world.buildings {
        mesh.push_rect(
            b.pos,
            b.size + Vec2::splat(4.0),
            b.angle,
            palette.building_outline(b.opacity),
        );
        mesh.push_rect(b.pos, b.size, b.angle, palette.building_fill(b.opacity));
    }

    for p in &world.parks {
        mesh.push_rect(
            p.pos,
            p.size + Vec2::splat(6.0),
            p.angle,
            palette.park_glow(p.opacity),
        );
        mesh.push_rect(p.pos, p.size, p.angle, palette.park_fill(p.opacity));

        // Slanted hatching clipped to the rect's own frame.
        let stripe = palette.park_stripe(p.opacity);
        let (s, c) = p.angle.sin_cos();
        let rot = |local: Vec2| p.pos + Vec2::new(local.x * c - local.y * s, local.x * s + local.y * c);
        let mut i = -p.size.x / 2.0;
        while i < p.size.x / 2.0 {
            mesh.push_segment(
                rot(Vec2::new(i, -p.size.y / 2.0)),
                rot(Vec2::new(i + 14.0, p.size.y / 2.0)),
                1.0,
                stripe,
            );
            i += 8.0;
        }
    }

    if let Some(river) = &world.river {
        mesh.push_polyline(&river.points, river.width + 22.0, palette.river_glow);
        mesh.push_polyline(&river.points, river.width, palette.river_body);
        mesh.push_polyline(
            &river.points,
            (river.width * 0.22).max(3.0),
            palette.river_highlight,
        );
    }

    for road in &world.roads {
        let (casing, center, alpha) = road_style(road.tier);
        mesh.push_polyline(&road.path, casing, faded(palette.road_casing, alpha));
        mesh.push_polyline(&road.path, center, faded(palette.road_center, alpha));
    }

    mesh
}

/// Halo + core disc per dot at its current path position.
pub fn build_traffic_mesh(ecs: &mut EcsWorld, roads: &[Road], palette: &Palette) -> MeshBuilder {
    let mut mesh = MeshBuilder::new();

    let mut query = ecs.query::<&TrafficDot>();
    for dot in query.iter(ecs) {
        let Some(road) = roads.get(dot.road) else {
            continue;
        };
        let p = road.point_at(dot.cycle);
        mesh.push_disc(p, dot.radius * 3.2, palette.dot_halo);
        mesh.push_disc(p, dot.radius, palette.dot_core);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::systems::respawn_traffic;
    use crate::engine::theme::Theme;
    use crate::world::WorldConfig;
    use crate::world::markers::FixedLayout;

    fn test_world() -> WorldState {
        let mut world = WorldState::new(42, Vec2::new(800.0, 600.0), WorldConfig::default());
        let layout = FixedLayout { map: world.map };
        world.generate_all(&layout);
        world
    }

    #[test]
    fn world_mesh_has_content() {
        let world = test_world();
        let mesh = build_world_mesh(&world, Theme::Dark.palette());
        assert!(!mesh.is_empty());
        assert_eq!(mesh.index_count() as usize, mesh.indices.len());
    }

    #[test]
    fn themes_color_the_same_geometry() {
        let world = test_world();
        let dark = build_world_mesh(&world, Theme::Dark.palette());
        let light = build_world_mesh(&world, Theme::Light.palette());
        assert_eq!(dark.vertices.len(), light.vertices.len());
        assert_ne!(dark.vertices[0].color, light.vertices[0].color);
    }

    #[test]
    fn traffic_mesh_draws_two_discs_per_dot() {
        let world = test_world();
        let mut ecs = EcsWorld::new();
        respawn_traffic(&mut ecs, &world.roads, world.seed);
        let dots = ecs.query::<&TrafficDot>().iter(&ecs).count();

        let mut ecs2 = EcsWorld::new();
        respawn_traffic(&mut ecs2, &world.roads, world.seed);
        let mesh = build_traffic_mesh(&mut ecs2, &world.roads, Theme::Dark.palette());

        // 16-segment fan: 17 vertices per disc, 2 discs per dot.
        assert_eq!(mesh.vertices.len(), dots * 2 * 17);
    }
}

// Social-link pin placement. Pins want to sit near roads inside the
// initially visible viewport, outside the profile-card and legend
// exclusion zones, and spaced apart from each other. A link whose attempt
// budget runs out is silently skipped.

use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;

use super::WorldConfig;
use super::roads::Road;

/// Placement attempts per link before giving up.
const ATTEMPT_BUDGET: u32 = 120;
/// Road points outside the viewport by more than this are not considered.
const ROAD_POINT_MARGIN: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleZone {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectZone {
    pub min: Vec2,
    pub max: Vec2,
}

/// Supplies exclusion-zone geometry in world coordinates. The UI layer
/// implements this from its live layout; generation code never looks at
/// the presentation directly.
pub trait LayoutProvider {
    /// Circular zone around the profile card (and its pin).
    fn card_zone(&self) -> CircleZone;
    /// Rectangular zone around the legend panel.
    fn legend_zone(&self) -> RectZone;
    /// Hit radius of a social pin.
    fn pin_radius(&self) -> f32;
}

/// Fallback geometry used when no live layout is available yet (startup,
/// tests): a fixed card circle at the map center and an off-map legend.
pub struct FixedLayout {
    pub map: Vec2,
}

impl LayoutProvider for FixedLayout {
    fn card_zone(&self) -> CircleZone {
        CircleZone {
            center: self.map / 2.0,
            radius: 340.0,
        }
    }

    fn legend_zone(&self) -> RectZone {
        RectZone {
            min: Vec2::new(-1000.0, -1000.0),
            max: Vec2::new(-900.0, -900.0),
        }
    }

    fn pin_radius(&self) -> f32 {
        34.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub pos: Vec2,
    /// Index into the social-links table; `None` marks the main
    /// profile-card marker.
    pub link: Option<usize>,
}

/// True if a pin at `p` would sit inside either exclusion zone.
pub fn in_exclusion_zone(p: Vec2, card: &CircleZone, legend: &RectZone, pin_radius: f32) -> bool {
    if p.distance(card.center) < card.radius {
        return true;
    }

    // Circle-vs-rect: distance from the pin center to the closest point
    // on the legend rectangle, with a small buffer.
    let closest = p.clamp(legend.min, legend.max);
    p.distance(closest) < pin_radius + 10.0
}

/// Place the fixed main marker plus one pin per social link, best-effort.
pub fn place_markers(
    map: Vec2,
    view: Vec2,
    roads: &[Road],
    cfg: &WorldConfig,
    layout: &dyn LayoutProvider,
    link_count: usize,
    rng: &mut StdRng,
) -> Vec<Marker> {
    let card = layout.card_zone();
    let legend = layout.legend_zone();
    let pin_radius = layout.pin_radius();

    let mut markers = vec![Marker {
        pos: card.center,
        link: None,
    }];

    // The initial camera is centered, so the visible area is the centered
    // view-sized window of the map.
    let vp_min = (map - view) / 2.0;
    let vp_max = (map + view) / 2.0;

    for link in 0..link_count {
        let mut attempts = 0u32;
        let mut found = None;

        while attempts < ATTEMPT_BUDGET {
            let Some(road) = pick(roads, rng) else {
                attempts += 1;
                continue;
            };
            let Some(p) = pick(&road.path, rng) else {
                attempts += 1;
                continue;
            };
            let p = *p;

            if p.x < vp_min.x - ROAD_POINT_MARGIN
                || p.x > vp_max.x + ROAD_POINT_MARGIN
                || p.y < vp_min.y - ROAD_POINT_MARGIN
                || p.y > vp_max.y + ROAD_POINT_MARGIN
            {
                attempts += 1;
                continue;
            }

            let offset = 110.0 + rng.r#gen::<f32>() * 80.0;
            let ang = rng.r#gen::<f32>() * std::f32::consts::TAU;
            let pos = p + Vec2::from_angle(ang) * offset;

            if pos.x < vp_min.x - cfg.marker_padding
                || pos.x > vp_max.x + cfg.marker_padding
                || pos.y < vp_min.y - cfg.marker_padding
                || pos.y > vp_max.y + cfg.marker_padding
            {
                attempts += 1;
                continue;
            }

            if in_exclusion_zone(pos, &card, &legend, pin_radius) {
                attempts += 1;
                continue;
            }

            if markers
                .iter()
                .any(|m| m.pos.distance(pos) < cfg.marker_min_distance)
            {
                attempts += 1;
                continue;
            }

            found = Some(pos);
            break;
        }

        match found {
            Some(pos) => markers.push(Marker {
                pos,
                link: Some(link),
            }),
            None => log::debug!("no valid spot for link {link} within {ATTEMPT_BUDGET} attempts"),
        }
    }

    markers
}

fn pick<'a, T>(items: &'a [T], rng: &mut StdRng) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.gen_range(0..items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::river::River;
    use crate::world::roads::generate_roads;
    use rand::SeedableRng;

    const SESSION: u32 = 555;

    fn fixture() -> (Vec2, Vec2, WorldConfig, Vec<Road>) {
        let cfg = WorldConfig::default();
        let view = Vec2::new(800.0, 600.0);
        let map = view * cfg.map_scale;
        let river = River::generate(map, &cfg, &mut StdRng::seed_from_u64(11));
        let (roads, _) = generate_roads(map, &cfg, &river, SESSION);
        (map, view, cfg, roads)
    }

    #[test]
    fn main_marker_sits_at_card_center() {
        let (map, view, cfg, roads) = fixture();
        let layout = FixedLayout { map };
        let markers = place_markers(
            map,
            view,
            &roads,
            &cfg,
            &layout,
            4,
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(markers[0].pos, map / 2.0);
        assert_eq!(markers[0].link, None);
    }

    #[test]
    fn pairwise_distance_holds() {
        let (map, view, cfg, roads) = fixture();
        let layout = FixedLayout { map };
        let markers = place_markers(
            map,
            view,
            &roads,
            &cfg,
            &layout,
            4,
            &mut StdRng::seed_from_u64(2),
        );

        assert!(markers.len() >= 2, "expected at least one placed link");
        for i in 0..markers.len() {
            for j in (i + 1)..markers.len() {
                assert!(
                    markers[i].pos.distance(markers[j].pos) >= cfg.marker_min_distance,
                    "markers {i} and {j} too close"
                );
            }
        }
    }

    #[test]
    fn pins_respect_exclusion_zones() {
        let (map, view, cfg, roads) = fixture();
        let layout = FixedLayout { map };
        let card = layout.card_zone();
        let legend = layout.legend_zone();
        let markers = place_markers(
            map,
            view,
            &roads,
            &cfg,
            &layout,
            4,
            &mut StdRng::seed_from_u64(3),
        );

        for m in markers.iter().filter(|m| m.link.is_some()) {
            assert!(!in_exclusion_zone(
                m.pos,
                &card,
                &legend,
                layout.pin_radius()
            ));
        }
    }

    #[test]
    fn placement_is_deterministic() {
        let (map, view, cfg, roads) = fixture();
        let layout = FixedLayout { map };
        let a = place_markers(
            map,
            view,
            &roads,
            &cfg,
            &layout,
            4,
            &mut StdRng::seed_from_u64(4),
        );
        let b = place_markers(
            map,
            view,
            &roads,
            &cfg,
            &layout,
            4,
            &mut StdRng::seed_from_u64(4),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn no_roads_means_only_the_main_marker() {
        let (map, view, cfg, _) = fixture();
        let layout = FixedLayout { map };
        let markers = place_markers(
            map,
            view,
            &[],
            &cfg,
            &layout,
            4,
            &mut StdRng::seed_from_u64(5),
        );
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn exclusion_zone_geometry() {
        let card = CircleZone {
            center: Vec2::new(500.0, 500.0),
            radius: 100.0,
        };
        let legend = RectZone {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(100.0, 50.0),
        };

        assert!(in_exclusion_zone(Vec2::new(550.0, 500.0), &card, &legend, 34.0));
        assert!(in_exclusion_zone(Vec2::new(120.0, 25.0), &card, &legend, 34.0));
        assert!(!in_exclusion_zone(Vec2::new(300.0, 300.0), &card, &legend, 34.0));
    }
}

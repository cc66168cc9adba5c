// Pan/zoom camera over the generated map.
//
// Camera model:
//   - screen = world * zoom + offset (a plain translate-and-scale)
//   - zoom is always clamped to [MIN_ZOOM, MAX_ZOOM]
//   - after any mutation the offset is clamped so the scaled map never
//     scrolls past its edges into empty space
//   - an optional fit animation eases toward a target that frames the
//     marker bounding box; starting a new one overwrites any in flight

use std::time::{Duration, Instant};

use glam::{Mat4, Vec2, Vec3};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;

/// Fit animations frame the target box with 20% padding.
const FIT_PADDING: f32 = 1.2;

#[derive(Debug, Clone, Copy)]
struct Pose {
    offset: Vec2,
    zoom: f32,
}

#[derive(Debug, Clone, Copy)]
struct FitAnimation {
    started: Instant,
    duration: Duration,
    from: Pose,
    to: Pose,
}

pub struct MapCamera {
    /// Screen-space translation. Private: always runs through
    /// `apply_bounds()`. Use `offset()` to read.
    offset: Vec2,
    /// Private: always clamped to [MIN_ZOOM, MAX_ZOOM]. Use `zoom()`.
    zoom: f32,

    /// Viewport size in logical pixels.
    pub view: Vec2,
    /// World (map) size in world units.
    pub map: Vec2,

    anim: Option<FitAnimation>,
}

fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

impl MapCamera {
    /// Camera centered on the map at zoom 1.
    pub fn new(view: Vec2, map: Vec2) -> Self {
        let mut cam = MapCamera {
            offset: -(map - view) / 2.0,
            zoom: 1.0,
            view,
            map,
            anim: None,
        };
        cam.apply_bounds();
        cam
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_animating(&self) -> bool {
        self.anim.is_some()
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom + self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom
    }

    /// Translate by a raw screen-space delta (drag pan). Cancels any
    /// in-flight fit animation; last writer wins.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.anim = None;
        self.offset += screen_delta;
        self.apply_bounds();
    }

    /// Multiply zoom by `factor`, pivoting on a screen point so the world
    /// position under it stays visually fixed. Used for both wheel zoom
    /// and pinch (factor = distance ratio).
    pub fn zoom_at(&mut self, pivot: Vec2, factor: f32) {
        self.anim = None;
        let world = self.screen_to_world(pivot);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.offset = pivot - world * self.zoom;
        self.apply_bounds();
    }

    /// Viewport or world dimensions changed: re-center, keep zoom.
    pub fn set_extents(&mut self, view: Vec2, map: Vec2) {
        self.anim = None;
        self.view = view;
        self.map = map;
        self.offset = -(map - view) / 2.0;
        self.apply_bounds();
    }

    /// Clamp the offset so no blank margin shows at any edge. If the
    /// scaled map is smaller than the viewport on an axis (cannot happen
    /// at the default map scale, but guard anyway) it is centered instead.
    pub fn apply_bounds(&mut self) {
        let scaled = self.map * self.zoom;

        for axis in 0..2 {
            let (s, v) = (scaled[axis], self.view[axis]);
            self.offset[axis] = if s >= v {
                self.offset[axis].clamp(v - s, 0.0)
            } else {
                (v - s) / 2.0
            };
        }
    }

    /// Begin easing toward a camera that frames `min..max` (world-space
    /// marker bounding box) with padding. Overwrites any running
    /// animation.
    pub fn start_fit(&mut self, min: Vec2, max: Vec2, duration: Duration, now: Instant) {
        let center = (min + max) / 2.0;
        let size = max - min;

        let zoom_x = self.view.x / (size.x * FIT_PADDING);
        let zoom_y = self.view.y / (size.y * FIT_PADDING);
        let zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);

        let to = Pose {
            offset: self.view / 2.0 - center * zoom,
            zoom,
        };

        self.anim = Some(FitAnimation {
            started: now,
            duration,
            from: Pose {
                offset: self.offset,
                zoom: self.zoom,
            },
            to,
        });
    }

    /// Advance the fit animation to `now`. Progress comes from wall-clock
    /// time, so frame-rate variation does not change the duration.
    pub fn tick(&mut self, now: Instant) {
        let Some(anim) = self.anim else { return };

        let elapsed = now.saturating_duration_since(anim.started);
        let raw = (elapsed.as_secs_f32() / anim.duration.as_secs_f32()).min(1.0);
        let t = ease_out_quad(raw);

        self.offset = anim.from.offset.lerp(anim.to.offset, t);
        self.zoom = anim.from.zoom + (anim.to.zoom - anim.from.zoom) * t;
        self.apply_bounds();

        if raw >= 1.0 {
            self.anim = None;
        }
    }

    /// Orthographic view-projection mapping world space through the
    /// camera transform to the wgpu clip volume.
    pub fn view_projection(&self) -> Mat4 {
        let ortho = Mat4::orthographic_rh(0.0, self.view.x, self.view.y, 0.0, -1.0, 1.0);
        ortho
            * Mat4::from_translation(self.offset.extend(0.0))
            * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> MapCamera {
        MapCamera::new(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 1200.0))
    }

    fn assert_no_blank_margin(cam: &MapCamera) {
        let scaled = cam.map * cam.zoom();
        let o = cam.offset();
        assert!(o.x <= 1e-3 && o.x >= cam.view.x - scaled.x - 1e-3);
        assert!(o.y <= 1e-3 && o.y >= cam.view.y - scaled.y - 1e-3);
    }

    #[test]
    fn starts_centered_and_in_bounds() {
        let cam = camera();
        assert_eq!(cam.offset(), Vec2::new(-400.0, -300.0));
        assert_no_blank_margin(&cam);
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.zoom_at(Vec2::new(400.0, 300.0), 1.1);
        }
        assert!((cam.zoom() - MAX_ZOOM).abs() < 1e-4);

        for _ in 0..200 {
            cam.zoom_at(Vec2::new(400.0, 300.0), 0.9);
        }
        assert!((cam.zoom() - MIN_ZOOM).abs() < 1e-4);
    }

    #[test]
    fn pan_never_exposes_margin() {
        let mut cam = camera();
        cam.pan(Vec2::new(1e6, 1e6));
        assert_no_blank_margin(&cam);
        cam.pan(Vec2::new(-1e7, -1e7));
        assert_no_blank_margin(&cam);
    }

    #[test]
    fn screen_world_round_trip() {
        let mut cam = camera();
        cam.zoom_at(Vec2::new(123.0, 456.0), 1.1);
        cam.pan(Vec2::new(-40.0, -25.0));

        for screen in [
            Vec2::ZERO,
            Vec2::new(400.0, 300.0),
            Vec2::new(799.0, 599.0),
        ] {
            let back = cam.world_to_screen(cam.screen_to_world(screen));
            assert!(back.distance(screen) < 1e-3, "{screen:?} -> {back:?}");
        }
    }

    #[test]
    fn zoom_pivot_stays_fixed() {
        let mut cam = camera();
        // Pivot at the viewport center so the bounds clamp stays inactive
        // and the invariant is exact.
        let pivot = Vec2::new(400.0, 300.0);
        let world_before = cam.screen_to_world(pivot);
        cam.zoom_at(pivot, 1.1);
        let world_after = cam.screen_to_world(pivot);
        assert!(world_before.distance(world_after) < 1e-3);
    }

    #[test]
    fn fit_animation_reaches_target_and_ends() {
        let mut cam = camera();
        let now = Instant::now();
        cam.start_fit(
            Vec2::new(400.0, 300.0),
            Vec2::new(1200.0, 900.0),
            Duration::from_millis(1500),
            now,
        );
        assert!(cam.is_animating());

        cam.tick(now + Duration::from_millis(750));
        assert!(cam.is_animating());
        assert_no_blank_margin(&cam);

        cam.tick(now + Duration::from_millis(1500));
        assert!(!cam.is_animating());
        assert!(cam.zoom() >= MIN_ZOOM && cam.zoom() <= MAX_ZOOM);
        assert_no_blank_margin(&cam);
    }

    #[test]
    fn new_fit_supersedes_old() {
        let mut cam = camera();
        let now = Instant::now();
        cam.start_fit(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 100.0),
            Duration::from_millis(1500),
            now,
        );
        cam.start_fit(
            Vec2::new(700.0, 500.0),
            Vec2::new(900.0, 700.0),
            Duration::from_millis(1500),
            now,
        );

        cam.tick(now + Duration::from_millis(1500));
        // A tight box is capped at MAX_ZOOM.
        assert!((cam.zoom() - MAX_ZOOM).abs() < 1e-4);
    }

    #[test]
    fn interaction_cancels_animation() {
        let mut cam = camera();
        let now = Instant::now();
        cam.start_fit(
            Vec2::ZERO,
            Vec2::new(1600.0, 1200.0),
            Duration::from_millis(1500),
            now,
        );
        cam.pan(Vec2::new(5.0, 5.0));
        assert!(!cam.is_animating());
    }
}

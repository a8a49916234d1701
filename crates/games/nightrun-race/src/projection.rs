//! World → screen mapping for the segment road.

use serde::{Deserialize, Serialize};

/// A point in world space. `z` runs along the road, `y` is elevation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// `1 / tan(fov / 2)`.
    pub depth: f64,
}

impl Camera {
    /// Whether a world depth lies far enough in front to be drawn.
    pub fn is_visible(&self, z: f64) -> bool {
        z - self.z > self.depth
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
        }
    }
}

/// Projected point plus the road half-width at that depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub half_width: f64,
    pub scale: f64,
}

/// Perspective-divide `point` through `camera`. Unrounded.
///
/// Callers must skip points that fail [`Camera::is_visible`]; at or behind
/// the camera the scale is meaningless.
pub fn project(
    point: WorldPoint,
    camera: &Camera,
    viewport: &Viewport,
    road_half_width: f64,
) -> ScreenPoint {
    let scale = camera.depth / (point.z - camera.z);
    let half_w = viewport.width / 2.0;
    let half_h = viewport.height / 2.0;
    ScreenPoint {
        x: half_w + scale * (point.x - camera.x) * half_w,
        y: half_h - scale * (point.y - camera.y) * half_h,
        half_width: scale * road_half_width * half_w,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            x: 0.0,
            y: 1000.0,
            z: 0.0,
            depth: 0.84,
        }
    }

    #[test]
    fn centered_point_lands_mid_screen() {
        let vp = Viewport::new(640, 480);
        let cam = camera();
        let p = project(WorldPoint::new(0.0, 1000.0, 500.0), &cam, &vp, 2000.0);
        assert!((p.x - 320.0).abs() < 1e-9);
        assert!((p.y - 240.0).abs() < 1e-9);
    }

    #[test]
    fn ground_is_below_horizon() {
        let vp = Viewport::new(640, 480);
        let p = project(WorldPoint::new(0.0, 0.0, 5000.0), &camera(), &vp, 2000.0);
        assert!(p.y > 240.0);
    }

    #[test]
    fn known_values() {
        let vp = Viewport::new(640, 480);
        let cam = Camera {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            depth: 1.0,
        };
        let p = project(WorldPoint::new(100.0, 0.0, 200.0), &cam, &vp, 2000.0);
        assert!((p.scale - 0.005).abs() < 1e-12);
        assert!((p.x - (320.0 + 0.5 * 320.0)).abs() < 1e-9);
        assert!((p.half_width - 3200.0).abs() < 1e-9);
    }

    #[test]
    fn visibility_cutoff() {
        let cam = camera();
        assert!(!cam.is_visible(0.0));
        assert!(!cam.is_visible(cam.depth));
        assert!(cam.is_visible(cam.depth + 1.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn nearer_points_are_wider(
                z_near in 1.0f64..1e6,
                gap in 1.0f64..1e6,
                x in -1e4f64..1e4,
                y in -1e4f64..1e4,
            ) {
                let vp = Viewport::new(640, 480);
                let cam = camera();
                let near = project(WorldPoint::new(x, y, z_near), &cam, &vp, 2000.0);
                let far = project(WorldPoint::new(x, y, z_near + gap), &cam, &vp, 2000.0);
                prop_assert!(near.half_width > far.half_width);
            }
        }
    }
}

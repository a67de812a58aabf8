//! Vector math shared by aiming and hit detection.

use bevy::prelude::*;

/// Angle (in radians) of the vector pointing from `from` to `to`.
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Squared distance from `point` to the finite segment `seg_start..seg_end`.
///
/// The projection parameter is clamped to `[0, 1]`, so points behind the
/// segment start or past its end measure against the nearest endpoint rather
/// than the infinite line. Squared distance avoids a square root on the hot
/// hit-testing path.
pub fn point_to_segment_distance_squared(point: Vec2, seg_start: Vec2, seg_end: Vec2) -> f32 {
    let seg = seg_end - seg_start;
    let len_sq = seg.length_squared();
    if len_sq <= f32::EPSILON {
        // Degenerate segment, fall back to point distance.
        return point.distance_squared(seg_start);
    }

    let t = ((point - seg_start).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = seg_start + seg * t;
    point.distance_squared(closest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_angle_between_cardinals() {
        let origin = Vec2::ZERO;
        assert!((angle_between(origin, Vec2::new(10.0, 0.0))).abs() < 1e-6);
        assert!((angle_between(origin, Vec2::new(0.0, 10.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_between(origin, Vec2::new(0.0, -10.0)) + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_point_on_segment_has_zero_distance() {
        let d = point_to_segment_distance_squared(
            Vec2::new(0.0, 5.0),
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
        );
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = point_to_segment_distance_squared(
            Vec2::new(3.0, 5.0),
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
        );
        assert!((d - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_behind_segment_start_is_clamped() {
        // Without clamping this would project onto the infinite line and
        // report zero distance.
        let d = point_to_segment_distance_squared(
            Vec2::new(0.0, -100.0),
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
        );
        assert!((d - 10_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_past_segment_end_is_clamped() {
        let d = point_to_segment_distance_squared(
            Vec2::new(0.0, 15.0),
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
        );
        assert!((d - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_segment() {
        let d = point_to_segment_distance_squared(
            Vec2::new(4.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
        );
        assert!((d - 9.0).abs() < 1e-6);
    }
}

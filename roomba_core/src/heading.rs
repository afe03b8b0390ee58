//! Heading math
//!
//! Headings are degrees in `[0, 360)`. 0° faces +Y and angles grow counter-clockwise,
//! so the forward direction of heading `θ` is `(-sin θ, cos θ)`.

use nalgebra::{Rotation2, Vector2};

/// Wrap any finite angle into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector the agent moves along at `heading`
pub fn forward(heading: f32) -> Vector2<f32> {
    Rotation2::new(heading.to_radians()) * Vector2::y()
}

/// Heading whose forward vector points along `direction`
pub fn heading_of(direction: &Vector2<f32>) -> f32 {
    normalize_degrees(direction.y.atan2(direction.x).to_degrees() - 90.0)
}

/// Mirror `v` about the surface with unit normal `n`: `v - 2(v·n)n`
pub fn reflect(v: &Vector2<f32>, n: &Vector2<f32>) -> Vector2<f32> {
    v - n * (2.0 * v.dot(n))
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Shortest-arc interpolation between two headings.
///
/// `t` is clamped to `[0, 1]`. Going from 350° to 10° passes through 0°, never 180°.
pub fn interpolate(start: f32, target: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    normalize_degrees(start + shortest_delta(start, target) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_wraps_both_directions() {
        assert_relative_eq!(normalize_degrees(370.0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(normalize_degrees(-90.0), 270.0, epsilon = 1e-4);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(f32::NAN), 0.0);
        assert!(normalize_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn test_forward_convention() {
        let up = forward(0.0);
        assert_relative_eq!(up.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-6);

        let left = forward(90.0);
        assert_relative_eq!(left.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(left.y, 0.0, epsilon = 1e-6);

        let down = forward(180.0);
        assert_relative_eq!(down.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_heading_of_inverts_forward() {
        for heading in [0.0_f32, 15.0, 90.0, 179.0, 181.0, 270.0, 359.5] {
            let back = heading_of(&forward(heading));
            assert!(shortest_delta(heading, back).abs() < 1e-3, "{heading} -> {back}");
        }
    }

    #[test]
    fn test_reflect_head_on_wall() {
        let v = forward(0.0);
        let n = Vector2::new(0.0, -1.0);
        let r = reflect(&v, &n);
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(r.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(heading_of(&r), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reflect_preserves_magnitude() {
        for step in 0..72 {
            let heading = step as f32 * 5.0;
            for normal_step in 0..36 {
                let n = forward(normal_step as f32 * 10.0);
                let v = forward(heading) * 3.5;
                assert_relative_eq!(reflect(&v, &n).norm(), v.norm(), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_shortest_delta_range() {
        assert_relative_eq!(shortest_delta(350.0, 10.0), 20.0, epsilon = 1e-4);
        assert_relative_eq!(shortest_delta(10.0, 350.0), -20.0, epsilon = 1e-4);
        assert_relative_eq!(shortest_delta(0.0, 180.0), 180.0, epsilon = 1e-4);
        assert_eq!(shortest_delta(42.0, 42.0), 0.0);
    }

    #[test]
    fn test_interpolate_takes_short_way_across_wrap() {
        let mid = interpolate(350.0, 10.0, 0.5);
        assert!(mid < 1e-3 || mid > 359.999, "expected ~0, got {mid}");
        assert_relative_eq!(interpolate(350.0, 10.0, 0.25), 355.0, epsilon = 1e-3);
    }

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate(37.3, 200.0, 0.0), 37.3);
        assert_relative_eq!(interpolate(37.3, 200.0, 1.0), 200.0, epsilon = 1e-3);
        // Out-of-range fractions are clamped
        assert_eq!(interpolate(37.3, 200.0, -2.0), 37.3);
        assert_relative_eq!(interpolate(37.3, 200.0, 5.0), 200.0, epsilon = 1e-3);
    }
}

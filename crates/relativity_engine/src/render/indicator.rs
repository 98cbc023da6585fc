//! Velocity arrow orientation
//!
//! The arrow model points along +X. [`velocity_indicator_rotation`] turns it
//! to point along an object's velocity.

use crate::foundation::math::{Vec3, Mat4, Mat4Ext};

/// Rotation taking the +X arrow model onto the direction of `velocity`
///
/// Rotates by `acos(v̂.x)` around `(0, -v.z, v.y)`, the axis perpendicular
/// to both +X and the velocity. Motion along ±X leaves that axis at zero, so
/// +Z is used instead (identity or a half turn). A zero velocity yields the
/// identity.
pub fn velocity_indicator_rotation(velocity: &Vec3) -> Mat4 {
    if velocity.dot(velocity) == 0.0 {
        return Mat4::identity();
    }

    let angle = velocity.normalize().x.clamp(-1.0, 1.0).acos();
    let mut axis = Vec3::new(0.0, -velocity.z, velocity.y);
    if axis.norm_squared() == 0.0 {
        axis = Vec3::z();
    }

    Mat4::rotation_about(axis, angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_zero_velocity_is_identity() {
        assert_eq!(velocity_indicator_rotation(&Vec3::zeros()), Mat4::identity());
    }

    #[test]
    fn test_motion_along_x_keeps_arrow() {
        let rotation = velocity_indicator_rotation(&Vec3::new(0.99, 0.0, 0.0));
        assert_relative_eq!(rotation, Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_motion_along_negative_x_flips_arrow() {
        let rotation = velocity_indicator_rotation(&Vec3::new(-0.5, 0.0, 0.0));
        assert_relative_eq!(rotation.transform_vector(&Vec3::x()), -Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_arrow_points_along_velocity_in_xy_plane() {
        for velocity in [Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.3, -0.4, 0.0), Vec3::new(-0.6, 0.6, 0.0)] {
            let arrow = velocity_indicator_rotation(&velocity).transform_vector(&Vec3::x());
            assert_relative_eq!(arrow, velocity.normalize(), epsilon = EPSILON);
        }
    }

    #[test]
    fn test_arrow_points_along_velocity_in_xz_plane() {
        for velocity in [Vec3::new(0.0, 0.0, 0.99), Vec3::new(0.5, 0.0, 0.5), Vec3::new(-0.3, 0.0, -0.8)] {
            let arrow = velocity_indicator_rotation(&velocity).transform_vector(&Vec3::x());
            assert_relative_eq!(arrow, velocity.normalize(), epsilon = EPSILON);
        }
    }

    #[test]
    fn test_general_direction_preserves_length() {
        let rotation = velocity_indicator_rotation(&Vec3::new(0.2, 0.3, 0.5));
        let arrow = rotation.transform_vector(&Vec3::x());
        assert_relative_eq!(arrow.norm(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(arrow, Vec3::new(0.2, 0.3, 0.5).normalize(), epsilon = EPSILON);
    }
}

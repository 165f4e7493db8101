//! Math utilities and types
//!
//! Label anchors are carried in double precision, matching the precision of
//! the dataset coordinates they are read from.

pub use nalgebra::{Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f64>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f64>;

/// Extension trait for Mat4 with the matrices needed to reach display space
pub trait Mat4Ext {
    /// Create a right-handed perspective projection into normalized device coordinates
    fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Point3, target: Point3, up: Vec3) -> Mat4;

    /// Map normalized device coordinates onto a `width` x `height` pixel viewport
    ///
    /// NDC `(-1, -1)` lands on the lower-left display pixel `(0, 0)` and
    /// `(1, 1)` on `(width, height)`. Depth is remapped from `[-1, 1]` to `[0, 1]`.
    fn viewport(width: f64, height: f64) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
        nalgebra::Perspective3::new(aspect, fov_y, near, far).to_homogeneous()
    }

    fn look_at(eye: Point3, target: Point3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&eye, &target, &up)
    }

    fn viewport(width: f64, height: f64) -> Mat4 {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Mat4::new(
            half_w, 0.0,    0.0, half_w,
            0.0,    half_h, 0.0, half_h,
            0.0,    0.0,    0.5, 0.5,
            0.0,    0.0,    0.0, 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_viewport_maps_ndc_corners_to_pixels() {
        let m = Mat4::viewport(800.0, 600.0);
        let center = m.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(center, Point3::new(400.0, 300.0, 0.5));

        let corner = m.transform_point(&Point3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(corner, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_look_at_puts_target_on_negative_z() {
        let view = Mat4::look_at(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let target = view.transform_point(&Point3::origin());
        assert_relative_eq!(target, Point3::new(0.0, 0.0, -5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_perspective_keeps_axis_point_centered() {
        let projection = Mat4::perspective(std::f64::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let ndc = projection.transform_point(&Point3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(ndc.x, 0.0);
        assert_relative_eq!(ndc.y, 0.0);
    }
}

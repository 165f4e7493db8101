//! Output coordinate systems for label anchors
//!
//! World mode passes model coordinates through untouched. Display mode runs
//! each anchor through the configured [`LabelTransform`] (with perspective
//! divide) and treats x and y as screen coordinates; z is carried along but
//! has no meaning to the renderer.

use crate::foundation::math::{Mat4, Point3};
use crate::foundation::time::TimeStamp;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Transform shared between the caller and a mapper
pub type SharedTransform = Rc<RefCell<LabelTransform>>;

/// Coordinate system of the built label anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// 3-D world coordinates
    #[default]
    World,
    /// 2-D display coordinates (three components, the third not significant)
    Display,
}

/// Affine or projective transform with its own modification stamp
#[derive(Debug, Clone)]
pub struct LabelTransform {
    matrix: Mat4,
    mtime: TimeStamp,
}

impl Default for LabelTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl LabelTransform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::from_matrix(Mat4::identity())
    }

    /// Transform from a 4x4 matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix,
            mtime: TimeStamp::now(),
        }
    }

    /// Wrap into a shared handle for [`super::LabeledDataMapper::set_transform`]
    pub fn into_shared(self) -> SharedTransform {
        Rc::new(RefCell::new(self))
    }

    /// Current matrix
    pub const fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Replace the matrix
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        self.mtime.modified();
    }

    /// Apply `matrix` after the current transform
    pub fn post_multiply(&mut self, matrix: &Mat4) {
        self.matrix = matrix * self.matrix;
        self.mtime.modified();
    }

    /// Last modification stamp
    pub const fn modified_time(&self) -> TimeStamp {
        self.mtime
    }

    /// Transform one point
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.matrix.transform_point(point)
    }
}

/// Maps dataset positions into the configured output coordinate system
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    system: CoordinateSystem,
    matrix: Mat4,
}

impl CoordinateMapper {
    /// Create a mapper; display mode without a transform uses the identity
    pub fn new(system: CoordinateSystem, transform: Option<&LabelTransform>) -> Self {
        Self {
            system,
            matrix: transform.map_or_else(Mat4::identity, |t| *t.matrix()),
        }
    }

    /// Output coordinate system
    pub const fn system(&self) -> CoordinateSystem {
        self.system
    }

    /// Map one position
    pub fn map(&self, position: &Point3) -> Point3 {
        match self.system {
            CoordinateSystem::World => *position,
            CoordinateSystem::Display => self.matrix.transform_point(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    #[test]
    fn test_world_is_exact_identity() {
        let transform = LabelTransform::from_matrix(Mat4::new_scaling(3.0));
        let mapper = CoordinateMapper::new(CoordinateSystem::World, Some(&transform));
        let p = Point3::new(0.1, -2.7, 1.0e-9);
        assert_eq!(mapper.map(&p), p);
    }

    #[test]
    fn test_display_identity_keeps_xy() {
        let mapper = CoordinateMapper::new(CoordinateSystem::Display, None);
        let mapped = mapper.map(&Point3::new(4.0, 5.0, 6.0));
        assert_eq!((mapped.x, mapped.y), (4.0, 5.0));
    }

    #[test]
    fn test_display_applies_affine_transform() {
        let transform = LabelTransform::from_matrix(Mat4::new_translation(&Vec3::new(10.0, 20.0, 0.0)));
        let mapper = CoordinateMapper::new(CoordinateSystem::Display, Some(&transform));
        let mapped = mapper.map(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(mapped, Point3::new(11.0, 22.0, 3.0));
    }

    #[test]
    fn test_display_applies_perspective_divide() {
        let camera = Mat4::look_at(Point3::new(0.0, 0.0, 10.0), Point3::origin(), Vec3::y());
        let projection = Mat4::perspective(std::f64::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let mut transform = LabelTransform::from_matrix(camera);
        transform.post_multiply(&projection);
        transform.post_multiply(&Mat4::viewport(200.0, 200.0));

        let mapper = CoordinateMapper::new(CoordinateSystem::Display, Some(&transform));
        let center = mapper.map(&Point3::origin());
        assert_relative_eq!(center.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 100.0, epsilon = 1e-9);

        // at distance 10 with a 90 degree fov the half-height is 10 world units
        let edge = mapper.map(&Point3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(edge.x, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transform_changes_bump_stamp() {
        let mut transform = LabelTransform::identity();
        let before = transform.modified_time();
        transform.set_matrix(Mat4::new_scaling(2.0));
        assert!(transform.modified_time() > before);
        assert_relative_eq!(transform.transform_point(&Point3::new(1.0, 1.0, 1.0)), Point3::new(2.0, 2.0, 2.0));
    }
}

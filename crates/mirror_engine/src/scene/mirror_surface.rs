//! Mirror surface description
//!
//! A mirror is a unit quad in the XY plane of its own transform, centred on
//! the origin and facing local +Z. Position, rotation and scale place it in
//! the world; the solver only ever sees the resulting world-space corners.

use crate::foundation::math::{Point3, Transform, Vec3};

/// Local-space corners of the unit mirror quad
const LOCAL_BOTTOM_LEFT: [f32; 3] = [-0.5, -0.5, 0.0];
const LOCAL_BOTTOM_RIGHT: [f32; 3] = [0.5, -0.5, 0.0];
const LOCAL_TOP_LEFT: [f32; 3] = [-0.5, 0.5, 0.0];

/// Three world-space corners spanning a screen rectangle
///
/// The fourth corner is implied: `bottom_right + (top_left - bottom_left)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenCorners {
    /// Lower-left corner (`pa`)
    pub bottom_left: Vec3,
    /// Lower-right corner (`pb`)
    pub bottom_right: Vec3,
    /// Upper-left corner (`pc`)
    pub top_left: Vec3,
}

impl ScreenCorners {
    /// Create corners from world-space points
    pub fn new(bottom_left: Vec3, bottom_right: Vec3, top_left: Vec3) -> Self {
        Self {
            bottom_left,
            bottom_right,
            top_left,
        }
    }

    /// Horizontal screen edge (`pb - pa`), not normalized
    pub fn right_edge(&self) -> Vec3 {
        self.bottom_right - self.bottom_left
    }

    /// Vertical screen edge (`pc - pa`), not normalized
    pub fn up_edge(&self) -> Vec3 {
        self.top_left - self.bottom_left
    }

    /// Implied upper-right corner
    pub fn top_right(&self) -> Vec3 {
        self.bottom_right + self.up_edge()
    }

    /// Centre of the rectangle
    pub fn center(&self) -> Vec3 {
        0.5 * (self.bottom_right + self.top_left)
    }

    /// All four corners, counter-clockwise from bottom-left
    pub fn all(&self) -> [Vec3; 4] {
        [self.bottom_left, self.bottom_right, self.top_right(), self.top_left]
    }
}

/// Oriented mirror quad owned by the scene
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MirrorSurface {
    /// World transform of the unit quad
    pub transform: Transform,
}

impl MirrorSurface {
    /// Create a mirror from its world transform
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    /// A point on the mirror plane (the quad centre)
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Unit normal of the mirror plane (local +Z in world space)
    pub fn normal(&self) -> Vec3 {
        self.transform.forward().normalize()
    }

    /// World-space corners of the quad
    pub fn corners(&self) -> ScreenCorners {
        let corner = |local: [f32; 3]| {
            self.transform
                .transform_point(Point3::new(local[0], local[1], local[2]))
                .coords
        };

        ScreenCorners::new(
            corner(LOCAL_BOTTOM_LEFT),
            corner(LOCAL_BOTTOM_RIGHT),
            corner(LOCAL_TOP_LEFT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::PI, Quat};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_identity_mirror_corners() {
        let corners = MirrorSurface::default().corners();

        assert_relative_eq!(corners.bottom_left, Vec3::new(-0.5, -0.5, 0.0), epsilon = EPSILON);
        assert_relative_eq!(corners.bottom_right, Vec3::new(0.5, -0.5, 0.0), epsilon = EPSILON);
        assert_relative_eq!(corners.top_left, Vec3::new(-0.5, 0.5, 0.0), epsilon = EPSILON);
        assert_relative_eq!(corners.top_right(), Vec3::new(0.5, 0.5, 0.0), epsilon = EPSILON);
        assert_relative_eq!(corners.center(), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_scaled_and_rotated_mirror() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0);
        let mirror = MirrorSurface::new(Transform::new(
            Vec3::new(0.0, 1.0, 0.0),
            rotation,
            Vec3::new(2.0, 4.0, 1.0),
        ));
        let corners = mirror.corners();

        assert_relative_eq!(mirror.normal(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(corners.right_edge().norm(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(corners.up_edge().norm(), 4.0, epsilon = 1e-5);
        assert_relative_eq!(corners.center(), mirror.position(), epsilon = 1e-5);
        // Every corner lies on the mirror plane
        for corner in corners.all() {
            assert_relative_eq!(mirror.normal().dot(&(corner - mirror.position())), 0.0, epsilon = 1e-5);
        }
    }
}

//! Math utilities and types
//!
//! Provides the fundamental math types used by the mirror solver and the
//! render bridge. All matrices follow nalgebra's column-vector convention
//! (`clip = P * V * M * vertex`); conversion to the backend's row-major
//! layout happens only at the boundary through [`Mat4Ext::to_row_major`].

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform from position, rotation and scale
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Convert to a transformation matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Local +Z axis in world space, the direction the transform "faces"
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// True when every element of the matrix is finite (no NaN or Inf)
    pub fn is_finite_matrix(matrix: &Mat4) -> bool {
        matrix.iter().all(|value| value.is_finite())
    }
}

/// Extension trait for Mat4 with the projection helpers the mirror camera needs
pub trait Mat4Ext {
    /// Create an off-center (asymmetric) perspective projection
    ///
    /// Uses the OpenGL-style clip convention: view space looks down -Z and the
    /// last row is fixed at `[0, 0, -1, 0]`.
    fn perspective_off_center(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a world-to-camera matrix from an orthonormal basis and an eye position
    ///
    /// The basis vectors become the rotation rows; the eye is applied as a
    /// pure translation by `-eye` before the rotation.
    fn from_basis_and_eye(right: &Vec3, up: &Vec3, normal: &Vec3, eye: &Vec3) -> Mat4;

    /// Negate the clip-space Y row of a projection matrix
    fn with_flipped_clip_y(&self) -> Mat4;

    /// Flatten the matrix into 16 floats in row-major order
    fn to_row_major(&self) -> [f32; 16];
}

impl Mat4Ext for Mat4 {
    fn perspective_off_center(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let x = 2.0 * near / (right - left);
        let y = 2.0 * near / (top - bottom);
        let a = (right + left) / (right - left);
        let b = (top + bottom) / (top - bottom);
        let c = -(far + near) / (far - near);
        let d = -(2.0 * far * near) / (far - near);

        Mat4::new(
            x,   0.0, a,    0.0,
            0.0, y,   b,    0.0,
            0.0, 0.0, c,    d,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn from_basis_and_eye(right: &Vec3, up: &Vec3, normal: &Vec3, eye: &Vec3) -> Mat4 {
        let rotation = Mat4::new(
            right.x,  right.y,  right.z,  0.0,
            up.x,     up.y,     up.z,     0.0,
            normal.x, normal.y, normal.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn with_flipped_clip_y(&self) -> Mat4 {
        let mut flipped = *self;
        for column in 0..4 {
            flipped[(1, column)] = -flipped[(1, column)];
        }
        flipped
    }

    fn to_row_major(&self) -> [f32; 16] {
        std::array::from_fn(|index| self[(index / 4, index % 4)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_off_center_matches_symmetric_perspective() {
        let aspect = 16.0 / 9.0;
        let fov_y = utils::deg_to_rad(60.0);
        let (near, far) = (0.3, 1000.0);

        let top = near * (fov_y * 0.5).tan();
        let right = top * aspect;
        let off_center = Mat4::perspective_off_center(-right, right, -top, top, near, far);
        let symmetric = Mat4::new_perspective(aspect, fov_y, near, far);

        assert_relative_eq!(off_center, symmetric, epsilon = 1e-5);
    }

    #[test]
    fn test_off_center_last_row_is_fixed() {
        let m = Mat4::perspective_off_center(-0.2, 0.5, -0.1, 0.3, 0.1, 50.0);

        assert_eq!(m[(3, 0)], 0.0);
        assert_eq!(m[(3, 1)], 0.0);
        assert_eq!(m[(3, 2)], -1.0);
        assert_eq!(m[(3, 3)], 0.0);
        // Asymmetric extents move the principal point off the axis
        assert!(m[(0, 2)] > 0.0);
        assert!(m[(1, 2)] > 0.0);
    }

    #[test]
    fn test_basis_view_matrix_moves_eye_to_origin() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::from_basis_and_eye(&Vec3::x(), &Vec3::y(), &Vec3::z(), &eye);

        let eye_in_view = view.transform_point(&Point3::from(eye));
        assert_relative_eq!(eye_in_view.coords, Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_flipped_clip_y_only_touches_second_row() {
        let m = Mat4::perspective_off_center(-1.0, 1.0, -0.5, 0.8, 0.5, 10.0);
        let flipped = m.with_flipped_clip_y();

        for column in 0..4 {
            assert_eq!(flipped[(0, column)], m[(0, column)]);
            assert_eq!(flipped[(1, column)], -m[(1, column)]);
            assert_eq!(flipped[(2, column)], m[(2, column)]);
            assert_eq!(flipped[(3, column)], m[(3, column)]);
        }
    }

    #[test]
    fn test_row_major_layout() {
        let m = Mat4::new(
            1.0, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            9.0, 10.0, 11.0, 12.0,
            13.0, 14.0, 15.0, 16.0,
        );
        let flat = m.to_row_major();

        assert_eq!(flat[0..4], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(flat[12..16], [13.0, 14.0, 15.0, 16.0]);
    }

    #[test]
    fn test_transform_forward_follows_rotation() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), constants::PI / 2.0);
        let transform = Transform::new(Vec3::zeros(), rotation, Vec3::new(1.0, 1.0, 1.0));

        assert_relative_eq!(transform.forward(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }
}

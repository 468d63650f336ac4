//! # Mirror Frustum Solver
//!
//! Derives, every frame, the pose and the exact off-axis projection of a
//! camera that sees the reflection of the primary viewer in a planar mirror.
//!
//! ## Method
//!
//! 1. Reflect the primary eye across the mirror plane.
//! 2. Treat the mirror quad as a screen and measure it from the reflected eye.
//! 3. If the reflected eye faces the back of the quad, swap the quad's
//!    vertical orientation so the image is not upside down. The horizontal
//!    axis stays fixed.
//! 4. Build an orthonormal screen basis and the perpendicular eye distance.
//! 5. Project the screen edges onto the near plane to get the asymmetric
//!    frustum, and build the off-center projection plus a world-to-camera
//!    matrix straight from the basis.
//!
//! Every output is recomputed from the current inputs; nothing is integrated
//! across frames.

use crate::core::config::{NearClipMode, SolverConfig};
use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec3};
use crate::mirror::frustum::AsymmetricFrustum;
use crate::scene::{MirrorSurface, ScreenCorners};

/// Mirror geometry the solver cannot produce a projection for
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum DegenerateGeometryError {
    /// The eye lies on (or numerically at) the mirror plane
    ///
    /// The perpendicular distance would be used as a divisor, so the frame
    /// has to be skipped rather than rendered with an infinite frustum.
    #[error("eye lies on the mirror plane (perpendicular distance {distance})")]
    EyeOnMirrorPlane {
        /// Perpendicular eye-to-mirror distance that was rejected
        distance: f32,
    },

    /// The mirror quad has zero width, zero height or collapsed edges
    #[error("mirror quad is collapsed (zero area)")]
    CollapsedQuad,
}

/// Errors reported by [`MirrorFrustumSolver::solve`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum SolverError {
    /// Geometry is degenerate this frame
    #[error("degenerate mirror geometry: {0}")]
    DegenerateGeometry(#[from] DegenerateGeometryError),

    /// Clip distances are not usable for a perspective projection
    #[error("invalid clip planes: near {near}, far {far}")]
    InvalidClipPlanes {
        /// Near clip distance
        near: f32,
        /// Far clip distance
        far: f32,
    },

    /// An input position or direction contains NaN or infinity
    #[error("non-finite solver input")]
    NonFiniteInput,
}

/// Orthonormal basis of the mirror screen as seen from the reflected eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBasis {
    /// Screen right axis (`vr`)
    pub right: Vec3,
    /// Screen up axis (`vu`)
    pub up: Vec3,
    /// Screen normal pointing toward the eye (`vn`)
    pub normal: Vec3,
}

impl ScreenBasis {
    /// Camera orientation whose local +Z looks into the screen
    pub fn look_rotation(&self) -> Quat {
        Quat::face_towards(&-self.normal, &self.up)
    }
}

/// Vectors from the reflected eye to the screen corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeVectors {
    /// Eye to bottom-left corner (`va`)
    pub to_bottom_left: Vec3,
    /// Eye to bottom-right corner (`vb`)
    pub to_bottom_right: Vec3,
    /// Eye to top-left corner (`vc`)
    pub to_top_left: Vec3,
}

impl EyeVectors {
    fn new(corners: &ScreenCorners, eye: Vec3) -> Self {
        Self {
            to_bottom_left: corners.bottom_left - eye,
            to_bottom_right: corners.bottom_right - eye,
            to_top_left: corners.top_left - eye,
        }
    }
}

/// Result of a successful solve
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorSolution {
    /// Reflected eye position (`E'`)
    pub eye: Vec3,
    /// Screen corners after the back-face correction
    pub corners: ScreenCorners,
    /// Eye-to-corner vectors for the corrected corners
    pub vectors: EyeVectors,
    /// Screen basis
    pub basis: ScreenBasis,
    /// Perpendicular eye-to-screen distance (`d`), always positive
    pub distance: f32,
    /// Whether the back-face correction was applied this frame
    pub back_face_flipped: bool,
    /// Frustum extents on the near plane
    pub frustum: AsymmetricFrustum,
    /// Off-center projection matrix
    pub projection: Mat4,
    /// World-to-camera matrix built from the screen basis
    pub world_to_camera: Mat4,
}

impl MirrorSolution {
    /// Combined `projection * world_to_camera`
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.world_to_camera
    }
}

/// Reflect a point across the plane through `plane_point` with unit normal `normal`
pub fn reflect_point(point: Vec3, plane_point: Vec3, normal: Vec3) -> Vec3 {
    point - 2.0 * normal.dot(&(point - plane_point)) * normal
}

/// Off-axis projection solver for planar mirrors
#[derive(Debug, Clone, Default)]
pub struct MirrorFrustumSolver {
    config: SolverConfig,
}

impl MirrorFrustumSolver {
    /// Create a solver with the given conventions and tolerances
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for a mirror surface and the primary eye position
    ///
    /// # Arguments
    /// * `mirror` - The mirror quad in world space
    /// * `primary_eye` - Eye position of the primary viewer
    /// * `near`, `far` - Clip distances of the reflection camera
    ///
    /// # Errors
    /// Returns [`SolverError::DegenerateGeometry`] when the eye lies on the
    /// mirror plane or the quad has no area, and
    /// [`SolverError::InvalidClipPlanes`] when `0 < near < far` does not hold.
    pub fn solve(
        &self,
        mirror: &MirrorSurface,
        primary_eye: Vec3,
        near: f32,
        far: f32,
    ) -> Result<MirrorSolution, SolverError> {
        self.solve_geometry(mirror.position(), mirror.normal(), mirror.corners(), primary_eye, near, far)
    }

    /// Solve for explicit plane and corner geometry
    ///
    /// `normal` must be unit length; the corners must lie on the plane.
    pub fn solve_geometry(
        &self,
        plane_point: Vec3,
        normal: Vec3,
        corners: ScreenCorners,
        primary_eye: Vec3,
        near: f32,
        far: f32,
    ) -> Result<MirrorSolution, SolverError> {
        let inputs = [plane_point, normal, corners.bottom_left, corners.bottom_right, corners.top_left, primary_eye];
        if inputs.iter().any(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(SolverError::NonFiniteInput);
        }
        validate_clip(near, far)?;

        let epsilon = self.config.degenerate_epsilon;
        let sign = self.config.handedness.normal_sign();

        let eye = reflect_point(primary_eye, plane_point, normal);

        let right_edge = corners.right_edge();
        let mut up_edge = corners.up_edge();
        let mut corners = corners;
        let mut vectors = EyeVectors::new(&corners, eye);

        // Looking at the back face: keep X, flip the vertical axis
        let facing = sign
            * vectors
                .to_bottom_left
                .cross(&vectors.to_top_left)
                .dot(&vectors.to_bottom_right);
        let back_face_flipped = facing < 0.0;
        if back_face_flipped {
            up_edge = -up_edge;
            let bottom_left = corners.top_left;
            corners = ScreenCorners::new(bottom_left, bottom_left + right_edge, bottom_left + up_edge);
            vectors = EyeVectors::new(&corners, eye);
        }

        let (right_len, up_len) = (right_edge.norm(), up_edge.norm());
        if right_len < epsilon || up_len < epsilon {
            return Err(DegenerateGeometryError::CollapsedQuad.into());
        }
        let right = right_edge / right_len;
        let up = up_edge / up_len;

        let cross = right.cross(&up);
        let cross_len = cross.norm();
        if cross_len < epsilon {
            return Err(DegenerateGeometryError::CollapsedQuad.into());
        }
        let screen_normal = sign * cross / cross_len;

        let distance = -vectors.to_bottom_left.dot(&screen_normal);
        // Negated comparison so NaN is rejected too
        if !(distance.abs() >= epsilon) {
            return Err(DegenerateGeometryError::EyeOnMirrorPlane { distance }.into());
        }

        let near = match self.config.near_clip {
            NearClipMode::Camera => near,
            NearClipMode::MirrorPlane { offset } => {
                let hugging = (distance + offset).max(epsilon);
                validate_clip(hugging, far)?;
                hugging
            }
        };

        let scale = near / distance;
        let frustum = AsymmetricFrustum {
            left: right.dot(&vectors.to_bottom_left) * scale,
            right: right.dot(&vectors.to_bottom_right) * scale,
            bottom: up.dot(&vectors.to_bottom_left) * scale,
            top: up.dot(&vectors.to_top_left) * scale,
            near,
            far,
        };

        let basis = ScreenBasis {
            right,
            up,
            normal: screen_normal,
        };

        log::trace!(
            "Mirror solve: eye {:?}, d = {:.4}, flipped = {}, frustum l/r/b/t = {:.4}/{:.4}/{:.4}/{:.4}",
            eye, distance, back_face_flipped, frustum.left, frustum.right, frustum.bottom, frustum.top
        );

        Ok(MirrorSolution {
            eye,
            corners,
            vectors,
            basis,
            distance,
            back_face_flipped,
            frustum,
            projection: frustum.projection_matrix(),
            world_to_camera: Mat4::from_basis_and_eye(&basis.right, &basis.up, &basis.normal, &eye),
        })
    }
}

fn validate_clip(near: f32, far: f32) -> Result<(), SolverError> {
    if near.is_finite() && far.is_finite() && near > 0.0 && far > near {
        Ok(())
    } else {
        Err(SolverError::InvalidClipPlanes { near, far })
    }
}

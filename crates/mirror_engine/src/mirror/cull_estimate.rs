//! Conservative culling estimate for the reflection camera
//!
//! Culling systems and editor gizmos expect a symmetric frustum described by
//! a field of view and an orientation. The exact frustum is off-axis, so this
//! module over-estimates it with a cone aimed at the middle of the mirror.
//! The result is approximate by construction and is never used to render.

use crate::foundation::math::{utils, Quat, Vec3};
use crate::mirror::solver::MirrorSolution;

/// Widest field of view the estimate will report, in degrees
pub const MAX_FIELD_OF_VIEW_DEGREES: f32 = 179.0;

/// Symmetric stand-in for the off-axis reflection frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullEstimate {
    /// Conservative field of view in degrees
    pub field_of_view_degrees: f32,
    /// Orientation looking at the mirror centre (local +Z forward)
    pub orientation: Quat,
    /// Unit direction from the reflected eye to the mirror centre
    pub look_direction: Vec3,
    /// Half-angle of the bounding cone, in radians
    pub cone_half_angle: f32,
}

impl CullEstimate {
    /// Whether a world-space point lies inside the bounding cone seen from `eye`
    pub fn contains(&self, eye: Vec3, point: Vec3) -> bool {
        angle_from_axis(self.look_direction, eye, point) <= self.cone_half_angle
    }
}

/// Angle between `axis` (unit length) and the ray from `eye` to `point`
fn angle_from_axis(axis: Vec3, eye: Vec3, point: Vec3) -> f32 {
    let to_point = point - eye;
    let length = to_point.norm();
    if length <= f32::EPSILON {
        return 0.0;
    }
    (axis.dot(&to_point) / length).clamp(-1.0, 1.0).acos()
}

/// Derives a [`CullEstimate`] from a solved mirror frustum
#[derive(Debug, Clone, Copy, Default)]
pub struct FrustumCullEstimator;

impl FrustumCullEstimator {
    /// Estimate a conservative symmetric frustum
    ///
    /// `angle = atan((|pb - pa| + |pc - pa|) / |va|)`; viewports narrower
    /// than they are tall widen the angle by `1 / aspect`.
    pub fn estimate(solution: &MirrorSolution, aspect: f32) -> CullEstimate {
        let corners = &solution.corners;
        let extent = corners.right_edge().norm() + corners.up_edge().norm();
        let angle = utils::rad_to_deg((extent / solution.vectors.to_bottom_left.norm()).atan());

        let field_of_view_degrees = if aspect >= 1.0 { angle } else { angle / aspect };
        let field_of_view_degrees = field_of_view_degrees.min(MAX_FIELD_OF_VIEW_DEGREES);

        let to_center = corners.center() - solution.eye;
        let up = solution.basis.up;
        let (orientation, look_direction) = if to_center.cross(&up).norm() > 1e-6 * to_center.norm() {
            (Quat::face_towards(&to_center, &up), to_center.normalize())
        } else {
            // Looking straight along the up axis; fall back to the screen basis
            (solution.basis.look_rotation(), -solution.basis.normal)
        };

        // Close to the mirror the formula angle falls short of the corners
        let widest_corner = corners
            .all()
            .iter()
            .map(|corner| angle_from_axis(look_direction, solution.eye, *corner))
            .fold(0.0_f32, f32::max);

        CullEstimate {
            field_of_view_degrees,
            orientation,
            look_direction,
            cone_half_angle: utils::deg_to_rad(field_of_view_degrees).max(widest_corner),
        }
    }
}

//! Asymmetric view frustum
//!
//! Extents are measured on the near plane relative to the eye, so the
//! frustum is rebuilt from scratch whenever the eye or the mirror moves.

use crate::foundation::math::{Mat4, Mat4Ext};

/// Off-axis frustum extents at the near plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetricFrustum {
    /// Signed distance to the left edge (negative when the edge is left of the axis)
    pub left: f32,
    /// Signed distance to the right edge
    pub right: f32,
    /// Signed distance to the bottom edge
    pub bottom: f32,
    /// Signed distance to the top edge
    pub top: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl AsymmetricFrustum {
    /// Off-center perspective projection for these extents
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_off_center(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }

    /// Width of the near-plane window
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the near-plane window
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Whether the window is centred on the view axis within `epsilon`
    pub fn is_symmetric(&self, epsilon: f32) -> bool {
        (self.left + self.right).abs() <= epsilon && (self.bottom + self.top).abs() <= epsilon
    }
}

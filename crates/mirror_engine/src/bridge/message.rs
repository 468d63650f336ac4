//! Per-frame boundary payload
//!
//! The backend multiplies row vectors by the matrix (`clip = v * WVP`), so the
//! column-vector chain `P * V * M` is sent transposed:
//! `WVP = M^T * V^T * P^T`, flattened row by row.

use crate::bridge::handles::{NativeHandle, RenderEventToken};
use crate::foundation::math::{Mat4, Mat4Ext};

/// World-view-projection matrix in the backend's row-major layout
///
/// Plain old data, so the backend can copy it straight into a constant buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RowMajorMatrix(pub [f32; 16]);

impl RowMajorMatrix {
    /// Raw bytes of the matrix
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Element at `row`, `column`
    pub fn get(&self, row: usize, column: usize) -> f32 {
        self.0[row * 4 + column]
    }
}

/// Compute the transposed world-view-projection matrix sent to the backend
///
/// `flip_vertical` negates clip-space Y before transposing, for backends
/// whose clip-space origin is top-left.
pub fn world_view_projection(
    model_to_world: &Mat4,
    world_to_camera: &Mat4,
    projection: &Mat4,
    flip_vertical: bool,
) -> RowMajorMatrix {
    let projection = if flip_vertical {
        projection.with_flipped_clip_y()
    } else {
        *projection
    };

    let transposed = model_to_world.transpose() * world_to_camera.transpose() * projection.transpose();
    RowMajorMatrix(transposed.to_row_major())
}

/// Everything sent across the boundary for one presented frame
///
/// All fields are copies; nothing here aliases producer-side buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeMessage {
    /// Transposed world-view-projection matrix
    pub world_view_projection: RowMajorMatrix,
    /// Color target identifier
    pub color: NativeHandle,
    /// Depth target identifier
    pub depth: NativeHandle,
    /// Render event token obtained from the backend
    pub token: RenderEventToken,
    /// Numeric identifier of the enqueued event
    pub event_id: i32,
}

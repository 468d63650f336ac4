//! # Render Bridge
//!
//! Boundary between the reflection camera and an external rendering backend.
//!
//! ## Organization
//!
//! - **backend**: `RenderBackend` / `GraphicsQueue` call surface and backend kinds
//! - **handles**: Opaque render target identifiers and event tokens
//! - **message**: Per-frame payload and the transposed world-view-projection matrix
//! - **render_bridge**: Target-binding state machine issuing render events
//! - **threaded**: Reference backend consuming commands on its own render thread

pub mod backend;
pub mod handles;
pub mod message;
pub mod render_bridge;
pub mod threaded;

pub use backend::{BackendKind, BackendResult, BridgeError, GraphicsQueue, RenderBackend};
pub use handles::{NativeHandle, RenderEventToken, RenderTargetHandle};
pub use message::{world_view_projection, BridgeMessage, RowMajorMatrix};
pub use render_bridge::{BridgeInput, BridgeOutcome, BridgeState, RenderBridge};
pub use threaded::{
    BackendCommand,
    COMPLETION_CAPACITY,
    ConstantBufferRenderer,
    FrameCompletion,
    FrameContext,
    FrameRenderer,
    RenderThreadQueue,
    ThreadedBackend,
};

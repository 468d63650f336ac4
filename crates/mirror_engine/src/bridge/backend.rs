//! Backend abstraction traits for the render bridge
//!
//! This module defines the boundary call surface between the core and an
//! external rendering backend. Every call is a fire-and-forget push: the
//! backend consumes the most recently pushed state when a render event
//! executes on its own thread.

use crate::bridge::handles::{NativeHandle, RenderEventToken};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BridgeError>;

/// Errors crossing the backend boundary
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The backend cannot run on this platform or failed to start
    ///
    /// Reported once at initialization; the bridge never retries it per frame.
    #[error("render backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend's command channel is closed (its render thread is gone)
    #[error("render backend disconnected")]
    Disconnected,

    /// The backend refused a request, such as rebinding to new targets
    #[error("render backend rejected request: {0}")]
    Rejected(String),
}

/// Graphics API on the other side of the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Direct3D 11
    Direct3D11,
    /// Direct3D 12
    Direct3D12,
    /// Desktop OpenGL core profile
    OpenGLCore,
    /// OpenGL ES 3.x
    OpenGLES,
    /// Vulkan
    Vulkan,
    /// Metal
    Metal,
}

impl BackendKind {
    /// Backend linked for the current build target
    ///
    /// Chosen at compile time so call sites never branch on the platform.
    pub const fn platform_default() -> Self {
        PLATFORM_BACKEND
    }

    /// Whether the API places the clip-space origin at the top-left
    ///
    /// Only used to seed [`crate::core::config::BridgeConfig::flip_vertical`];
    /// the integrator's setting is what the bridge obeys.
    pub const fn clip_space_origin_top_left(self) -> bool {
        match self {
            Self::Direct3D11 | Self::Direct3D12 | Self::Vulkan | Self::Metal => true,
            Self::OpenGLCore | Self::OpenGLES => false,
        }
    }

    /// Whether the API can be linked on the current build target
    pub const fn is_available(self) -> bool {
        match self {
            Self::Direct3D11 | Self::Direct3D12 => cfg!(target_os = "windows"),
            Self::Metal => cfg!(any(target_os = "macos", target_os = "ios")),
            Self::Vulkan => !cfg!(any(target_os = "macos", target_os = "ios")),
            Self::OpenGLCore => !cfg!(any(target_os = "ios", target_os = "android")),
            Self::OpenGLES => cfg!(any(target_os = "ios", target_os = "android", target_os = "linux")),
        }
    }

    /// Human-readable API name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Direct3D11 => "Direct3D 11",
            Self::Direct3D12 => "Direct3D 12",
            Self::OpenGLCore => "OpenGL Core",
            Self::OpenGLES => "OpenGL ES",
            Self::Vulkan => "Vulkan",
            Self::Metal => "Metal",
        }
    }
}

#[cfg(target_os = "windows")]
const PLATFORM_BACKEND: BackendKind = BackendKind::Direct3D11;
#[cfg(any(target_os = "macos", target_os = "ios"))]
const PLATFORM_BACKEND: BackendKind = BackendKind::Metal;
#[cfg(target_os = "android")]
const PLATFORM_BACKEND: BackendKind = BackendKind::OpenGLES;
#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "ios", target_os = "android")))]
const PLATFORM_BACKEND: BackendKind = BackendKind::OpenGLCore;

/// Boundary call surface of a rendering backend
///
/// Implementations must observe calls in issue order and must copy the
/// values they are given; callers are free to reuse their buffers as soon as
/// a call returns.
pub trait RenderBackend {
    /// Graphics API this backend drives
    fn kind(&self) -> BackendKind;

    /// Push the world-view-projection matrix (row-major, 16 floats)
    fn set_view_projection(&mut self, matrix: [f32; 16]) -> BackendResult<()>;

    /// Push the render target identifiers; `None` means "not yet available"
    ///
    /// When the identity differs from the previous push, the backend drops
    /// everything it derived from the old targets.
    fn set_render_targets(&mut self, color: Option<NativeHandle>, depth: Option<NativeHandle>) -> BackendResult<()>;

    /// Drop and later recreate any cached references to render targets
    fn invalidate_targets(&mut self) -> BackendResult<()>;

    /// Opaque token the host hands back with each render event
    fn render_event_token(&self) -> RenderEventToken;
}

/// Host graphics queue that schedules backend render events
pub trait GraphicsQueue {
    /// Schedule the backend's render callback identified by `token`
    ///
    /// Returns immediately; the event runs later on the backend's render thread.
    fn enqueue_event(&mut self, token: RenderEventToken, event_id: i32) -> BackendResult<()>;
}

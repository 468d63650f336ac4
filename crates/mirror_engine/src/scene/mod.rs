//! Per-frame scene input
//!
//! The host reads its scene once per frame into a [`SceneSnapshot`] and hands
//! it to [`crate::rig::MirrorRig::tick`]. Nothing in here is cached between
//! frames.

pub mod camera;
pub mod mirror_surface;

pub use camera::{CameraId, CameraPose, ReflectionCameraSlot};
pub use mirror_surface::{MirrorSurface, ScreenCorners};

/// Scene state read once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// The mirror quad
    pub mirror: MirrorSurface,
    /// Pose of the primary viewer
    pub primary: CameraPose,
    /// Reflection camera slot injected by the host
    pub reflection: ReflectionCameraSlot,
}

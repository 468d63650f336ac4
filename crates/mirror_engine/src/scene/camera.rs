//! Camera poses and the reflection camera slot
//!
//! The primary viewer is read-only input; the reflection camera is described
//! by a slot the host injects every frame. Cameras are identified by an
//! explicit [`CameraId`] handed out by the host, never by name.

use crate::bridge::handles::RenderTargetHandle;
use crate::foundation::math::{Mat4, Quat, Vec3};

/// Host-assigned camera identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

/// Position, orientation and intrinsics of a perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space
    pub position: Vec3,
    /// Orientation; local +Z is the viewing direction
    pub rotation: Quat,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl CameraPose {
    /// Create a perspective camera pose with identity orientation
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
            near,
            far,
            aspect,
            fov_degrees,
        }
    }

    /// Replace the orientation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Viewing direction in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::perspective(Vec3::zeros(), 60.0, 16.0 / 9.0, 0.3, 1000.0)
    }
}

/// Everything the host knows about the reflection camera this frame
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionCameraSlot {
    /// Identity of the reflection camera
    pub id: CameraId,
    /// Whether the camera renders this frame
    pub active: bool,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
    /// Aspect ratio of the offscreen target
    pub aspect: f32,
    /// Offscreen target the host rendered into
    pub targets: RenderTargetHandle,
    /// Model-to-world transform of the object the backend draws
    pub model_to_world: Mat4,
}

impl ReflectionCameraSlot {
    /// Slot that copies the intrinsics of the primary camera
    pub fn mirroring(id: CameraId, primary: &CameraPose) -> Self {
        Self {
            id,
            active: true,
            near: primary.near,
            far: primary.far,
            aspect: primary.aspect,
            targets: RenderTargetHandle::NULL,
            model_to_world: Mat4::identity(),
        }
    }

    /// Set the offscreen target handles
    pub fn with_targets(mut self, targets: RenderTargetHandle) -> Self {
        self.targets = targets;
        self
    }

    /// Set the model-to-world transform
    pub fn with_model(mut self, model_to_world: Mat4) -> Self {
        self.model_to_world = model_to_world;
        self
    }

    /// Enable or disable the camera
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

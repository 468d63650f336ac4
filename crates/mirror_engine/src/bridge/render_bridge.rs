//! # Render Bridge
//!
//! Hands the reflection camera's final transform and offscreen targets to the
//! backend once the host has rendered into them, then schedules the backend's
//! render event.
//!
//! ## State machine
//!
//! ```text
//! Uninitialized --(both handles non-null)--> Bound
//! Bound --(handle identity changes)--> Rebinding --(backend accepts)--> Bound
//! Bound | Rebinding --(handles go null)--> Uninitialized
//! ```
//!
//! Events are only issued from `Bound`. Entering `Rebinding` invalidates the
//! backend's cached target references before the new handles are pushed.

use crate::bridge::backend::{BridgeError, GraphicsQueue, RenderBackend};
use crate::bridge::handles::{NativeHandle, RenderTargetHandle};
use crate::bridge::message::{world_view_projection, BridgeMessage};
use crate::core::config::BridgeConfig;
use crate::foundation::math::Mat4;
use crate::scene::CameraId;

/// Binding state of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
    /// No usable targets seen yet
    #[default]
    Uninitialized,
    /// Backend holds references to the current targets
    Bound,
    /// Targets changed; the backend must drop its references before the next event
    Rebinding,
}

/// Post-render inputs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeInput {
    /// Camera that just finished rendering
    pub camera: CameraId,
    /// Whether that camera is active this frame
    pub active: bool,
    /// Model-to-world transform of the object the backend draws
    pub model_to_world: Mat4,
    /// Final world-to-camera matrix of the camera
    pub world_to_camera: Mat4,
    /// Final projection matrix of the camera
    pub projection: Mat4,
    /// Offscreen targets the camera rendered into
    pub targets: RenderTargetHandle,
}

/// What the bridge did for a frame
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeOutcome {
    /// Pushed state and enqueued a render event
    Presented {
        /// Payload that crossed the boundary
        message: BridgeMessage,
        /// Whether the targets were rebound this frame
        rebound: bool,
    },
    /// Targets are not available; nothing was enqueued
    NothingToPresent,
    /// The camera is disabled this frame
    Inactive,
    /// The call was for a camera this bridge does not serve
    ForeignCamera,
}

impl BridgeOutcome {
    /// Whether a render event was enqueued
    pub fn presented(&self) -> bool {
        matches!(self, Self::Presented { .. })
    }
}

/// Per-camera bridge to the rendering backend
#[derive(Debug, Clone)]
pub struct RenderBridge {
    camera: CameraId,
    config: BridgeConfig,
    state: BridgeState,
    bound: Option<(NativeHandle, NativeHandle)>,
}

impl RenderBridge {
    /// Create a bridge serving `camera`
    pub fn new(camera: CameraId, config: BridgeConfig) -> Self {
        log::debug!(
            "Render bridge for camera {} (event id {}, flip vertical {})",
            camera.0,
            config.render_event_id,
            config.flip_vertical
        );
        Self {
            camera,
            config,
            state: BridgeState::Uninitialized,
            bound: None,
        }
    }

    /// Camera this bridge serves
    pub fn camera(&self) -> CameraId {
        self.camera
    }

    /// Current binding state
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Push this frame's state across the boundary and enqueue a render event
    ///
    /// # Errors
    /// Propagates backend errors. A refused rebind leaves the bridge in
    /// [`BridgeState::Rebinding`] so the next frame retries it.
    pub fn submit(
        &mut self,
        input: &BridgeInput,
        backend: &mut dyn RenderBackend,
        queue: &mut dyn GraphicsQueue,
    ) -> Result<BridgeOutcome, BridgeError> {
        if input.camera != self.camera {
            return Ok(BridgeOutcome::ForeignCamera);
        }
        if !input.active {
            return Ok(BridgeOutcome::Inactive);
        }

        let Some((color, depth)) = input.targets.available() else {
            if self.state != BridgeState::Uninitialized {
                // Let the backend drop references to the released targets
                backend.set_render_targets(input.targets.color, input.targets.depth)?;
                log::debug!("Render targets released; bridge back to uninitialized");
                self.state = BridgeState::Uninitialized;
                self.bound = None;
            }
            return Ok(BridgeOutcome::NothingToPresent);
        };

        let pair = (color, depth);
        match self.state {
            BridgeState::Bound if self.bound != Some(pair) => {
                log::debug!("Render targets changed to ({color}, {depth}); rebinding");
                self.state = BridgeState::Rebinding;
            }
            BridgeState::Uninitialized => {
                log::debug!("Render targets available ({color}, {depth}); binding");
            }
            _ => {}
        }
        let rebound = self.state == BridgeState::Rebinding;

        let matrix = world_view_projection(
            &input.model_to_world,
            &input.world_to_camera,
            &input.projection,
            self.config.flip_vertical,
        );
        backend.set_view_projection(matrix.0)?;

        if rebound {
            if let Err(err) = backend.invalidate_targets() {
                log::warn!("Backend refused to rebind render targets: {err}");
                return Err(err);
            }
        }
        backend.set_render_targets(Some(color), Some(depth))?;

        self.state = BridgeState::Bound;
        self.bound = Some(pair);

        let token = backend.render_event_token();
        queue.enqueue_event(token, self.config.render_event_id)?;
        log::trace!("Enqueued render event {} for camera {}", self.config.render_event_id, self.camera.0);

        Ok(BridgeOutcome::Presented {
            message: BridgeMessage {
                world_view_projection: matrix,
                color,
                depth,
                token,
                event_id: self.config.render_event_id,
            },
            rebound,
        })
    }
}

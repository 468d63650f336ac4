//! # Mirror Rig
//!
//! Once-per-frame driver tying the solver, the culling estimate and the
//! render bridge together. The host calls [`MirrorRig::tick`] after it has
//! rendered the reflection camera; the rig keeps no timers and derives every
//! output from the snapshot it is given.

use crate::bridge::backend::{BridgeError, GraphicsQueue, RenderBackend};
use crate::bridge::render_bridge::{BridgeInput, BridgeOutcome, RenderBridge};
use crate::core::config::{ConfigError, ReflectionConfig};
use crate::foundation::math::utils;
use crate::mirror::cull_estimate::{CullEstimate, FrustumCullEstimator};
use crate::mirror::solver::{MirrorFrustumSolver, MirrorSolution, SolverError};
use crate::scene::{CameraId, CameraPose, SceneSnapshot};

/// Solved reflection camera for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionCamera {
    /// Exact solve result (projection, world-to-camera, basis)
    pub solution: MirrorSolution,
    /// Pose the host should render the reflection from
    pub pose: CameraPose,
}

impl ReflectionCamera {
    fn from_solution(solution: MirrorSolution, aspect: f32) -> Self {
        let f = &solution.frustum;
        let fov = (f.top / f.near).atan() - (f.bottom / f.near).atan();
        let pose = CameraPose {
            position: solution.eye,
            rotation: solution.basis.look_rotation(),
            near: f.near,
            far: f.far,
            aspect,
            fov_degrees: utils::rad_to_deg(fov),
        };
        Self { solution, pose }
    }
}

/// Why a frame produced no render event
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The reflection camera is disabled
    Inactive,
    /// The snapshot's reflection slot belongs to another camera
    ForeignCamera,
    /// The solver rejected this frame's geometry or clip planes
    Solver(SolverError),
    /// The backend refused or lost a boundary call
    Backend(BridgeError),
}

/// Everything a tick produced
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Reflection camera pose and matrices, when the solve succeeded
    pub reflection: Option<ReflectionCamera>,
    /// Culling estimate, when enabled and the solve succeeded
    pub cull: Option<CullEstimate>,
    /// What the bridge did
    pub bridge: BridgeOutcome,
    /// Set when the frame was skipped before or during presentation
    pub skipped: Option<SkipReason>,
}

impl FrameOutput {
    /// Output for a frame whose reflection camera is disabled
    pub fn inactive() -> Self {
        Self::skipped(BridgeOutcome::Inactive, SkipReason::Inactive)
    }

    fn skipped(bridge: BridgeOutcome, reason: SkipReason) -> Self {
        Self {
            reflection: None,
            cull: None,
            bridge,
            skipped: Some(reason),
        }
    }

    /// Whether a render event was enqueued
    pub fn presented(&self) -> bool {
        self.bridge.presented()
    }
}

/// Per-camera frame driver
#[derive(Debug, Clone)]
pub struct MirrorRig {
    solver: MirrorFrustumSolver,
    bridge: RenderBridge,
    failing: bool,
    backend_lost: bool,
}

impl MirrorRig {
    /// Create a rig for the reflection camera `camera`
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the configuration fails validation.
    pub fn new(camera: CameraId, config: &ReflectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            solver: MirrorFrustumSolver::new(config.solver.clone()),
            bridge: RenderBridge::new(camera, config.bridge.clone()),
            failing: false,
            backend_lost: false,
        })
    }

    /// The bridge driven by this rig
    pub fn bridge(&self) -> &RenderBridge {
        &self.bridge
    }

    /// Run one frame
    pub fn tick(
        &mut self,
        snapshot: &SceneSnapshot,
        backend: &mut dyn RenderBackend,
        queue: &mut dyn GraphicsQueue,
    ) -> FrameOutput {
        let slot = &snapshot.reflection;
        if slot.id != self.bridge.camera() {
            return FrameOutput::skipped(BridgeOutcome::ForeignCamera, SkipReason::ForeignCamera);
        }
        if !slot.active {
            return FrameOutput::inactive();
        }

        let solution = match self.solver.solve(&snapshot.mirror, snapshot.primary.position, slot.near, slot.far) {
            Ok(solution) => solution,
            Err(err) => {
                // One report per contiguous run of bad frames
                if !self.failing {
                    log::warn!("Skipping reflection frames: {err}");
                    self.failing = true;
                }
                return FrameOutput::skipped(BridgeOutcome::NothingToPresent, SkipReason::Solver(err));
            }
        };
        if self.failing {
            log::debug!("Mirror geometry recovered");
            self.failing = false;
        }

        let cull = self
            .solver
            .config()
            .estimate_view_frustum
            .then(|| FrustumCullEstimator::estimate(&solution, slot.aspect));

        let input = BridgeInput {
            camera: slot.id,
            active: slot.active,
            model_to_world: slot.model_to_world,
            world_to_camera: solution.world_to_camera,
            projection: solution.projection,
            targets: slot.targets,
        };
        let (bridge, skipped) = match self.bridge.submit(&input, backend, queue) {
            Ok(outcome) => {
                if self.backend_lost {
                    log::info!("Render backend reachable again");
                    self.backend_lost = false;
                }
                (outcome, None)
            }
            Err(err) => {
                match err {
                    BridgeError::Rejected(_) => log::debug!("Frame not presented: {err}"),
                    // Reported once until the backend answers again
                    _ if !self.backend_lost => {
                        log::error!("Frame not presented: {err}");
                        self.backend_lost = true;
                    }
                    _ => {}
                }
                (BridgeOutcome::NothingToPresent, Some(SkipReason::Backend(err)))
            }
        };

        FrameOutput {
            reflection: Some(ReflectionCamera::from_solution(solution, slot.aspect)),
            cull,
            bridge,
            skipped,
        }
    }
}

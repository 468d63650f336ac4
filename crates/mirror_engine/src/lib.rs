//! # Mirror Engine
//!
//! Planar mirror reflections for an external rendering backend.
//!
//! ## Features
//!
//! - **Exact Off-Axis Projection**: Reflection camera pose and asymmetric frustum per frame
//! - **Back-Face Correction**: No upside-down image when the viewer walks behind the mirror
//! - **Culling Estimate**: Conservative symmetric field of view for culling and gizmos
//! - **Render Bridge**: Target-handle churn detection and ordered boundary calls
//! - **Threaded Backend**: Reference backend consuming commands on its own render thread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mirror_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReflectionConfig::default();
//!     let camera = CameraId(1);
//!     let mut rig = MirrorRig::new(camera, &config)?;
//!
//!     let mut backend = ThreadedBackend::spawn(BackendKind::platform_default(), |_, color, depth| {
//!         Ok(Box::new(ConstantBufferRenderer::new(color, depth)) as Box<dyn FrameRenderer>)
//!     })?;
//!     let mut queue = backend.graphics_queue();
//!
//!     let primary = CameraPose::perspective(Vec3::new(0.0, 1.0, 4.0), 60.0, 16.0 / 9.0, 0.3, 100.0);
//!     let snapshot = SceneSnapshot {
//!         mirror: MirrorSurface::default(),
//!         reflection: ReflectionCameraSlot::mirroring(camera, &primary)
//!             .with_targets(RenderTargetHandle::from_raw(0x10, 0x11)),
//!         primary,
//!     };
//!
//!     let output = rig.tick(&snapshot, &mut backend, &mut queue);
//!     assert!(output.presented());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;

pub mod bridge;
pub mod mirror;
pub mod packaging;
pub mod rig;
pub mod scene;

pub use rig::{FrameOutput, MirrorRig, ReflectionCamera, SkipReason};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        bridge::{
            BackendKind, BridgeError, BridgeOutcome, BridgeState, ConstantBufferRenderer, FrameCompletion,
            FrameRenderer, GraphicsQueue, RenderBackend, RenderBridge, RenderTargetHandle, ThreadedBackend,
        },
        core::config::{BridgeConfig, Config, ConfigError, EngineConfig, Handedness, NearClipMode, ReflectionConfig, SolverConfig},
        foundation::math::{Mat4, Quat, Transform, Vec3},
        mirror::{CullEstimate, FrustumCullEstimator, MirrorFrustumSolver, MirrorSolution, SolverError},
        scene::{CameraId, CameraPose, MirrorSurface, ReflectionCameraSlot, SceneSnapshot},
        FrameOutput, MirrorRig, ReflectionCamera, SkipReason,
    };
}

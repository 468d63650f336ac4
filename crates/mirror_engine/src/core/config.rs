//! # Unified Configuration System
//!
//! All tunables for the reflection camera live here: engine-wide logging
//! settings, the mirror solver's conventions and tolerances, and the render
//! bridge's backend conventions.
//!
//! ## Design Goals
//!
//! - **Centralized**: All configuration types in one place for easy discovery
//! - **Serializable**: Support for multiple config file formats (TOML, RON)
//! - **Explicit**: Backend conventions (vertical flip, handedness) are inputs
//!   supplied by the integrator, never guessed per call

use serde::{Deserialize, Serialize};

use crate::bridge::backend::BackendKind;

// Re-export from the config module for convenience
pub use crate::config::{Config, ConfigError};

/// Coordinate-handedness convention of the scene the mirror lives in
///
/// Decides which side of the mirror quad counts as its front face, and with it
/// the sign of the screen normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Handedness {
    /// Left-handed world (X right, Y up, Z forward away from the viewer)
    #[default]
    LeftHanded,
    /// Right-handed world (X right, Y up, Z toward the viewer)
    RightHanded,
}

impl Handedness {
    /// Sign applied to `cross(right, up)` to obtain the screen normal that
    /// points from the mirror toward the reflected eye
    pub const fn normal_sign(self) -> f32 {
        match self {
            Self::LeftHanded => -1.0,
            Self::RightHanded => 1.0,
        }
    }
}

/// Where the reflection camera's near plane sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum NearClipMode {
    /// Use the near distance of the reflection camera
    #[default]
    Camera,
    /// Put the near plane on the mirror itself, pushed out by `offset`
    ///
    /// Geometry between the reflected eye and the mirror (which lies behind
    /// the real mirror) is clipped away.
    MirrorPlane {
        /// Distance added to the eye-to-mirror distance
        offset: f32,
    },
}

/// # Mirror Solver Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Handedness convention of the scene
    pub handedness: Handedness,
    /// Smallest eye-to-mirror distance accepted before the geometry is
    /// declared degenerate
    pub degenerate_epsilon: f32,
    /// Near plane placement
    pub near_clip: NearClipMode,
    /// Whether to compute the conservative culling estimate every frame
    pub estimate_view_frustum: bool,
}

impl SolverConfig {
    /// Create a solver configuration with default tolerances
    pub fn new() -> Self {
        Self {
            handedness: Handedness::LeftHanded,
            degenerate_epsilon: 1e-5,
            near_clip: NearClipMode::Camera,
            estimate_view_frustum: true,
        }
    }

    /// Set handedness convention
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    /// Set degenerate-geometry tolerance
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.degenerate_epsilon = epsilon;
        self
    }

    /// Set near plane placement
    pub fn with_near_clip(mut self, near_clip: NearClipMode) -> Self {
        self.near_clip = near_clip;
        self
    }

    /// Enable or disable the culling estimate
    pub fn with_frustum_estimate(mut self, enabled: bool) -> Self {
        self.estimate_view_frustum = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.degenerate_epsilon.is_finite() && self.degenerate_epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "degenerate_epsilon must be a positive finite value, got {}",
                self.degenerate_epsilon
            )));
        }

        if let NearClipMode::MirrorPlane { offset } = self.near_clip {
            if !offset.is_finite() || offset < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "mirror-plane near clip offset must be finite and non-negative, got {offset}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Render Bridge Configuration
///
/// Conventions of the backend on the other side of the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Numeric identifier attached to every enqueued render event
    pub render_event_id: i32,
    /// Negate clip-space Y before sending the matrix (backends whose
    /// clip-space origin is top-left)
    pub flip_vertical: bool,
}

impl BridgeConfig {
    /// Create a bridge configuration for the given backend kind
    ///
    /// The vertical flip starts from the backend's documented convention; the
    /// integrator can still override it with [`BridgeConfig::with_flip_vertical`].
    pub fn for_backend(kind: BackendKind) -> Self {
        Self {
            render_event_id: 1,
            flip_vertical: kind.clip_space_origin_top_left(),
        }
    }

    /// Set the render event identifier
    pub fn with_render_event_id(mut self, id: i32) -> Self {
        self.render_event_id = id;
        self
    }

    /// Set the vertical flip flag
    pub fn with_flip_vertical(mut self, flip: bool) -> Self {
        self.flip_vertical = flip;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::for_backend(BackendKind::platform_default())
    }
}

/// # Engine Configuration
///
/// Logging and debug behaviour shared by every subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log filter for the engine (`env_logger` syntax)
    pub log_level: String,
    /// Raise this crate's own logging to `debug` on top of `log_level`
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Filter string handed to the logger
    pub fn log_filter(&self) -> String {
        if self.debug_mode {
            format!("{},mirror_engine=debug", self.log_level)
        } else {
            self.log_level.clone()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Reflection Configuration
///
/// Top-level configuration that encompasses all subsystems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReflectionConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Mirror solver configuration
    pub solver: SolverConfig,
    /// Render bridge configuration
    pub bridge: BridgeConfig,
}

impl ReflectionConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level cannot be empty".to_string()));
        }
        self.solver.validate()
    }
}

impl Config for ReflectionConfig {}

//! # Core Engine Module
//!
//! Shared abstractions used throughout the crate.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for the solver, the bridge and logging

pub mod config;

// Re-export commonly used config types
pub use config::{
    BridgeConfig,
    Config,
    ConfigError,
    EngineConfig,
    Handedness,
    NearClipMode,
    ReflectionConfig,
    SolverConfig,
};

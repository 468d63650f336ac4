//! Mirror camera mathematics
//!
//! - [`solver`]: exact off-axis projection and camera basis for the reflection
//! - [`frustum`]: asymmetric frustum extents
//! - [`cull_estimate`]: conservative symmetric stand-in for culling

pub mod cull_estimate;
pub mod frustum;
pub mod solver;

pub use cull_estimate::{CullEstimate, FrustumCullEstimator};
pub use frustum::AsymmetricFrustum;
pub use solver::{
    reflect_point, DegenerateGeometryError, EyeVectors, MirrorFrustumSolver, MirrorSolution, ScreenBasis,
    SolverError,
};

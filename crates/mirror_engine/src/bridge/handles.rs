//! Opaque identifiers that cross the backend boundary
//!
//! The host graphics system owns the resources behind these identifiers and
//! may reallocate them between frames. Raw identity is the only valid
//! liveness check: two handles are the same resource exactly when their raw
//! values are equal.

use std::fmt;
use std::num::NonZeroU64;

/// Raw identifier of a host-owned graphics resource (never zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonZeroU64);

impl NativeHandle {
    /// Wrap a raw identifier; zero is the host's null handle and yields `None`
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Raw identifier value
    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.raw())
    }
}

/// Color/depth identifier pair of the offscreen target the reflection
/// camera renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderTargetHandle {
    /// Color target identifier, `None` while the host has not allocated it
    pub color: Option<NativeHandle>,
    /// Depth target identifier, `None` while the host has not allocated it
    pub depth: Option<NativeHandle>,
}

impl RenderTargetHandle {
    /// Handle pair with neither target available
    pub const NULL: Self = Self {
        color: None,
        depth: None,
    };

    /// Build a pair from raw identifiers (zero meaning null)
    pub fn from_raw(color: u64, depth: u64) -> Self {
        Self {
            color: NativeHandle::new(color),
            depth: NativeHandle::new(depth),
        }
    }

    /// Both targets as a pair, if both are available
    ///
    /// The backend can only render with a complete pair, so a half-allocated
    /// target counts as unavailable.
    pub fn available(&self) -> Option<(NativeHandle, NativeHandle)> {
        Some((self.color?, self.depth?))
    }
}

/// Opaque token the host passes back when it enqueues a render event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderEventToken(pub u64);

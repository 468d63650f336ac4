//! Backend source manifest
//!
//! A deployment step outside this crate copies the backend's native sources
//! into a generated platform project. This module only exposes the file set,
//! in a fixed order, so that step can enumerate it.

use crate::bridge::backend::BackendKind;

/// Kind of file in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Header, registered for include paths only
    Header,
    /// Translation unit, registered for compilation
    Source,
}

/// One backend source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSource {
    /// Path relative to the plugin source root
    pub path: &'static str,
    /// Whether the file is compiled
    pub role: SourceRole,
    /// Backends that need the file; empty means every backend
    pub platforms: &'static [BackendKind],
}

impl BackendSource {
    /// Whether `kind` needs this file
    pub fn used_by(&self, kind: BackendKind) -> bool {
        self.platforms.is_empty() || self.platforms.contains(&kind)
    }
}

const ALL: &[BackendKind] = &[];
const GL: &[BackendKind] = &[BackendKind::OpenGLCore, BackendKind::OpenGLES];

const BACKEND_SOURCES: &[BackendSource] = &[
    BackendSource { path: "src/PlatformBase.h", role: SourceRole::Header, platforms: ALL },
    BackendSource { path: "src/RenderAPI.h", role: SourceRole::Header, platforms: ALL },
    BackendSource { path: "src/RenderAPI.cpp", role: SourceRole::Source, platforms: ALL },
    BackendSource {
        path: "src/RenderAPI_D3D11.cpp",
        role: SourceRole::Source,
        platforms: &[BackendKind::Direct3D11],
    },
    BackendSource {
        path: "src/RenderAPI_D3D12.cpp",
        role: SourceRole::Source,
        platforms: &[BackendKind::Direct3D12],
    },
    BackendSource { path: "src/RenderAPI_OpenGLCoreES.cpp", role: SourceRole::Source, platforms: GL },
    BackendSource { path: "src/RenderAPI_Vulkan.cpp", role: SourceRole::Source, platforms: &[BackendKind::Vulkan] },
    BackendSource { path: "src/RenderAPI_Metal.mm", role: SourceRole::Source, platforms: &[BackendKind::Metal] },
    BackendSource { path: "src/SamplePlugin.h", role: SourceRole::Header, platforms: ALL },
    BackendSource { path: "src/SamplePlugin.cpp", role: SourceRole::Source, platforms: ALL },
    BackendSource { path: "src/RenderingPlugin.cpp", role: SourceRole::Source, platforms: ALL },
];

/// Every backend source file, in deployment order
pub fn backend_sources() -> &'static [BackendSource] {
    BACKEND_SOURCES
}

/// Files needed by one backend, in deployment order
pub fn sources_for(kind: BackendKind) -> impl Iterator<Item = &'static BackendSource> {
    BACKEND_SOURCES.iter().filter(move |source| source.used_by(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_manifest_order_is_stable() {
        let paths: Vec<&str> = backend_sources().iter().map(|s| s.path).collect();
        assert_eq!(paths.first(), Some(&"src/PlatformBase.h"));
        assert_eq!(paths.last(), Some(&"src/RenderingPlugin.cpp"));
        assert_eq!(paths, backend_sources().iter().map(|s| s.path).collect::<Vec<_>>());
    }

    #[test]
    fn test_paths_are_unique() {
        let unique: HashSet<&str> = backend_sources().iter().map(|s| s.path).collect();
        assert_eq!(unique.len(), backend_sources().len());
    }

    #[test]
    fn test_filter_keeps_shared_files_and_own_backend() {
        let gles: Vec<&str> = sources_for(BackendKind::OpenGLES).map(|s| s.path).collect();
        assert!(gles.contains(&"src/RenderAPI_OpenGLCoreES.cpp"));
        assert!(gles.contains(&"src/RenderingPlugin.cpp"));
        assert!(!gles.contains(&"src/RenderAPI_D3D11.cpp"));
        assert!(!gles.contains(&"src/RenderAPI_Metal.mm"));
    }

    #[test]
    fn test_filtered_list_preserves_order() {
        let full: Vec<&str> = backend_sources().iter().map(|s| s.path).collect();
        let d3d: Vec<&str> = sources_for(BackendKind::Direct3D12).map(|s| s.path).collect();

        let positions: Vec<usize> = d3d
            .iter()
            .map(|p| full.iter().position(|f| f == p).expect("present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_headers_are_not_compiled() {
        assert!(backend_sources()
            .iter()
            .filter(|s| s.path.ends_with(".h"))
            .all(|s| s.role == SourceRole::Header));
    }
}

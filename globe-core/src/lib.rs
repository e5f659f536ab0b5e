//! Globe core library: domain types, manifest reading, dependency
//! resolution, persisted app state, and the platform capability trait.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`ManifestError`], [`StateError`], [`PlatformError`]
//! - [`context`]: the explicit [`Context`] threaded through every call
//! - [`manifest`]: package manifest reading ([`ManifestSource`])
//! - [`resolver`]: transitive dependency resolution
//! - [`state`]: load / save / resolve app locations
//! - [`platform`]: the [`Platform`] capability interface

pub mod context;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod platform;
pub mod resolver;
pub mod state;
pub mod types;

pub use context::Context;
pub use error::{ManifestError, PlatformError, StateError};
pub use manifest::{ManifestSource, WorkspaceManifests};
pub use platform::{BuildOutput, Platform, PlatformContext};
pub use resolver::resolve;
pub use types::{
    AppState, DependencySet, DistManifest, GlobeSection, PackageManifest, PackageName,
    RootManifest, WorkspaceState,
};

//! # globe-platforms
//!
//! The platforms an app can target, selected by `globe.env` in its
//! manifest: `expo`, `web`, `dom`, or a local env package in the workspace.
//!
//! ```rust,no_run
//! use globe_core::{manifest::read_app_manifest, Context, Platform};
//! use globe_platforms::PlatformKind;
//!
//! fn which(ctx: &Context, app: &str) {
//!     if let Ok(manifest) = read_app_manifest(ctx, app) {
//!         if let Ok(platform) = PlatformKind::select(ctx, app, &manifest) {
//!             println!("{app} runs on {}", platform.name());
//!         }
//!     }
//! }
//! ```

pub mod dom;
pub mod engine;
pub mod error;
pub mod expo;
pub mod kind;
pub mod local;
pub mod process;
pub mod proto;
pub mod web;

pub use engine::{EntryContext, Renderer};
pub use error::RenderError;
pub use kind::PlatformKind;

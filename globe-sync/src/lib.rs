//! # globe-sync
//!
//! Reconciles an app location against the resolved dependency set.
//!
//! Call [`sync`] to resolve, evict stale packages, mirror current ones, merge
//! the distribution manifest, and hand it to the platform's apply step.

pub mod engine;
pub mod error;
pub mod lock;
pub mod merge;
pub mod mirror;
pub mod writer;

pub use engine::{sync, SyncReport};
pub use error::SyncError;
pub use merge::merge_manifest;
pub use writer::{atomic_write, WriteResult};

//! # globe-watch
//!
//! Debounced filesystem watching: a pure [`Debouncer`] state machine, the
//! [`EventFilter`] deciding which events count, and the notify/tokio loop
//! that drives a resync callback.

pub mod debounce;
mod error;
pub mod filter;
pub mod logging;
mod runtime;

pub use debounce::{DebounceState, Debouncer, DEBOUNCE_WINDOW};
pub use error::WatchError;
pub use filter::EventFilter;
pub use logging::init_tracing;
pub use runtime::{watch, WatchHandle};

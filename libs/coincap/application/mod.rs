//! Application Layer
//!
//! The interactive watcher: state, key handling and rendering.

pub mod watch;

pub use watch::{App, WatchState};

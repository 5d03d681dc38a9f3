//! CoinCap Watch - Main Library
//!
//! Terminal watcher for CoinCap assets and live trades on favorites.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **coincap**: Domain, clients and the terminal UI (re-exported from workspace)
//! - **hypersockets**: WebSocket library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use coincap_watch::bin_common::load_config_from_env;
//! use coincap_watch::coincap::WatchConfig;
//! ```

// Re-export workspace libraries for convenience
pub use coincap;
pub use hypersockets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{config_path_from, load_config_from_env, parse_args, parse_favorites};
    pub use runner::{BinaryRunner, RunConfig};
}

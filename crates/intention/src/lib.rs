//! Intention
//!
//! A small toolkit built around a dependency-driven module loader.
//!
//! # Example
//! ```rust,ignore
//! use intention::{Config, Toolkit};
//! use intention::loader::{BundleFetcher, Definition};
//!
//! let toolkit = Toolkit::new(Config::default(), BundleFetcher::new());
//! toolkit.loader().register(Definition::new("left", |_| 1i64));
//! ```

mod config;
mod toolkit;

pub use config::{Config, ConfigError};
pub use toolkit::Toolkit;

// Re-export sub-crates
pub use intention_loader as loader;
pub use intention_util as util;
pub use intention_worker as worker;

/// Toolkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

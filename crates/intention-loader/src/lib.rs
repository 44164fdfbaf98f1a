//! Intention Module Loader
//!
//! Registers named modules with declared dependencies, fetches the ones it
//! does not know yet and runs each factory exactly once its dependencies are
//! available.
//!
//! Features:
//! - Typed registry slots instead of sentinel values
//! - Fetch fan-out on a `smol` executor with a count-down batch
//! - Recursive on-demand resolution, tolerant of out-of-order fetches
//! - Bundled, filesystem and HTTP fetchers behind the [`Fetcher`] trait
//!
//! # Example
//! ```rust,ignore
//! use intention_loader::{BundleFetcher, Definition, LoaderContext};
//!
//! let loader = LoaderContext::new(BundleFetcher::new());
//! loader.register(Definition::new("left", |_| 1i64));
//! loader.register(Definition::new("right", |deps| deps.value::<i64>(0).unwrap() + 1).depends_on("left"));
//! smol::block_on(loader.run_until_settled())?;
//! ```

mod batch;
mod context;
mod definition;
mod export;
pub mod fetch;
pub mod http;
pub mod naming;

pub use batch::BatchStatus;
pub use context::LoaderContext;
pub use definition::{Definition, DependencyList, Factory};
pub use export::{Export, Imports};
pub use fetch::{BundleFetcher, FetchRequest, Fetcher, FsFetcher};
pub use http::HttpFetcher;
pub use naming::NamingConvention;

use std::sync::Arc;

/// Fetch error
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    
    #[error("Failed to read {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    
    #[error("Request for {locator} failed: {source}")]
    Http {
        locator: String,
        #[source]
        source: reqwest::Error,
    },
    
    #[error("{locator} answered with HTTP {status}")]
    Status { locator: String, status: u16 },
    
    #[error("Fetch failed: {0}")]
    Failed(String),
}

/// Loader error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoaderError {
    #[error("Dependency \"{locator}\" failed to load (check the prefix / suffix)")]
    Fetch {
        locator: String,
        #[source]
        source: Arc<FetchError>,
    },
    
    #[error("Fetch batch was reset before it settled")]
    Cancelled,
}

//! Resource Fetchers
//!
//! Transports that bring in the code behind a dependency name.
//!
//! A fetch "executes" the resource it retrieves: bundled entries and
//! source handlers receive the loader and may register modules on it
//! before the fetch completes.

use crate::context::LoaderContext;
use crate::FetchError;
use smol::future::{self, FutureExt};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Future returned by a fetch
pub type FetchFuture = future::Boxed<Result<(), FetchError>>;

/// A single fetch issued by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Dependency name as declared
    pub name: String,
    /// Location after applying the naming convention
    pub locator: String,
    /// Dependency is an opaque external resource, not a module
    pub external: bool,
}

/// Retrieves and executes the resource behind a locator
///
/// The returned future must resolve exactly once. An error is treated
/// as unrecoverable by the loader.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: FetchRequest, loader: LoaderContext) -> FetchFuture;
}

impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    fn fetch(&self, request: FetchRequest, loader: LoaderContext) -> FetchFuture {
        (**self).fetch(request, loader)
    }
}

/// Code run when a bundled entry is fetched
pub type Installer = Arc<dyn Fn(&LoaderContext) + Send + Sync>;

/// Bundled-asset lookup keyed by locator
///
/// Clones share the same entries, so a bundle can keep growing after it
/// was handed to a loader.
#[derive(Clone, Default)]
pub struct BundleFetcher {
    entries: Arc<RwLock<HashMap<String, Installer>>>,
}

impl BundleFetcher {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Add an entry whose installer runs on every fetch of `locator`
    pub fn insert<F>(&self, locator: impl Into<String>, installer: F)
    where
        F: Fn(&LoaderContext) + Send + Sync + 'static,
    {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(locator.into(), Arc::new(installer));
    }
    
    /// Builder form of [`BundleFetcher::insert`]
    pub fn with<F>(self, locator: impl Into<String>, installer: F) -> Self
    where
        F: Fn(&LoaderContext) + Send + Sync + 'static,
    {
        self.insert(locator, installer);
        self
    }
    
    /// Add a raw resource that registers nothing
    pub fn with_asset(self, locator: impl Into<String>) -> Self {
        self.with(locator, |_| {})
    }
    
    pub fn contains(&self, locator: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(locator)
    }
    
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Fetcher for BundleFetcher {
    fn fetch(&self, request: FetchRequest, loader: LoaderContext) -> FetchFuture {
        let installer = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.locator)
            .cloned();
        
        async move {
            // Yield once so completion is never observed inside `register`
            future::yield_now().await;
            
            let installer = installer.ok_or_else(|| FetchError::NotFound(request.locator.clone()))?;
            installer(&loader);
            Ok(())
        }
        .boxed()
    }
}

/// Called with the bytes of every file fetched from disk
pub type SourceHandler = Arc<dyn Fn(&LoaderContext, &FetchRequest, Vec<u8>) + Send + Sync>;

/// Reads locators as paths below a root directory
#[derive(Clone)]
pub struct FsFetcher {
    root: PathBuf,
    handler: SourceHandler,
}

impl FsFetcher {
    pub fn new<F>(root: impl Into<PathBuf>, handler: F) -> Self
    where
        F: Fn(&LoaderContext, &FetchRequest, Vec<u8>) + Send + Sync + 'static,
    {
        Self {
            root: root.into(),
            handler: Arc::new(handler),
        }
    }
    
    pub fn root(&self) -> &Path {
        &self.root
    }
    
    /// Path a locator maps to
    pub fn path_for(&self, locator: &str) -> PathBuf {
        self.root.join(locator.trim_start_matches('/'))
    }
}

impl Fetcher for FsFetcher {
    fn fetch(&self, request: FetchRequest, loader: LoaderContext) -> FetchFuture {
        let path = self.path_for(&request.locator);
        let handler = self.handler.clone();
        
        async move {
            if request.locator.contains("://") {
                return Err(FetchError::Failed(format!(
                    "{} is not served from the filesystem",
                    request.locator
                )));
            }
            
            tracing::debug!("Reading {}", path.display());
            let bytes = smol::fs::read(&path).await.map_err(|source| match source.kind() {
                ErrorKind::NotFound => FetchError::NotFound(request.locator.clone()),
                _ => FetchError::Io {
                    locator: request.locator.clone(),
                    source,
                },
            })?;
            
            handler(&loader, &request, bytes);
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_bundle_entries() {
        let bundle = BundleFetcher::new()
            .with_asset("/js/a.js")
            .with("/js/b.js", |_| {});
        
        assert_eq!(bundle.len(), 2);
        assert!(bundle.contains("/js/a.js"));
        assert!(!bundle.contains("/js/c.js"));
        
        let shared = bundle.clone();
        shared.insert("/js/c.js", |_| {});
        assert!(bundle.contains("/js/c.js"));
    }
    
    #[test]
    fn test_fs_path_for() {
        let fetcher = FsFetcher::new("/srv/assets", |_, _, _| {});
        
        assert_eq!(fetcher.path_for("/js/left.js"), PathBuf::from("/srv/assets/js/left.js"));
        assert_eq!(fetcher.path_for("left"), PathBuf::from("/srv/assets/left"));
    }
}

//! Toolkit
//!
//! Loader context plus the shared helpers modules reach for.

use crate::config::Config;
use intention_loader::{Fetcher, FsFetcher, LoaderContext};
use intention_util::{Board, TimerRegistry};
use std::sync::Arc;

/// One loader with its shared board and timers
pub struct Toolkit {
    config: Config,
    loader: LoaderContext,
    board: Board,
    timers: Arc<TimerRegistry>,
}

impl Toolkit {
    pub fn new(config: Config, fetcher: impl Fetcher + 'static) -> Self {
        let loader = LoaderContext::new(fetcher);
        loader.set_naming(config.naming());
        
        tracing::info!("Intention {} initialized ({}*{})", crate::VERSION, config.prefix, config.suffix);
        
        Self {
            config,
            loader,
            board: Board::new(),
            timers: Arc::new(TimerRegistry::new()),
        }
    }
    
    /// Toolkit reading modules from `config.asset_root`
    ///
    /// Returns `None` when no asset root is configured.
    pub fn from_assets<F>(config: Config, handler: F) -> Option<Self>
    where
        F: Fn(&LoaderContext, &intention_loader::FetchRequest, Vec<u8>) + Send + Sync + 'static,
    {
        let root = config.asset_root.clone()?;
        Some(Self::new(config, FsFetcher::new(root, handler)))
    }
    
    pub fn config(&self) -> &Config {
        &self.config
    }
    
    pub fn loader(&self) -> &LoaderContext {
        &self.loader
    }
    
    pub fn board(&self) -> &Board {
        &self.board
    }
    
    pub fn timers(&self) -> &Arc<TimerRegistry> {
        &self.timers
    }
}

impl Drop for Toolkit {
    fn drop(&mut self) {
        self.timers.stop_all();
    }
}

//! Loader Context
//!
//! Module registry, fetch fan-out and dependency-driven initialization.
//!
//! A context owns two tables: `slots` tracks every name the loader has heard
//! of (fetch in flight, fetched, registered, initialized) and `processed`
//! holds the export of every module whose factory already ran. Fetches run
//! as tasks on the context's executor; when the last fetch of a batch comes
//! back the context sweeps all known modules.

use crate::batch::{BatchStatus, FetchBatch};
use crate::definition::{Definition, DependencyList, Factory};
use crate::export::{Export, Imports};
use crate::fetch::{FetchRequest, Fetcher};
use crate::naming::NamingConvention;
use crate::{FetchError, LoaderError};
use smol::channel::{self, Sender};
use smol::Executor;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Prefix of the synthetic names given to anonymous loads
const ANONYMOUS_PREFIX: &str = "<anonymous>#";

/// Entry of the unprocessed table
enum Slot {
    /// Fetch in flight
    Pending { external: bool },
    /// Fetch finished without registering a module under this name
    Fetched { external: bool },
    /// Factory waiting for its dependencies
    Registered {
        factory: Factory,
        dependencies: Vec<String>,
    },
    /// Factory running
    Initializing,
    /// Factory ran, export is in `processed`
    Initialized,
}

/// Outcome of resolving one dependency
enum Resolution {
    Value(Export),
    External,
    Unresolved,
}

#[derive(Default)]
struct State {
    slots: HashMap<String, Slot>,
    processed: HashMap<String, Export>,
    /// Names the current batch sweeps, in registration order
    modules: Vec<String>,
    /// Fetches not yet completed, with the batch generation counting them
    in_flight: HashMap<String, u64>,
    resolving: HashSet<String>,
    batch: FetchBatch,
    waiters: Vec<Sender<Result<(), LoaderError>>>,
}

impl State {
    fn notify(&mut self, result: Result<(), LoaderError>) {
        for waiter in self.waiters.drain(..) {
            let _ = waiter.try_send(result.clone());
        }
    }

    /// Start a new batch; pending `settled` calls observe a cancellation
    fn reset_batch(&mut self) {
        self.batch.reset();
        self.modules.clear();
        self.waiters.clear();
    }
}

struct Inner {
    state: Mutex<State>,
    naming: RwLock<NamingConvention>,
    fetcher: Box<dyn Fetcher>,
    executor: Arc<Executor<'static>>,
    anonymous: AtomicU64,
}

/// Module registry and loader
///
/// Cheap to clone; clones share the same registry. Independent contexts do
/// not see each other's modules.
#[derive(Clone)]
pub struct LoaderContext {
    inner: Arc<Inner>,
}

impl LoaderContext {
    /// Create a context with its own executor
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        Self::with_executor(fetcher, Arc::new(Executor::new()))
    }

    /// Create a context that spawns fetches on `executor`
    pub fn with_executor(fetcher: impl Fetcher + 'static, executor: Arc<Executor<'static>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                naming: RwLock::new(NamingConvention::default()),
                fetcher: Box::new(fetcher),
                executor,
                anonymous: AtomicU64::new(0),
            }),
        }
    }

    /// Executor the fetch tasks run on
    pub fn executor(&self) -> &Arc<Executor<'static>> {
        &self.inner.executor
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // NAMING
    // ========================================================================

    pub fn naming(&self) -> NamingConvention {
        self.inner.naming.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Set the naming convention used by subsequent fetches
    pub fn set_naming(&self, naming: NamingConvention) {
        *self.inner.naming.write().unwrap_or_else(PoisonError::into_inner) = naming;
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.naming.write().unwrap_or_else(PoisonError::into_inner).prefix = prefix.into();
    }

    pub fn set_suffix(&self, suffix: impl Into<String>) {
        self.inner.naming.write().unwrap_or_else(PoisonError::into_inner).suffix = suffix.into();
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Register a module
    ///
    /// Returns the existing export if a module with this name was already
    /// initialized; the new factory is dropped in that case. Otherwise every
    /// dependency the context has never heard of is fetched, and `None` is
    /// returned. Initialization happens once the fetches settle, or right
    /// away when nothing had to be fetched and no batch is in flight.
    pub fn register(&self, definition: Definition) -> Option<Export> {
        let Definition { name, dependencies, factory, external } = definition;
        let naming = self.naming();

        let mut guard = self.lock();
        let state = &mut *guard;

        if let Some(export) = state.processed.get(&name) {
            tracing::debug!("Module {} already initialized", name);
            return Some(export.clone());
        }

        // The first factory keeps the dependencies it was declared with
        let absorbed = matches!(
            state.slots.get(&name),
            Some(Slot::Registered { .. } | Slot::Initializing | Slot::Initialized)
        );
        if absorbed {
            tracing::debug!("Module {} already registered, keeping the first factory", name);
        } else {
            state.slots.insert(
                name.clone(),
                Slot::Registered {
                    factory,
                    dependencies: dependencies.clone(),
                },
            );
        }

        if !state.modules.contains(&name) {
            state.modules.push(name.clone());
        }

        let dependencies = if absorbed { Vec::new() } else { dependencies };
        let generation = state.batch.generation();
        let mut requests = Vec::new();
        for dependency in dependencies {
            if let Some(counted_by) = state.in_flight.get_mut(&dependency) {
                // Still fetching for an abandoned batch; this batch waits for it too
                if *counted_by != generation {
                    *counted_by = generation;
                    state.batch.issue();
                }
                continue;
            }
            if state.slots.contains_key(&dependency) {
                continue;
            }

            // Marked before the fetch starts so a second dependant doesn't fetch it again
            state.slots.insert(dependency.clone(), Slot::Pending { external });
            state.in_flight.insert(dependency.clone(), generation);
            state.batch.issue();

            requests.push(FetchRequest {
                locator: naming.locate(&dependency, external),
                name: dependency,
                external,
            });
        }

        let sweep_now = requests.is_empty() && state.batch.is_idle();
        drop(guard);

        for request in requests {
            self.spawn_fetch(request);
        }

        if sweep_now {
            self.initialize_all();
        }

        None
    }

    /// Register an anonymous module and start a fresh batch
    ///
    /// Fetch counters and the list of modules to sweep are reset first;
    /// already initialized modules stay available. Returns the synthetic
    /// name the callback was registered under.
    pub fn load<F, T>(&self, dependencies: impl Into<DependencyList>, callback: F, external: bool) -> String
    where
        F: FnOnce(Imports) -> T + Send + 'static,
        T: Any + Send + Sync,
    {
        self.lock().reset_batch();

        let id = self.inner.anonymous.fetch_add(1, Ordering::Relaxed);
        let name = format!("{ANONYMOUS_PREFIX}{id}");

        self.register(
            Definition::new(name.clone(), callback)
                .depends_on(dependencies)
                .external(external),
        );

        name
    }

    /// Forget every module, value and in-flight batch
    ///
    /// Anonymous names keep counting up so they never repeat.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.reset_batch();
        state.slots.clear();
        state.in_flight.clear();
        state.processed.clear();
        state.resolving.clear();
    }

    // ========================================================================
    // FETCHING
    // ========================================================================

    fn spawn_fetch(&self, request: FetchRequest) {
        tracing::debug!("Fetching {} from {}", request.name, request.locator);

        let fetch = self.inner.fetcher.fetch(request.clone(), self.clone());
        let loader = self.clone();

        self.inner
            .executor
            .spawn(async move {
                let result = fetch.await;
                loader.complete_fetch(&request, result);
            })
            .detach();
    }

    fn complete_fetch(&self, request: &FetchRequest, result: Result<(), FetchError>) {
        let mut state = self.lock();
        let current = state.in_flight.remove(&request.name) == Some(state.batch.generation());

        if let Some(Slot::Pending { external }) = state.slots.get(&request.name) {
            let external = *external;
            state.slots.insert(request.name.clone(), Slot::Fetched { external });
        }

        if let Err(err) = result {
            tracing::error!("Dependency {} failed to load from {}: {}", request.name, request.locator, err);

            if current {
                let error = LoaderError::Fetch {
                    locator: request.locator.clone(),
                    source: Arc::new(err),
                };
                state.batch.fail(error.clone());
                state.notify(Err(error));
            }
            return;
        }

        if !current {
            tracing::warn!("Ignoring completion of {} from a reset batch", request.locator);
            return;
        }

        state.batch.complete();
        tracing::debug!("Fetched {} ({}/{})", request.locator, state.batch.status().completed, state.batch.status().issued);

        if !state.batch.is_settled() || state.batch.failure().is_some() {
            return;
        }
        drop(state);

        self.initialize_all();

        let mut state = self.lock();
        if state.batch.is_idle() && state.batch.failure().is_none() {
            tracing::info!("Batch settled: {} modules initialized", state.processed.len());
            state.notify(Ok(()));
        }
    }

    /// Snapshot of the current batch
    pub fn batch(&self) -> BatchStatus {
        self.lock().batch.status()
    }

    /// Wait until every fetch of the current batch came back and the sweep ran
    ///
    /// Fetch tasks only make progress while the executor runs; see
    /// [`LoaderContext::run_until_settled`].
    pub async fn settled(&self) -> Result<(), LoaderError> {
        let receiver = {
            let mut state = self.lock();

            if let Some(err) = state.batch.failure() {
                return Err(err.clone());
            }
            if state.batch.is_idle() {
                return Ok(());
            }

            let (sender, receiver) = channel::bounded(1);
            state.waiters.push(sender);
            receiver
        };

        receiver.recv().await.unwrap_or(Err(LoaderError::Cancelled))
    }

    /// Drive the executor until the current batch settles
    pub async fn run_until_settled(&self) -> Result<(), LoaderError> {
        self.inner.executor.run(self.settled()).await
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Initialize every known module that can be
    ///
    /// Modules with an unresolvable dependency are left as they are.
    pub fn initialize_all(&self) {
        let names: Vec<String> = {
            let state = self.lock();
            state
                .modules
                .iter()
                .filter(|m| !state.processed.contains_key(*m))
                .cloned()
                .collect()
        };

        for name in names {
            self.resolve_inner(&name);
        }
    }

    /// Get a module's export, initializing it and its dependencies if needed
    ///
    /// Returns `None` when the module can't be found; that is not an error,
    /// the name may belong to an external resource.
    pub fn resolve(&self, name: &str) -> Option<Export> {
        match self.resolve_inner(name) {
            Resolution::Value(export) => Some(export),
            Resolution::External | Resolution::Unresolved => None,
        }
    }

    /// Get a module's export without triggering resolution
    pub fn get_resolved(&self, name: &str) -> Option<Export> {
        self.lock().processed.get(name).cloned()
    }

    /// Check whether a module's factory already ran
    pub fn is_initialized(&self, name: &str) -> bool {
        self.lock().processed.contains_key(name)
    }

    fn resolve_inner(&self, name: &str) -> Resolution {
        let dependencies = {
            let mut state = self.lock();

            if let Some(export) = state.processed.get(name) {
                return Resolution::Value(export.clone());
            }

            let dependencies = match state.slots.get(name) {
                Some(Slot::Registered { dependencies, .. }) => dependencies.clone(),
                Some(Slot::Fetched { external: true }) => return Resolution::External,
                Some(Slot::Pending { .. }) => {
                    tracing::debug!("Module {} is still being fetched", name);
                    return Resolution::Unresolved;
                }
                Some(Slot::Initializing) => {
                    tracing::warn!("Module {} depends on itself while initializing", name);
                    return Resolution::Unresolved;
                }
                Some(Slot::Fetched { external: false } | Slot::Initialized) | None => {
                    tracing::info!("Unable to find requested module ({}), assuming it is not meant to be a module", name);
                    return Resolution::Unresolved;
                }
            };

            // Left over from an abandoned batch
            if !state.modules.iter().any(|m| m == name) {
                tracing::info!("Unable to find requested module ({}), assuming it is not meant to be a module", name);
                return Resolution::Unresolved;
            }

            if !state.resolving.insert(name.to_string()) {
                tracing::warn!("Dependency cycle through module {}", name);
                return Resolution::Unresolved;
            }

            dependencies
        };

        let mut values = Vec::with_capacity(dependencies.len());
        for dependency in &dependencies {
            match self.resolve_inner(dependency) {
                Resolution::Value(export) => values.push(Some(export)),
                Resolution::External => values.push(None),
                Resolution::Unresolved => {
                    self.lock().resolving.remove(name);
                    tracing::debug!("Module {} waits for {}", name, dependency);
                    return Resolution::Unresolved;
                }
            }
        }

        let factory = {
            let mut state = self.lock();
            state.resolving.remove(name);

            // A dependency may have pulled this module in already
            if let Some(export) = state.processed.get(name) {
                return Resolution::Value(export.clone());
            }

            match state.slots.insert(name.to_string(), Slot::Initializing) {
                Some(Slot::Registered { factory, .. }) => factory,
                Some(other) => {
                    state.slots.insert(name.to_string(), other);
                    return Resolution::Unresolved;
                }
                None => {
                    state.slots.remove(name);
                    return Resolution::Unresolved;
                }
            }
        };

        let export = factory(Imports::new(values));

        let mut state = self.lock();
        state.slots.insert(name.to_string(), Slot::Initialized);
        let export = state.processed.entry(name.to_string()).or_insert(export).clone();
        tracing::debug!("Initialized module {}", name);

        Resolution::Value(export)
    }
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("LoaderContext")
            .field("known", &state.slots.len())
            .field("processed", &state.processed.len())
            .field("batch", &state.batch.status())
            .finish()
    }
}

//! Module Values
//!
//! Type-erased values exported by module factories.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Value produced by a module factory
///
/// Cloning is cheap; every consumer of a module observes the same value.
#[derive(Clone)]
pub struct Export(Arc<dyn Any + Send + Sync>);

impl Export {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }
    
    /// Borrow the value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
    
    /// Get a shared handle to the value as `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().downcast::<T>().ok()
    }
    
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
    
    /// Check whether two exports are the same value
    pub fn ptr_eq(&self, other: &Export) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Export(..)")
    }
}

/// Resolved dependencies handed to a factory, in declaration order
///
/// A slot is `None` when the dependency is an external resource that
/// carries no module value.
#[derive(Debug, Clone, Default)]
pub struct Imports {
    values: Vec<Option<Export>>,
}

impl Imports {
    pub(crate) fn new(values: Vec<Option<Export>>) -> Self {
        Self { values }
    }
    
    /// Get the export at `index`
    pub fn get(&self, index: usize) -> Option<&Export> {
        self.values.get(index).and_then(|v| v.as_ref())
    }
    
    /// Borrow the export at `index` as `T`
    pub fn value<T: Any>(&self, index: usize) -> Option<&T> {
        self.get(index).and_then(|e| e.downcast_ref::<T>())
    }
    
    pub fn len(&self) -> usize {
        self.values.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    
    pub fn iter(&self) -> impl Iterator<Item = Option<&Export>> {
        self.values.iter().map(|v| v.as_ref())
    }
}

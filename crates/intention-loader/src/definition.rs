//! Module Definitions
//!
//! Name, dependency list and factory of a module to register.

use crate::export::{Export, Imports};
use std::any::Any;
use std::fmt;

/// Factory invoked with the resolved dependencies of a module
pub type Factory = Box<dyn FnOnce(Imports) -> Export + Send>;

/// Ordered dependency names
///
/// Built from a single name or any sequence of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList(Vec<String>);

impl DependencyList {
    pub fn none() -> Self {
        Self::default()
    }
    
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
    
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for DependencyList {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for DependencyList {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for DependencyList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for DependencyList {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for DependencyList {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for DependencyList {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

/// A module waiting to be registered
pub struct Definition {
    pub(crate) name: String,
    pub(crate) dependencies: Vec<String>,
    pub(crate) factory: Factory,
    pub(crate) external: bool,
}

impl Definition {
    /// Define a module without dependencies
    ///
    /// The factory's return value becomes the module's export.
    pub fn new<F, T>(name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(Imports) -> T + Send + 'static,
        T: Any + Send + Sync,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            factory: Box::new(move |imports| Export::new(factory(imports))),
            external: false,
        }
    }
    
    /// Set the dependencies passed to the factory, in order
    pub fn depends_on(mut self, dependencies: impl Into<DependencyList>) -> Self {
        self.dependencies = dependencies.into().into_vec();
        self
    }
    
    /// Treat dependencies as external resource locators instead of modules
    pub fn external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }
    
    pub fn name(&self) -> &str {
        &self.name
    }
    
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
    
    pub fn is_external(&self) -> bool {
        self.external
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("external", &self.external)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_dependency_list_forms() {
        assert_eq!(DependencyList::from("a").as_slice(), ["a"]);
        assert_eq!(DependencyList::from(["a", "b"]).as_slice(), ["a", "b"]);
        assert_eq!(DependencyList::from(vec!["a", "b"]), DependencyList::from(["a", "b"]));
        assert!(DependencyList::none().is_empty());
    }
    
    #[test]
    fn test_definition_builder() {
        let def = Definition::new("right", |imports| imports.len())
            .depends_on("left")
            .external(true);
        
        assert_eq!(def.name(), "right");
        assert_eq!(def.dependencies(), ["left"]);
        assert!(def.is_external());
        
        let export = (def.factory)(Imports::new(vec![None]));
        assert_eq!(export.downcast_ref::<usize>(), Some(&1));
    }
}

//! Compiled-template storage behind the runtime environment.

use super::unit::CompiledTemplate;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Storage for compiled template units.
///
/// Insertion is synchronous because compilation itself is; `fetch` is async
/// because a loader may resolve units from remote or lazy storage. Includes
/// are resolved through `fetch` at render time only, never at compile time.
#[async_trait]
pub trait CodeLoader: Send + Sync {
    /// Stores `unit` under `name`, replacing any previous unit.
    fn insert(&self, name: &str, unit: CompiledTemplate);

    /// Resolves the unit stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if no unit is stored under `name`.
    async fn fetch(&self, name: &str) -> Result<Arc<CompiledTemplate>>;

    /// Returns `true` if a unit is stored under `name`.
    fn contains(&self, name: &str) -> bool;
}

/// Map-backed [`CodeLoader`].
///
/// Shared read-mostly after the compile phase; a `RwLock` keeps inserts safe
/// while renders run concurrently.
#[derive(Default)]
pub struct InMemoryCodeLoader {
    units: RwLock<HashMap<String, Arc<CompiledTemplate>>>,
}

impl InMemoryCodeLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no units are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for InMemoryCodeLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A poisoned lock still holds valid data.
        let units = self.units.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&str> = units.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("InMemoryCodeLoader")
            .field("units", &names)
            .finish()
    }
}

#[async_trait]
impl CodeLoader for InMemoryCodeLoader {
    fn insert(&self, name: &str, unit: CompiledTemplate) {
        tracing::debug!(template = name, ops = unit.ops.len(), "stored compiled template");
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(unit));
    }

    async fn fetch(&self, name: &str) -> Result<Arc<CompiledTemplate>> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| Error::TemplateNotFound {
                name: name.to_string(),
            })
    }

    fn contains(&self, name: &str) -> bool {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

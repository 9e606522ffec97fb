//! Controller instance cache.
//!
//! Every controller type is constructed at most once per process. The cache
//! is filled by the single-threaded route builder and handed over to the
//! published route table afterwards, where it is only read.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Singleton store keyed by controller type.
#[derive(Default)]
pub struct ControllerCache {
    instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl ControllerCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached instance of `C`, constructing it on first access.
    ///
    /// `construct` runs at most once per type; a failed construction leaves
    /// nothing cached, so a later call may try again.
    ///
    /// # Errors
    ///
    /// Propagates the constructor's error.
    pub fn get_or_try_create<C, E>(
        &mut self,
        construct: impl FnOnce() -> Result<C, E>,
    ) -> Result<Arc<C>, E>
    where
        C: Send + Sync + 'static,
    {
        if let Some(existing) = self.get::<C>() {
            return Ok(existing);
        }
        let instance = Arc::new(construct()?);
        self.instances.insert(TypeId::of::<C>(), instance.clone());
        self.names.push(type_name::<C>());
        Ok(instance)
    }

    /// Returns the cached instance of `C`, if any.
    #[must_use]
    pub fn get<C: Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        self.instances
            .get(&TypeId::of::<C>())
            .and_then(|instance| instance.clone().downcast::<C>().ok())
    }

    /// Whether an instance of `C` has been created.
    #[must_use]
    pub fn contains<C: Send + Sync + 'static>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<C>())
    }

    /// Number of cached controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` when nothing has been cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Type names of the cached controllers in creation order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

impl fmt::Debug for ControllerCache {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ControllerCache")
            .field("controllers", &self.names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;

    use super::*;

    #[derive(Debug)]
    struct Catalogue {
        shelves: usize,
    }

    #[derive(Debug)]
    struct Storefront;

    #[test]
    fn constructs_once_per_type() {
        let mut cache = ControllerCache::new();
        let calls = Cell::new(0);
        let build = || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(Catalogue { shelves: 3 })
        };

        let first = cache.get_or_try_create(build).expect("first");
        let second = cache
            .get_or_try_create(|| Ok::<_, Infallible>(Catalogue { shelves: 9 }))
            .expect("second");

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.shelves, 3);
    }

    #[test]
    fn failed_construction_caches_nothing() {
        let mut cache = ControllerCache::new();
        let result = cache.get_or_try_create::<Catalogue, _>(|| Err("database offline"));

        assert_eq!(result.expect_err("construction fails"), "database offline");
        assert!(!cache.contains::<Catalogue>());
        assert!(cache.is_empty());
    }

    #[test]
    fn keeps_types_apart() {
        let mut cache = ControllerCache::new();
        cache
            .get_or_try_create(|| Ok::<_, Infallible>(Catalogue { shelves: 1 }))
            .expect("catalogue");
        cache
            .get_or_try_create(|| Ok::<_, Infallible>(Storefront))
            .expect("storefront");

        assert_eq!(cache.len(), 2);
        assert!(cache.get::<Storefront>().is_some());
        assert_eq!(cache.names().len(), 2);
    }
}

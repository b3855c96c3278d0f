//! Typed request-scoped metadata carried by the ambient [`Context`].
//!
//! Values are keyed by their `TypeId` and stored behind an `Arc`, so cloning
//! a context (once per bound parameter) never copies the values themselves.
//!
//! ```
//! use bindery_core::Extensions;
//!
//! #[derive(Debug, PartialEq)]
//! struct TenantId(u32);
//!
//! let mut ext = Extensions::new();
//! ext.insert(TenantId(7));
//! assert_eq!(ext.get::<TenantId>(), Some(&TenantId(7)));
//! ```
//!
//! [`Context`]: crate::Context

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value of the same type.
    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.map.insert(TypeId::of::<T>(), Arc::new(value));
    }

    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Shared handle to a value, for moving into spawned work.
    #[inline]
    pub fn get_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.clone().downcast::<T>().ok())
    }

    #[inline]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    #[inline]
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> bool {
        self.map.remove(&TypeId::of::<T>()).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("count", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut ext = Extensions::new();
        ext.insert(42i32);
        ext.insert(100i32);
        assert_eq!(ext.get::<i32>(), Some(&100));
        assert_eq!(ext.len(), 1);
    }

    #[test]
    fn test_missing_type() {
        let mut ext = Extensions::new();
        ext.insert("trace-1".to_string());
        assert!(ext.get::<u64>().is_none());
        assert!(ext.contains::<String>());
        assert!(ext.remove::<String>());
        assert!(ext.is_empty());
    }

    #[test]
    fn test_clone_shares_values() {
        let mut ext = Extensions::new();
        ext.insert(vec![1u8, 2, 3]);
        let cloned = ext.clone();
        let a = ext.get_arc::<Vec<u8>>().unwrap();
        let b = cloned.get_arc::<Vec<u8>>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}

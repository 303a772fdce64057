//! Generation-counted caches.
//!
//! A model that owns derived data (e.g. a swaption volatility matrix) bumps
//! its [`Generation`] on every parameter change. Read paths hand the current
//! generation to a [`VersionedCache`], which recomputes only when the stored
//! value was built for an older generation. This replaces ad-hoc "reset to
//! null" invalidation.
//!
//! The cache is `Sync`: many readers (e.g. Monte-Carlo workers) may query it
//! concurrently, while invalidation happens through `&mut` access on the
//! owning model and therefore cannot overlap with readers.

use crate::errors::Result;
use std::sync::RwLock;

/// Monotonic version stamp of a model's parameter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation of a freshly constructed model.
    pub fn initial() -> Self {
        Self(0)
    }

    /// The generation following `self`.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A single-slot cache tagged with the [`Generation`] it was computed for.
pub struct VersionedCache<T> {
    slot: RwLock<Option<(Generation, T)>>,
}

impl<T: Clone> VersionedCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Return the cached value if it was built for `generation`.
    pub fn get(&self, generation: Generation) -> Option<T> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        match &*guard {
            Some((g, value)) if *g == generation => Some(value.clone()),
            _ => None,
        }
    }

    /// Return `true` if the cache holds a value for `generation`.
    pub fn is_current(&self, generation: Generation) -> bool {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        matches!(&*guard, Some((g, _)) if *g == generation)
    }

    /// Return the cached value for `generation`, computing and storing it
    /// with `build` when missing or stale.
    ///
    /// Errors from `build` are propagated and leave the cache untouched.
    pub fn get_or_try_insert_with<F>(&self, generation: Generation, build: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.get(generation) {
            return Ok(value);
        }
        let value = build()?;
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some((generation, value.clone()));
        Ok(value)
    }

    /// Drop any cached value.
    pub fn invalidate(&self) {
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl<T: Clone> Default for VersionedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for VersionedCache<T> {
    fn clone(&self) -> Self {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Self {
            slot: RwLock::new(guard.clone()),
        }
    }
}

impl<T> std::fmt::Debug for VersionedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("VersionedCache")
            .field("generation", &guard.as_ref().map(|(g, _)| g.value()))
            .finish()
    }
}

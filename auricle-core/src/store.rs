//! Revision tracking for store slices and memoization of derived values.
//!
//! Every slice is wrapped in a [`Versioned`] that bumps a revision counter
//! per transition. A [`Memo`] slot caches one derived value keyed by the
//! revision(s) it was computed from, so repeated synchronous reads between
//! dispatches cost nothing and nothing is ever served across a mutation.

/// A store slice together with its transition revision.
#[derive(Debug, Clone, Default)]
pub struct Versioned<S> {
    state: S,
    revision: u64,
}

impl<S> Versioned<S> {
    /// Wrap a slice at revision zero.
    pub const fn new(state: S) -> Self {
        Self { state, revision: 0 }
    }

    /// Read-only access to the slice.
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Current revision; changes exactly once per transition.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Run one transition against the slice and bump the revision.
    pub fn update<R>(&mut self, transition: impl FnOnce(&mut S) -> R) -> R {
        let result = transition(&mut self.state);
        self.revision = self.revision.wrapping_add(1);
        result
    }
}

/// Single-slot cache for a derived value.
///
/// `K` identifies the inputs the value was computed from (one revision, or a
/// tuple of revisions for cross-slice derivations).
#[derive(Debug, Clone, Default)]
pub struct Memo<K, T> {
    slot: Option<(K, T)>,
}

impl<K: PartialEq, T: Clone> Memo<K, T> {
    /// Empty memo.
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Return the cached value when `key` matches the cached key, otherwise
    /// recompute, cache and return.
    pub fn get(&mut self, key: K, compute: impl FnOnce() -> T) -> T {
        if let Some((cached_key, value)) = &self.slot {
            if *cached_key == key {
                return value.clone();
            }
        }
        let value = compute();
        self.slot = Some((key, value.clone()));
        value
    }
}

//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{Graph, Type, TypeId};

impl Graph {
    /// Node lookup for IDs that are known to be in bounds.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds. Callers must only pass edges of a
    /// graph that passed [`Graph::validate`].
    pub fn expect_type(&self, id: TypeId) -> &Type {
        self.get(id).unwrap_or_else(|| {
            panic!(
                "Graph: type {id} not found among {} types \
                 (edges must be validated before traversal)",
                self.len()
            )
        })
    }
}

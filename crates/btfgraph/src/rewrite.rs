//! Node rewriting shared by the graph transforms.

use btfgraph_core::{StringTable, Type, TypeId};

/// Move every name of `ty` from `from` into `to`.
///
/// The node must come from a validated graph over `from`.
pub(crate) fn reintern(ty: &mut Type, from: &StringTable, to: &mut StringTable) {
    for name in ty.names_mut() {
        *name = to.intern(from.resolve(*name).unwrap_or_default());
    }
}

/// Rewrite every edge of `ty` through `map`.
pub(crate) fn remap_edges(ty: &mut Type, map: impl Fn(TypeId) -> TypeId) {
    for edge in ty.edges_mut() {
        *edge = map(*edge);
    }
}

//! Layering split module types on top of a base spec.

use btfgraph_core::{Graph, GraphError, StrOffset, TypeId};
use btfgraph_format::SplitGraph;

use crate::{Result, Spec};

/// Build the spec of a module: the base types followed by the module types.
///
/// Module edges into the base are kept as they are; edges to module types
/// move up to sit above the base. Module names are rebased onto the base
/// string table with the module strings appended.
pub fn compose_module(base: &Spec, split: &SplitGraph) -> Result<Spec> {
    let base_len = base.len();

    let mut strings = base.strings().clone();
    let shift = strings.append(&split.strings);

    let mut graph = Graph::with_strings(strings);
    for ty in base.graph().types().iter().skip(1) {
        graph.push(ty.clone());
    }

    for (i, ty) in split.types.iter().enumerate() {
        let id = TypeId::from_index(base_len + i);
        let mut ty = ty.clone();
        for edge in ty.edges_mut() {
            *edge = match split.local_index(*edge) {
                Some(local) => TypeId::from_index(base_len + local),
                None if edge.index() < base_len => *edge,
                None => return Err(GraphError::DanglingEdge { from: id, to: *edge }.into()),
            };
        }
        for name in ty.names_mut().into_iter().filter(|n| !n.is_empty()) {
            *name = StrOffset(name.0 + shift);
        }
        graph.push(ty);
    }
    graph.validate()?;

    log::debug!(
        "composed module with {} types on a base of {}",
        split.len(),
        base_len
    );
    Ok(Spec::new(graph))
}

//! Transitive closure of a graph from named seeds.

use std::collections::{BTreeSet, HashSet, VecDeque};

use btfgraph_core::{Graph, StringTable, TypeId};

use crate::rewrite::{reintern, remap_edges};
use crate::{Error, MissingTypeNames, Result};

/// The reachable part of a graph, renumbered densely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subset {
    pub graph: Graph,
    /// `remap[old]` is the new ID of a kept type, `None` for dropped ones.
    pub remap: Vec<Option<TypeId>>,
}

impl Subset {
    pub fn new_id(&self, old: TypeId) -> Option<TypeId> {
        self.remap.get(old.index()).copied().flatten()
    }
}

/// Keep every type named in `names` plus everything reachable from them.
///
/// Void is always kept. Kept types stay in their original order and the
/// string table is rebuilt from the names they use.
pub fn filter(
    graph: &Graph,
    names: &BTreeSet<String>,
    missing: MissingTypeNames,
) -> Result<Subset> {
    graph.validate()?;

    let mut found: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<TypeId> = VecDeque::new();
    for (id, _) in graph.iter() {
        if let Some(name) = graph.name_of(id)
            && let Some(name) = names.get(name)
        {
            found.insert(name.as_str());
            queue.push_back(id);
        }
    }

    if missing == MissingTypeNames::Error
        && let Some(name) = names.iter().find(|n| !found.contains(n.as_str()))
    {
        return Err(Error::UnknownTypeName(name.clone()));
    }

    let mut visited = vec![false; graph.len()];
    visited[0] = true;
    while let Some(id) = queue.pop_front() {
        if std::mem::replace(&mut visited[id.index()], true) {
            continue;
        }
        queue.extend(
            graph
                .expect_type(id)
                .edges()
                .into_iter()
                .filter(|e| !visited[e.index()]),
        );
    }

    let mut remap = vec![None; graph.len()];
    let mut next = 0;
    for (old, &keep) in visited.iter().enumerate() {
        if keep {
            remap[old] = Some(TypeId(next));
            next += 1;
        }
    }

    let mut strings = StringTable::new();
    let mut kept = Vec::with_capacity(next as usize);
    for (old, ty) in graph.iter().skip(1) {
        if remap[old.index()].is_none() {
            continue;
        }
        let mut ty = ty.clone();
        remap_edges(&mut ty, |e| remap[e.index()].unwrap_or_default());
        reintern(&mut ty, graph.strings(), &mut strings);
        kept.push(ty);
    }

    let mut out = Graph::with_strings(strings);
    for ty in kept {
        out.push(ty);
    }
    log::debug!(
        "filtered {} types down to {} from {} names",
        graph.len(),
        out.len(),
        names.len()
    );

    Ok(Subset { graph: out, remap })
}

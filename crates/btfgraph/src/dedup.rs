//! Structural deduplication across graphs.
//!
//! All inputs are copied into one arena that shares void and one string
//! table, so names compare by offset. Every arena node then points at a
//! representative through `canon`:
//!
//! 1. Leaf kinds (no edges) merge by exact equality through a hash map.
//! 2. Other kinds are bucketed by shape (the node with its edges blanked) and
//!    merge into the first bucket member they are coinductively equal to.
//! 3. Named forward declarations merge into the one definition with the
//!    same name and flavour, if exactly one exists.
//!
//! Steps 2 and 3 repeat until nothing merges, since a resolved forward
//! declaration can make two composites equal.

use std::collections::{HashMap, HashSet};

use btfgraph_core::{Graph, Kind, StrOffset, StringTable, Type, TypeData, TypeId};

use crate::Result;
use crate::rewrite::{reintern, remap_edges};

/// Output of [`dedup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    pub graph: Graph,
    /// `maps[i][old]` is the output ID of type `old` of input `i`.
    pub maps: Vec<Vec<TypeId>>,
    pub stats: DedupStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub inputs: usize,
    /// Input types, void counted once per input.
    pub input_types: usize,
    /// Output types, void included.
    pub output_types: usize,
    /// Merge rounds until the fixpoint.
    pub rounds: usize,
}

/// Merge structurally identical types of `graphs` into one graph.
pub fn dedup(graphs: &[&Graph]) -> Result<Deduplicated> {
    for graph in graphs {
        graph.validate()?;
    }

    let mut arena = Arena::new(graphs);
    arena.merge_leaves();
    let mut rounds = 0;
    loop {
        rounds += 1;
        let merged = arena.merge_composites() | arena.resolve_fwds();
        if !merged {
            break;
        }
    }

    let (graph, new_ids) = arena.compact();
    let maps = graphs
        .iter()
        .zip(&arena.offsets)
        .map(|(g, &offset)| {
            (0..g.len())
                .map(|k| match k {
                    0 => TypeId::VOID,
                    k => new_ids[arena.find(TypeId::from_index(offset + k - 1)).index()],
                })
                .collect()
        })
        .collect();

    let stats = DedupStats {
        inputs: graphs.len(),
        input_types: graphs.iter().map(|g| g.len()).sum(),
        output_types: graph.len(),
        rounds,
    };
    log::debug!("dedup: {stats:?}");

    Ok(Deduplicated { graph, maps, stats })
}

struct Arena {
    types: Vec<Type>,
    strings: StringTable,
    /// Arena ID of type 1 of each input.
    offsets: Vec<usize>,
    /// Merge target of each node; representatives point at themselves.
    canon: Vec<TypeId>,
}

impl Arena {
    fn new(graphs: &[&Graph]) -> Self {
        let mut types = vec![Type::void()];
        let mut strings = StringTable::new();
        let mut offsets = Vec::with_capacity(graphs.len());

        for graph in graphs {
            let offset = types.len();
            offsets.push(offset);
            for ty in graph.types().iter().skip(1) {
                let mut ty = ty.clone();
                remap_edges(&mut ty, |e| match e.index() {
                    0 => TypeId::VOID,
                    k => TypeId::from_index(offset + k - 1),
                });
                reintern(&mut ty, graph.strings(), &mut strings);
                types.push(ty);
            }
        }

        let canon = (0..types.len()).map(TypeId::from_index).collect();
        Self {
            types,
            strings,
            offsets,
            canon,
        }
    }

    fn find(&self, mut id: TypeId) -> TypeId {
        while self.canon[id.index()] != id {
            id = self.canon[id.index()];
        }
        id
    }

    fn is_rep(&self, id: TypeId) -> bool {
        self.canon[id.index()] == id
    }

    fn ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len()).map(TypeId::from_index)
    }

    fn merge_leaves(&mut self) {
        let mut seen: HashMap<&Type, TypeId> = HashMap::new();
        for (i, ty) in self.types.iter().enumerate() {
            if !ty.kind().is_leaf() {
                continue;
            }
            let id = TypeId::from_index(i);
            self.canon[i] = *seen.entry(ty).or_insert(id);
        }
    }

    fn merge_composites(&mut self) -> bool {
        let mut buckets: HashMap<Type, Vec<TypeId>> = HashMap::new();
        let mut merged = false;

        for id in self.ids() {
            if !self.is_rep(id) || self.types[id.index()].kind().is_leaf() {
                continue;
            }
            let shape = self.types[id.index()].shape();
            let target = buckets.get(&shape).and_then(|reps| {
                reps.iter()
                    .copied()
                    .find(|&rep| self.equiv(rep, id, &mut HashSet::new()))
            });
            match target {
                Some(rep) => {
                    self.canon[id.index()] = rep;
                    merged = true;
                }
                None => buckets.entry(shape).or_default().push(id),
            }
        }
        merged
    }

    /// Coinductive equality: pairs already in `assumed` count as equal.
    ///
    /// Pairs stay assumed once visited, so shared subgraphs are walked once
    /// per call. A single mismatch fails the whole call; callers pass a
    /// fresh set.
    fn equiv(&self, a: TypeId, b: TypeId, assumed: &mut HashSet<(TypeId, TypeId)>) -> bool {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return true;
        }
        if !assumed.insert((a.min(b), a.max(b))) {
            return true;
        }

        let (ta, tb) = (&self.types[a.index()], &self.types[b.index()]);
        if ta.kind() != tb.kind() || ta.name != tb.name || ta.shape() != tb.shape() {
            return false;
        }

        ta.edges()
            .into_iter()
            .zip(tb.edges())
            .all(|(x, y)| self.equiv(x, y, assumed))
    }

    fn resolve_fwds(&mut self) -> bool {
        let mut defs: HashMap<(StrOffset, Kind), Vec<TypeId>> = HashMap::new();
        for id in self.ids() {
            let ty = &self.types[id.index()];
            if self.is_rep(id)
                && !ty.name.is_empty()
                && matches!(ty.data, TypeData::Struct(_) | TypeData::Union(_))
            {
                defs.entry((ty.name, ty.kind())).or_default().push(id);
            }
        }

        let mut merged = false;
        for id in self.ids() {
            let ty = &self.types[id.index()];
            let TypeData::Fwd(flavour) = ty.data else {
                continue;
            };
            if !self.is_rep(id) || ty.name.is_empty() {
                continue;
            }
            if let Some(&[def]) = defs.get(&(ty.name, flavour.kind())).map(Vec::as_slice) {
                self.canon[id.index()] = def;
                merged = true;
            }
        }
        merged
    }

    /// Representatives in arena order with edges rewritten, plus the output
    /// ID of every representative.
    fn compact(&self) -> (Graph, Vec<TypeId>) {
        let mut new_ids = vec![TypeId::VOID; self.types.len()];
        let mut next = 0;
        for id in self.ids().filter(|&id| self.is_rep(id)) {
            new_ids[id.index()] = TypeId(next);
            next += 1;
        }

        let mut strings = StringTable::new();
        let mut kept = Vec::with_capacity(next as usize);
        for id in self.ids().skip(1).filter(|&id| self.is_rep(id)) {
            let mut ty = self.types[id.index()].clone();
            remap_edges(&mut ty, |e| new_ids[self.find(e).index()]);
            reintern(&mut ty, &self.strings, &mut strings);
            kept.push(ty);
        }

        let mut graph = Graph::with_strings(strings);
        for ty in kept {
            graph.push(ty);
        }
        (graph, new_ids)
    }
}

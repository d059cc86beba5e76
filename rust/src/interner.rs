//! Dense integer indexing of task ids.
//!
//! Every pass in the engine works on `Vec`s addressed by node index; strings are
//! only touched when building the graph and when reporting results.

use rustc_hash::FxHashMap;

/// Dense node index (u32 keeps adjacency lists and pair sets compact).
pub type NodeId = u32;

/// Bidirectional mapping between task id strings and node indices.
///
/// Indices are assigned in first-seen order, so node `0` is the first task of
/// the snapshot. Tie-breaking elsewhere relies on this ("stable input order").
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    by_name: FxHashMap<String, NodeId>,
    names: Vec<String>,
}

impl TaskIndex {
    /// Build an index from task ids in snapshot order. Repeated ids keep the
    /// index of their first occurrence.
    pub fn from_ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids = ids.into_iter();
        let mut index = Self {
            by_name: FxHashMap::with_capacity_and_hasher(ids.size_hint().0, Default::default()),
            names: Vec::with_capacity(ids.size_hint().0),
        };
        for id in ids {
            if index.by_name.contains_key(id) {
                continue;
            }
            index.by_name.insert(id.to_string(), index.names.len() as NodeId);
            index.names.push(id.to_string());
        }
        index
    }

    #[inline]
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.by_name.get(id).copied()
    }

    /// Task id for a node. Panics on an index that did not come from this map.
    #[inline]
    pub fn name(&self, node: NodeId) -> &str {
        &self.names[node as usize]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

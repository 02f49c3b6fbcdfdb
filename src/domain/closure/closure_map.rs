use std::collections::{HashMap, HashSet};

use crate::domain::utils::id::JobId;
use crate::domain::workflow::dag::{Dag, NodeKey};

/// Ancestor set of every resolved job.
///
/// Built once by a closure calculator and read-only afterwards. Equality is
/// set equality per job, independent of traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureMap {
    closures: HashMap<NodeKey, HashSet<NodeKey>>,
}

impl ClosureMap {
    pub(crate) fn from_map(closures: HashMap<NodeKey, HashSet<NodeKey>>) -> Self {
        Self { closures }
    }

    /// All jobs that must run before `key`, or `None` if `key` was never resolved.
    pub fn ancestors(&self, key: NodeKey) -> Option<&HashSet<NodeKey>> {
        self.closures.get(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.closures.contains_key(&key)
    }

    /// `true` if `candidate` is a transitive parent of `of`.
    pub fn is_ancestor(&self, candidate: NodeKey, of: NodeKey) -> bool {
        self.closures.get(&of).is_some_and(|set| set.contains(&candidate))
    }

    pub fn len(&self) -> usize {
        self.closures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &HashSet<NodeKey>)> {
        self.closures.iter().map(|(key, set)| (*key, set))
    }

    /// Jobs of `dag` that have no entry, i.e. were never reached from a root.
    ///
    /// Empty for every acyclic graph.
    pub fn unresolved(&self, dag: &Dag) -> Vec<NodeKey> {
        dag.keys().filter(|key| !self.closures.contains_key(key)).collect()
    }

    /// Ancestors of `key` as sorted job ids.
    pub fn ancestor_ids(&self, dag: &Dag, key: NodeKey) -> Option<Vec<JobId>> {
        let set = self.closures.get(&key)?;
        let mut ids: Vec<JobId> = set.iter().filter_map(|k| dag.get(*k)).map(|job| job.id.clone()).collect();
        ids.sort();
        Some(ids)
    }
}

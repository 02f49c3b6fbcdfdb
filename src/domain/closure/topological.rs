use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::closure::closure_map::ClosureMap;
use crate::domain::workflow::dag::{Dag, NodeKey};

/// Computes the same ancestor sets as `compute_closures` in one pass of
/// Kahn's algorithm.
///
/// Every job is visited exactly once, after all of its parents. Jobs on a
/// cycle are never released and stay unresolved instead of looping forever.
pub fn compute_closures_topological(dag: &Dag) -> ClosureMap {
    let mut closures: HashMap<NodeKey, HashSet<NodeKey>> = HashMap::with_capacity(dag.len());
    let mut remaining_parents: HashMap<NodeKey, usize> = dag.iter().map(|(key, job)| (key, job.parents.len())).collect();
    let mut ready: VecDeque<NodeKey> = dag.roots().into_iter().collect();

    while let Some(key) = ready.pop_front() {
        let Some(job) = dag.get(key) else {
            continue;
        };

        let mut ancestors: HashSet<NodeKey> = HashSet::new();
        for parent in &job.parents {
            ancestors.insert(*parent);
            if let Some(parent_ancestors) = closures.get(parent) {
                ancestors.extend(parent_ancestors.iter().copied());
            }
        }
        closures.insert(key, ancestors);

        for child in &job.children {
            if let Some(count) = remaining_parents.get_mut(child) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*child);
                }
            }
        }
    }

    if closures.len() < dag.len() {
        log::warn!("{} jobs of workflow '{}' were never released; the graph is not acyclic.", dag.len() - closures.len(), dag.name);
    } else {
        log::debug!("Resolved ancestors of {} jobs in workflow '{}' in topological order.", closures.len(), dag.name);
    }

    ClosureMap::from_map(closures)
}

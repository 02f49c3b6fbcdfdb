use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::closure::closure_map::ClosureMap;
use crate::domain::workflow::dag::{Dag, NodeKey};

/// Element of the breadth-first work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueEntry {
    Job(NodeKey),
    /// Separates one level of the traversal from the next.
    LevelMarker,
}

/// Computes the ancestor set of every job reachable from a root.
///
/// Level-synchronized breadth-first traversal: a job is only resolved once
/// all of its parents are. A job seen too early (one parent on a longer path
/// than another) is pushed to the front of the next level and retried. Each
/// resolved job appends a level marker followed by its children.
///
/// The graph must be acyclic; on a cycle this does not terminate. Use
/// `Dag::validate_acyclic` first for untrusted input.
pub fn compute_closures(dag: &Dag) -> ClosureMap {
    let mut closures: HashMap<NodeKey, HashSet<NodeKey>> = HashMap::with_capacity(dag.len());
    let mut queue: VecDeque<QueueEntry> = dag.roots().into_iter().map(QueueEntry::Job).collect();
    let mut deferrals: usize = 0;

    while let Some(entry) = queue.pop_front() {
        let key = match entry {
            QueueEntry::LevelMarker => continue,
            QueueEntry::Job(key) => key,
        };

        // Duplicate enqueue from a second parent.
        if closures.contains_key(&key) {
            continue;
        }

        let Some(job) = dag.get(key) else {
            log::warn!("Queued job {:?} is not part of workflow '{}'; skipping.", key, dag.name);
            continue;
        };

        log::debug!("Pre-analysis of job '{}'.", job.id);

        if let Some(pending) = job.parents.iter().find(|parent| !closures.contains_key(*parent)) {
            log::trace!(
                "Job '{}' waits for parent '{}'; deferring to next level.",
                job.id,
                dag.get(*pending).map(|p| p.id.to_string()).unwrap_or_default()
            );
            defer_to_next_level(&mut queue, key);
            deferrals += 1;
            continue;
        }

        let mut ancestors: HashSet<NodeKey> = HashSet::new();
        for parent in &job.parents {
            ancestors.insert(*parent);
            if let Some(parent_ancestors) = closures.get(parent) {
                ancestors.extend(parent_ancestors.iter().copied());
            }
        }
        closures.insert(key, ancestors);

        queue.push_back(QueueEntry::LevelMarker);
        queue.extend(job.children.iter().copied().map(QueueEntry::Job));
    }

    log::debug!("Resolved ancestors of {}/{} jobs in workflow '{}' ({} deferrals).", closures.len(), dag.len(), dag.name, deferrals);

    ClosureMap::from_map(closures)
}

/// Reinserts `key` right after the first level marker still in the queue.
///
/// Without a marker the job goes to the tail; its pending parent will append
/// it again once resolved, so the position only affects duplicate work.
fn defer_to_next_level(queue: &mut VecDeque<QueueEntry>, key: NodeKey) {
    match queue.iter().position(|entry| *entry == QueueEntry::LevelMarker) {
        Some(index) => queue.insert(index + 1, QueueEntry::Job(key)),
        None => queue.push_back(QueueEntry::Job(key)),
    }
}

pub mod closure_map;
pub mod level_marker;
pub mod topological;

pub use closure_map::ClosureMap;
pub use level_marker::compute_closures;
pub use topological::compute_closures_topological;

use crate::domain::workflow::dag::Dag;

/// Which traversal builds the `ClosureMap`. Both return set-equal maps on
/// acyclic graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosureStrategy {
    /// Breadth-first with level markers and deferral.
    #[default]
    LevelMarker,
    /// Kahn's algorithm, linear in the number of edges.
    Topological,
}

pub fn compute_closures_with(dag: &Dag, strategy: ClosureStrategy) -> ClosureMap {
    match strategy {
        ClosureStrategy::LevelMarker => compute_closures(dag),
        ClosureStrategy::Topological => compute_closures_topological(dag),
    }
}

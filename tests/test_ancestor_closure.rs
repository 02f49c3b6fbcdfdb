use std::collections::HashSet;

use cleanup_constraint::domain::closure::{ClosureMap, ClosureStrategy, compute_closures, compute_closures_topological, compute_closures_with};
use cleanup_constraint::domain::workflow::dag::{Dag, NodeKey};
use cleanup_constraint::domain::workflow::job::{Job, JobKind};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a graph of compute jobs from `(parent, child)` pairs.
fn dag_from_edges(jobs: &[&str], edges: &[(&str, &str)]) -> Dag {
    let mut dag = Dag::new("test-wf");
    for id in jobs {
        dag.add_job(Job::new(*id, JobKind::Compute)).unwrap();
    }
    for (parent, child) in edges {
        let p = dag.key_of(parent).unwrap_or_else(|| panic!("unknown job {}", parent));
        let c = dag.key_of(child).unwrap_or_else(|| panic!("unknown job {}", child));
        dag.add_dependency(p, c).unwrap();
    }
    dag
}

/// Random DAG: edges only go from lower to higher index, so it is acyclic.
fn random_dag(seed: u64, size: usize, edge_probability: f64) -> Dag {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dag = Dag::new(format!("random-{}", seed));
    let keys: Vec<NodeKey> = (0..size).map(|i| dag.add_job(Job::new(format!("job-{:03}", i), JobKind::Compute)).unwrap()).collect();

    for child in 1..size {
        for parent in 0..child {
            if rng.random_bool(edge_probability) {
                dag.add_dependency(keys[parent], keys[child]).unwrap();
            }
        }
    }
    dag
}

fn ancestor_names(dag: &Dag, closures: &ClosureMap, id: &str) -> Vec<String> {
    let key = dag.key_of(id).unwrap();
    closures.ancestor_ids(dag, key).unwrap_or_else(|| panic!("no closure entry for {}", id)).into_iter().map(String::from).collect()
}

/// closure(N) == P ∪ closure(p) for every parent p, and N is not its own ancestor.
fn assert_closure_recurrence(dag: &Dag, closures: &ClosureMap) {
    for (key, job) in dag.iter() {
        let actual = closures.ancestors(key).unwrap_or_else(|| panic!("job {} has no closure entry", job.id));

        let mut expected: HashSet<NodeKey> = HashSet::new();
        for parent in &job.parents {
            expected.insert(*parent);
            expected.extend(closures.ancestors(*parent).unwrap().iter().copied());
        }

        assert_eq!(actual, &expected, "closure of {} does not match its parents", job.id);
        assert!(!actual.contains(&key), "job {} is its own ancestor", job.id);
    }
}

#[test]
fn test_linear_chain() {
    let dag = dag_from_edges(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
    let closures = compute_closures(&dag);

    assert_eq!(ancestor_names(&dag, &closures, "D"), vec!["A", "B", "C"]);
    assert_eq!(ancestor_names(&dag, &closures, "C"), vec!["A", "B"]);
    assert!(ancestor_names(&dag, &closures, "A").is_empty());
}

#[test]
fn test_diamond() {
    let dag = dag_from_edges(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
    let closures = compute_closures(&dag);

    assert_eq!(ancestor_names(&dag, &closures, "D"), vec!["A", "B", "C"]);
    assert_eq!(ancestor_names(&dag, &closures, "B"), vec!["A"]);
    assert_eq!(ancestor_names(&dag, &closures, "C"), vec!["A"]);

    let a = dag.key_of("A").unwrap();
    let d = dag.key_of("D").unwrap();
    assert!(closures.is_ancestor(a, d));
    assert!(!closures.is_ancestor(d, a));
}

#[test]
fn test_multiple_roots_and_disconnected_components() {
    let dag = dag_from_edges(
        &["r1", "r2", "x", "y", "lonely"],
        &[("r1", "x"), ("r2", "x"), ("x", "y")],
    );
    let closures = compute_closures(&dag);

    assert_eq!(closures.len(), 5);
    assert_eq!(ancestor_names(&dag, &closures, "y"), vec!["r1", "r2", "x"]);
    assert!(ancestor_names(&dag, &closures, "lonely").is_empty());
    assert!(closures.unresolved(&dag).is_empty());
}

#[test]
fn test_skewed_paths_resolve_after_all_parents() {
    // "join" has one parent a single hop from the root and one six hops away.
    let dag = dag_from_edges(
        &["root", "c1", "c2", "c3", "c4", "c5", "c6", "short", "join", "after"],
        &[
            ("root", "c1"),
            ("c1", "c2"),
            ("c2", "c3"),
            ("c3", "c4"),
            ("c4", "c5"),
            ("c5", "c6"),
            ("c6", "join"),
            ("root", "short"),
            ("short", "join"),
            ("join", "after"),
        ],
    );
    let closures = compute_closures(&dag);

    assert_eq!(ancestor_names(&dag, &closures, "join"), vec!["c1", "c2", "c3", "c4", "c5", "c6", "root", "short"]);
    assert_eq!(ancestor_names(&dag, &closures, "after").len(), 9);
    assert_closure_recurrence(&dag, &closures);
}

#[test]
fn test_recurrence_holds_on_random_dags() {
    for seed in 0..20 {
        let dag = random_dag(seed, 40, 0.1);
        let closures = compute_closures(&dag);

        assert_eq!(closures.len(), dag.len(), "seed {}", seed);
        assert_closure_recurrence(&dag, &closures);
    }
}

#[test]
fn test_strategies_agree() {
    let fixed = dag_from_edges(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
    assert_eq!(compute_closures(&fixed), compute_closures_topological(&fixed));

    for seed in 100..115 {
        let dag = random_dag(seed, 60, 0.08);
        assert_eq!(
            compute_closures_with(&dag, ClosureStrategy::LevelMarker),
            compute_closures_with(&dag, ClosureStrategy::Topological),
            "strategies disagree for seed {}",
            seed
        );
    }
}

#[test]
fn test_repeated_computation_is_set_equal() {
    let dag = random_dag(7, 50, 0.12);

    let first = compute_closures(&dag);
    let second = compute_closures(&dag);

    assert_eq!(first, second);
}

#[test]
fn test_default_strategy_is_level_marker() {
    assert_eq!(ClosureStrategy::default(), ClosureStrategy::LevelMarker);
}

#[test]
fn test_topological_leaves_cycle_unresolved() {
    let dag = dag_from_edges(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "b")]);

    let closures = compute_closures_topological(&dag);

    let unresolved: HashSet<NodeKey> = closures.unresolved(&dag).into_iter().collect();
    let expected: HashSet<NodeKey> = [dag.key_of("b").unwrap(), dag.key_of("c").unwrap()].into_iter().collect();
    assert_eq!(unresolved, expected);
    assert!(closures.contains(dag.key_of("a").unwrap()));
}

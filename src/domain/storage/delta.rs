use std::collections::HashMap;

use crate::domain::storage::file_size_source::FileSizeLookup;
use crate::domain::workflow::dag::{Dag, NodeKey};
use crate::domain::workflow::job::{FileRef, Job, JobKind};
use crate::error::{Error, Result};

/// Net change in intermediate storage, in bytes, caused by running `job`.
///
/// - `Cleanup`: frees its inputs, so the result is negative.
/// - `StageOut`: zero; the files leave the pool and the lookup is not consulted.
/// - every other kind: occupies its outputs.
///
/// Fails if any file size cannot be resolved.
pub fn estimate_delta<L: FileSizeLookup + ?Sized>(job: &Job, lookup: &L) -> Result<i64> {
    match job.kind {
        JobKind::Cleanup => Ok(-total_size(job, &job.input_files, lookup)?),
        JobKind::StageOut => Ok(0),
        _ => total_size(job, &job.output_files, lookup),
    }
}

/// Deltas of every job in `dag`. Stops at the first job that fails.
pub fn estimate_all<L: FileSizeLookup + ?Sized>(dag: &Dag, lookup: &L) -> Result<HashMap<NodeKey, i64>> {
    dag.iter().map(|(key, job)| estimate_delta(job, lookup).map(|delta| (key, delta))).collect()
}

fn total_size<L: FileSizeLookup + ?Sized>(job: &Job, files: &[FileRef], lookup: &L) -> Result<i64> {
    let mut total: i64 = 0;
    for file in files {
        let size = i64::try_from(lookup.size_of(file)?).map_err(|_| Error::SizeOverflow(job.id.to_string()))?;
        total = total.checked_add(size).ok_or_else(|| Error::SizeOverflow(job.id.to_string()))?;
    }
    Ok(total)
}

/// One-line description of a cleanup job for planner logs, e.g.
/// `CleanupJob{parents = {a,b}, children = {c}, files = {f1:100}}`.
pub fn cleanup_summary<L: FileSizeLookup + ?Sized>(dag: &Dag, key: NodeKey, lookup: &L) -> Result<String> {
    let job = dag.get(key).ok_or_else(|| Error::ModelConstructionError(format!("Job {:?} is not part of workflow '{}'.", key, dag.name)))?;

    let parents: Vec<String> = job.parents.iter().filter_map(|k| dag.get(*k)).map(|p| p.id.to_string()).collect();
    let children: Vec<String> = job.children.iter().filter_map(|k| dag.get(*k)).map(|c| c.id.to_string()).collect();

    let mut files = Vec::with_capacity(job.input_files.len());
    for file in &job.input_files {
        files.push(format!("{}:{}", file.lfn, lookup.size_of(file)?));
    }

    Ok(format!("CleanupJob{{parents = {{{}}}, children = {{{}}}, files = {{{}}}}}", parents.join(","), children.join(","), files.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::Lfn;

    /// Lookup backed by a fixed table, ignoring declared sizes.
    struct TableLookup(HashMap<Lfn, u64>);

    impl FileSizeLookup for TableLookup {
        fn size_of(&self, file: &FileRef) -> Result<u64> {
            self.0.get(&file.lfn).copied().ok_or_else(|| Error::UnknownFile(file.lfn.to_string()))
        }
    }

    fn table(entries: &[(&str, u64)]) -> TableLookup {
        TableLookup(entries.iter().map(|(name, size)| (Lfn::new(*name), *size)).collect())
    }

    #[test]
    fn test_stage_out_never_consults_lookup() {
        let job = Job::new("stage_out_1", JobKind::StageOut).with_inputs([FileRef::new("unknown", 1)]).with_outputs([FileRef::new("also_unknown", 1)]);

        assert_eq!(estimate_delta(&job, &table(&[])).unwrap(), 0);
    }

    #[test]
    fn test_cleanup_uses_lookup_not_declared_size() {
        let job = Job::new("clean_1", JobKind::Cleanup).with_inputs([FileRef::new("f1", 1), FileRef::new("f2", 1)]);

        assert_eq!(estimate_delta(&job, &table(&[("f1", 100), ("f2", 50)])).unwrap(), -150);
    }

    #[test]
    fn test_unknown_file_fails_whole_estimate() {
        let job = Job::new("compute_1", JobKind::Compute).with_outputs([FileRef::new("g1", 0), FileRef::new("g2", 0)]);

        let err = estimate_delta(&job, &table(&[("g1", 200)])).unwrap_err();
        assert!(matches!(err, Error::UnknownFile(_)));
    }

    #[test]
    fn test_overflow_is_reported() {
        let job = Job::new("huge", JobKind::Compute).with_outputs([FileRef::new("a", 0), FileRef::new("b", 0)]);

        let err = estimate_delta(&job, &table(&[("a", i64::MAX as u64), ("b", 1)])).unwrap_err();
        assert!(matches!(err, Error::SizeOverflow(ref id) if id == "huge"));
    }
}

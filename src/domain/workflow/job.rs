use std::fmt;

use crate::api::workflow_dto::JobTypeDto;
use crate::domain::utils::id::{JobId, Lfn};
use crate::domain::workflow::dag::NodeKey;

/// What a job does, as far as intermediate storage is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Compute,
    StageIn,
    /// Moves files out of the intermediate pool to permanent storage.
    StageOut,
    InterSiteTransfer,
    CreateDir,
    Registration,
    /// Deletes its input files from the intermediate pool.
    Cleanup,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::Compute => "compute",
            JobKind::StageIn => "stage_in",
            JobKind::StageOut => "stage_out",
            JobKind::InterSiteTransfer => "inter_site_transfer",
            JobKind::CreateDir => "create_dir",
            JobKind::Registration => "registration",
            JobKind::Cleanup => "cleanup",
        };
        write!(f, "{}", name)
    }
}

pub fn map_job_kind(dto_type: JobTypeDto) -> JobKind {
    match dto_type {
        JobTypeDto::Compute => JobKind::Compute,
        JobTypeDto::StageIn => JobKind::StageIn,
        JobTypeDto::StageOut => JobKind::StageOut,
        JobTypeDto::InterSiteTransfer => JobKind::InterSiteTransfer,
        JobTypeDto::CreateDir => JobKind::CreateDir,
        JobTypeDto::Registration => JobKind::Registration,
        JobTypeDto::Cleanup => JobKind::Cleanup,
    }
}

/// A file referenced by a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    pub lfn: Lfn,

    /// Size declared in the workflow description, in bytes.
    pub declared_size: u64,
}

impl FileRef {
    pub fn new(lfn: impl Into<String>, declared_size: u64) -> Self {
        Self { lfn: Lfn::new(lfn), declared_size }
    }
}

/// A node of the workflow graph.
///
/// `parents` and `children` are keys into the owning `Dag`; the `Dag` owns
/// every `Job`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,

    pub parents: Vec<NodeKey>,
    pub children: Vec<NodeKey>,

    /// Unique by LFN.
    pub input_files: Vec<FileRef>,
    /// Unique by LFN.
    pub output_files: Vec<FileRef>,
}

impl Job {
    pub fn new(id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: JobId::new(id),
            kind,
            parents: Vec::new(),
            children: Vec::new(),
            input_files: Vec::new(),
            output_files: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, files: impl IntoIterator<Item = FileRef>) -> Self {
        for file in files {
            push_unique(&mut self.input_files, file);
        }
        self
    }

    pub fn with_outputs(mut self, files: impl IntoIterator<Item = FileRef>) -> Self {
        for file in files {
            push_unique(&mut self.output_files, file);
        }
        self
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Adds `file` unless a file with the same LFN is already present.
///
/// Returns `false` when the file was a duplicate.
pub(crate) fn push_unique(files: &mut Vec<FileRef>, file: FileRef) -> bool {
    if files.iter().any(|f| f.lfn == file.lfn) {
        return false;
    }
    files.push(file);
    true
}

use serde::{Deserialize, Serialize};

/// Root of a workflow description file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDto {
    pub name: String,

    pub jobs: Vec<JobDto>,

    #[serde(default)]
    pub job_dependencies: Vec<JobDependencyDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: String,

    #[serde(rename = "type", default)]
    pub job_type: JobTypeDto,

    #[serde(default)]
    pub uses: Vec<FileUseDto>,
}

/// One file a job reads or writes.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileUseDto {
    pub lfn: String,

    /// Declared size in bytes. Used when no size manifest is loaded.
    pub size: Option<u64>,

    #[serde(rename = "type")]
    pub link_type: LinkTypeDto,
}

/// Parent job and the jobs that must run after it.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobDependencyDto {
    pub id: String,
    pub children: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobTypeDto {
    #[default]
    Compute,
    StageIn,
    StageOut,
    InterSiteTransfer,
    CreateDir,
    Registration,
    Cleanup,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkTypeDto {
    Input,
    Output,
    Checkpoint,
}

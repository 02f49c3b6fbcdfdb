use slotmap::{SlotMap, new_key_type};
use std::collections::{HashMap, VecDeque};

use crate::api::workflow_dto::{JobDto, LinkTypeDto, WorkflowDto};
use crate::domain::utils::id::{JobId, WorkflowId};
use crate::domain::workflow::job::{FileRef, Job, map_job_kind, push_unique};
use crate::error::{Error, Result};

new_key_type! {
    pub struct NodeKey;
}

/// The workflow graph. Owns every `Job`; jobs refer to each other by `NodeKey`.
#[derive(Debug, Clone)]
pub struct Dag {
    pub name: WorkflowId,

    /// Job storage.
    jobs: SlotMap<NodeKey, Job>,

    /// Lookup of the internal key by the job id from the workflow description.
    id_index: HashMap<JobId, NodeKey>,
}

impl Dag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: WorkflowId::new(name), jobs: SlotMap::with_key(), id_index: HashMap::new() }
    }

    /// Adds a job without any edges.
    ///
    /// Parent and child lists of `job` are discarded; use `add_dependency`.
    pub fn add_job(&mut self, mut job: Job) -> Result<NodeKey> {
        if self.id_index.contains_key(&job.id) {
            return Err(Error::ModelConstructionError(format!("Duplicate job id '{}' in workflow '{}'.", job.id, self.name)));
        }

        job.parents.clear();
        job.children.clear();

        let id = job.id.clone();
        let key = self.jobs.insert(job);
        self.id_index.insert(id, key);

        Ok(key)
    }

    /// Adds the edge `parent -> child`. Repeated edges are ignored.
    pub fn add_dependency(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        if parent == child {
            let id = self.jobs.get(parent).map(|j| j.id.to_string()).unwrap_or_default();
            return Err(Error::ModelConstructionError(format!("Job '{}' cannot depend on itself.", id)));
        }
        if !self.jobs.contains_key(parent) || !self.jobs.contains_key(child) {
            return Err(Error::ModelConstructionError("Dependency refers to a job that is not part of the workflow.".to_string()));
        }

        if self.jobs[parent].children.contains(&child) {
            return Ok(());
        }

        self.jobs[parent].children.push(child);
        self.jobs[child].parents.push(parent);

        Ok(())
    }

    pub fn get(&self, key: NodeKey) -> Option<&Job> {
        self.jobs.get(key)
    }

    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.id_index.get(&JobId::new(id)).copied()
    }

    pub fn job_by_id(&self, id: &str) -> Option<&Job> {
        self.key_of(id).and_then(|key| self.jobs.get(key))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Job)> {
        self.jobs.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.jobs.keys()
    }

    /// Jobs without parents, in insertion order.
    pub fn roots(&self) -> Vec<NodeKey> {
        self.jobs.iter().filter(|(_, job)| job.is_root()).map(|(key, _)| key).collect()
    }

    pub fn parents_of(&self, key: NodeKey) -> &[NodeKey] {
        self.jobs.get(key).map(|j| j.parents.as_slice()).unwrap_or(&[])
    }

    pub fn children_of(&self, key: NodeKey) -> &[NodeKey] {
        self.jobs.get(key).map(|j| j.children.as_slice()).unwrap_or(&[])
    }

    /// Returns a topological order of all jobs (Kahn's algorithm).
    ///
    /// Fails with `Error::MalformedGraph` if the graph has a cycle.
    pub fn topological_order(&self) -> Result<Vec<NodeKey>> {
        let mut in_degree: HashMap<NodeKey, usize> = self.jobs.iter().map(|(key, job)| (key, job.parents.len())).collect();
        let mut queue: VecDeque<NodeKey> = self.roots().into_iter().collect();
        let mut order = Vec::with_capacity(self.jobs.len());

        while let Some(key) = queue.pop_front() {
            order.push(key);
            for &child in self.children_of(key) {
                if let Some(degree) = in_degree.get_mut(&child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }

        if order.len() != self.jobs.len() {
            let mut stuck: Vec<String> =
                in_degree.iter().filter(|(_, degree)| **degree > 0).filter_map(|(key, _)| self.jobs.get(*key)).map(|job| job.id.to_string()).collect();
            stuck.sort();
            return Err(Error::MalformedGraph(format!("Workflow '{}' contains a cycle through jobs [{}].", self.name, stuck.join(", "))));
        }

        Ok(order)
    }

    /// Checks that the graph is acyclic.
    ///
    /// The closure calculators assume this; call it before handing them a
    /// graph from an untrusted source.
    pub fn validate_acyclic(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }
}

/// Builds the graph from a workflow description.
impl TryFrom<WorkflowDto> for Dag {
    type Error = Error;

    fn try_from(dto: WorkflowDto) -> Result<Self> {
        let mut dag = Dag::new(dto.name.clone());

        // Phase 1: Create all jobs with their file sets
        for job_dto in &dto.jobs {
            dag.add_job(build_job(job_dto))?;
        }

        // Phase 2: Connect parents and children
        for dependency in &dto.job_dependencies {
            let parent = dag.key_of(&dependency.id).ok_or_else(|| {
                Error::ModelConstructionError(format!("Dependency parent '{}' is not a job of workflow '{}'.", dependency.id, dto.name))
            })?;

            for child_id in &dependency.children {
                let child = dag.key_of(child_id).ok_or_else(|| {
                    Error::ModelConstructionError(format!(
                        "Dependency child '{}' of '{}' is not a job of workflow '{}'.",
                        child_id, dependency.id, dto.name
                    ))
                })?;
                dag.add_dependency(parent, child)?;
            }
        }

        log::debug!("Workflow '{}' built with {} jobs and {} roots.", dag.name, dag.len(), dag.roots().len());

        Ok(dag)
    }
}

impl Dag {
    pub fn from_dto(dto: WorkflowDto) -> Result<Self> {
        Self::try_from(dto)
    }
}

fn build_job(dto: &JobDto) -> Job {
    let mut job = Job::new(dto.id.clone(), map_job_kind(dto.job_type));

    for file_use in &dto.uses {
        let file = FileRef::new(file_use.lfn.clone(), file_use.size.unwrap_or(0));
        let target = match file_use.link_type {
            LinkTypeDto::Input => &mut job.input_files,
            // Checkpoints are written by the job like any other output.
            LinkTypeDto::Output | LinkTypeDto::Checkpoint => &mut job.output_files,
        };

        if !push_unique(target, file) {
            log::warn!("Job '{}' lists file '{}' more than once; keeping the first entry.", dto.id, file_use.lfn);
        }
    }

    job
}

use std::path::Path;

use crate::api::workflow_dto::WorkflowDto;
use crate::domain::workflow::dag::Dag;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Reads a workflow description and builds its job graph.
///
/// The graph is checked for cycles before it is returned, so the closure
/// calculators can be applied to it directly.
pub fn load_workflow(file_path: impl AsRef<Path>) -> Result<Dag> {
    let file_path = file_path.as_ref();

    let dto: WorkflowDto = parse_json_file(file_path)?;
    log::info!("Workflow file '{}' parsed successfully.", file_path.display());

    let dag = Dag::try_from(dto)?;
    dag.validate_acyclic()?;
    log::info!("Workflow '{}' constructed with {} jobs.", dag.name, dag.len());

    Ok(dag)
}

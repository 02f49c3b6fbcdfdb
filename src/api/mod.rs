pub mod size_manifest_dto;
pub mod workflow_dto;

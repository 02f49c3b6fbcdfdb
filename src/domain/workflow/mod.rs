pub mod dag;
pub mod job;

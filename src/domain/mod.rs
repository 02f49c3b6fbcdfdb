pub mod closure;
pub mod storage;
pub mod utils;
pub mod workflow;

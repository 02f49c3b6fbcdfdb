pub mod delta;
pub mod file_size_source;

pub use delta::{cleanup_summary, estimate_all, estimate_delta};
pub use file_size_source::{FileSizeLookup, FileSizeSource, SizeSourceMode};

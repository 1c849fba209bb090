// Public modules
pub mod batch;
pub mod discovery;
pub mod document;
pub mod error;
pub mod file_name;
pub mod input;
pub mod output;
pub mod replace;
pub mod substitution;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{BatchResult, BatchResultItem, FileStatus};

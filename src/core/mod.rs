// Public modules
pub mod anchor;
pub mod context;
pub mod error;
pub mod git;
pub mod github;
pub mod manifest;
pub mod output;
pub mod patch;
pub mod process;
pub mod prompt;
pub mod setup;

// Re-export common types for convenience
pub use anchor::{Anchor, Placement};
pub use error::{Error, ErrorCode, Result};
pub use process::{CommandOutput, Runner};

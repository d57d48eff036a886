//! taskscope core domain types
//!
//! This crate contains pure types with no dependencies on:
//! - Network/HTTP
//! - Filesystem
//! - Runtime specifics
//!
//! It models the queue/index payloads returned by the task service and
//! provides the classifier that turns task names into
//! (platform, suite, chunk) identities.

pub mod classify;
pub mod error;
pub mod ids;
pub mod platform;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use classify::{
    chunk_to_suite, classify, get_chunk, get_platform, get_suite, is_coverage_task,
    name_to_chunk, Classification, TaskIdentity,
};
pub use error::{ClassifyError, CoreError};
pub use ids::TaskId;
pub use platform::{index_namespace, Platform};
pub use status::TaskState;
pub use task::{
    Artifact, ArtifactList, GroupTask, IndexedTask, RunInfo, TaskDescriptor, TaskGroupPage,
    TaskMetadata, TaskStatus,
};

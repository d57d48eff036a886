//! Task state as reported by the queue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a task (or of one of its runs) in the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task exists but its dependencies are not resolved yet.
    #[default]
    Unscheduled,
    /// Task is waiting for a worker.
    Pending,
    /// Task is being executed.
    Running,
    /// Task finished successfully.
    Completed,
    /// Task ran and reported failure.
    Failed,
    /// Task was resolved for an infrastructure reason (deadline, cancel, worker loss).
    Exception,
}

impl TaskState {
    /// Returns true if the task will not change state anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Exception)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

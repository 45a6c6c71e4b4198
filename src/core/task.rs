//! Task records as served by the PNC `/rest/tasks` endpoint

use serde::{Deserialize, Serialize};
use std::fmt;

/// Histogram key used for tasks that arrive without a state
pub const UNKNOWN_STATE: &str = "unknown";

/// One unit of work in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Tasks that run after this one
    #[serde(default)]
    pub dependants: Vec<String>,
    /// Tasks this one waits for (not used for layout)
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Task {
    /// Create a task with no links and the given state tag
    pub fn new(name: impl Into<String>, state: Option<&str>) -> Self {
        Self {
            name: name.into(),
            dependants: Vec::new(),
            dependencies: Vec::new(),
            state: state.map(str::to_string),
        }
    }

    /// Builder-style helper for attaching dependants
    pub fn with_dependants<I, S>(mut self, dependants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependants = dependants.into_iter().map(Into::into).collect();
        self
    }

    /// Parsed lifecycle state
    pub fn state(&self) -> TaskState {
        TaskState::from_tag(self.state.as_deref())
    }
}

/// Lifecycle state tag. Open enumeration: unrecognized tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskState {
    Successful,
    Up,
    Waiting,
    Failed,
    StartFailed,
    StopFailed,
    Other(String),
    Unknown,
}

impl TaskState {
    /// Parse a raw state tag; `None` becomes [`TaskState::Unknown`]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            None => Self::Unknown,
            Some("SUCCESSFUL") => Self::Successful,
            Some("UP") => Self::Up,
            Some("WAITING") => Self::Waiting,
            Some("FAILED") => Self::Failed,
            Some("START_FAILED") => Self::StartFailed,
            Some("STOP_FAILED") => Self::StopFailed,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Key under which this state is counted in the histogram
    pub fn histogram_key(&self) -> &str {
        match self {
            Self::Successful => "SUCCESSFUL",
            Self::Up => "UP",
            Self::Waiting => "WAITING",
            Self::Failed => "FAILED",
            Self::StartFailed => "START_FAILED",
            Self::StopFailed => "STOP_FAILED",
            Self::Other(tag) => tag,
            Self::Unknown => UNKNOWN_STATE,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.histogram_key())
    }
}

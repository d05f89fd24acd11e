use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "In-Progress")]
    InProgress,
    Pending,
    Completed,
}

impl Status {
    /// All statuses in the order their categories are rendered.
    pub fn all() -> &'static [Status] {
        &[Status::InProgress, Status::Pending, Status::Completed]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::InProgress => "In-Progress",
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }

    /// Category heading text used in the rendered status block.
    pub fn heading(self) -> &'static str {
        match self {
            Status::InProgress => "In-Progress Projects",
            Status::Pending => "Pending Projects",
            Status::Completed => "Completed Projects",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "In-Progress" => Ok(Status::InProgress),
            "Pending" => Ok(Status::Pending),
            "Completed" => Ok(Status::Completed),
            other => Err(crate::error::PulseError::InvalidStatus(other.to_string())),
        }
    }
}

//! Task status definitions

use std::fmt;

/// Lifecycle phase of a task, as recorded in its progress file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Agent is working and must keep going
    #[default]
    InProgress,
    /// Agent needs a decision or input from the user
    WaitingForUser,
    /// Task is done
    Completed,
    /// Task is stuck on something external
    Blocked,
    /// Task was given up
    Abandoned,
}

impl Status {
    /// Every status, in the order the progress file lists them
    pub const ALL: [Self; 5] = [
        Self::InProgress,
        Self::WaitingForUser,
        Self::Completed,
        Self::Blocked,
        Self::Abandoned,
    ];

    /// Label used in the progress file
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::WaitingForUser => "Waiting for User",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
            Self::Abandoned => "Abandoned",
        }
    }

    /// Parse an exact progress-file label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == label)
    }

    /// One-line meaning, written into the progress file legend
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InProgress => "still working; keep going, do not stop",
            Self::WaitingForUser => "needs a decision, confirmation or input from the user",
            Self::Completed => "task finished; stop once nothing is left uncommitted",
            Self::Blocked => "blocked by something external (dependency, API, access)",
            Self::Abandoned => "task given up",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

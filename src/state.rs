//! Client-side state machine for one conversion job
//!
//! `Empty -> FileSelected -> Uploading -> Uploaded -> Processing -> Completed`,
//! with `Error` reachable from the selecting, uploading, and processing steps.
//! Reset returns to `Empty` from anywhere.

use std::fmt;

/// Where the current job stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    /// Nothing selected
    #[default]
    Empty,
    /// An image is selected but not yet sent
    FileSelected,
    /// Upload request in flight
    Uploading,
    /// The backend created the project
    Uploaded,
    /// Processing request in flight and/or phase sequence still showing
    Processing,
    /// Result metrics available; downloads offered
    Completed,
    /// The last step failed; see the session's error
    Error,
}

impl JobState {
    /// Whether moving from `self` to `next` follows the job lifecycle.
    /// `Empty` (reset) and `FileSelected` (a fresh selection) are reachable from anywhere.
    pub fn allows(self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (_, Empty) | (_, FileSelected) => true,
            (FileSelected, Uploading) => true,
            (Uploading, Uploaded) => true,
            (Uploaded, Processing) => true,
            (Processing, Completed) => true,
            (FileSelected | Uploading | Processing, Error) => true,
            _ => false,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            JobState::Empty => "No image selected",
            JobState::FileSelected => "Ready to upload",
            JobState::Uploading => "Uploading...",
            JobState::Uploaded => "Uploaded",
            JobState::Processing => "Processing...",
            JobState::Completed => "Completed",
            JobState::Error => "Failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

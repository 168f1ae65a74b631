//! The fixed, cosmetic phase sequence shown while a project is processing
//!
//! The sequence does not track real backend progress. It advances one phase
//! per dwell interval and always runs to the end.

use std::time::Duration;

/// How long each phase label stays on screen
pub const PHASE_DWELL: Duration = Duration::from_millis(1500);

/// Processing phases, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingPhase {
    Analyzing,
    RemovingBackground,
    DepthMap,
    BuildingMesh,
    OptimizingMesh,
    Colorizing,
    Finalizing,
}

impl ProcessingPhase {
    pub const ALL: [ProcessingPhase; 7] = [
        Self::Analyzing,
        Self::RemovingBackground,
        Self::DepthMap,
        Self::BuildingMesh,
        Self::OptimizingMesh,
        Self::Colorizing,
        Self::Finalizing,
    ];

    /// Get a human-readable description of this phase
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyzing => "Analyzing image...",
            Self::RemovingBackground => "Removing background...",
            Self::DepthMap => "Generating depth map...",
            Self::BuildingMesh => "Building 3D mesh...",
            Self::OptimizingMesh => "Optimizing mesh...",
            Self::Colorizing => "Applying colors...",
            Self::Finalizing => "Finalizing model...",
        }
    }
}

/// Shortest dwell accepted; a zero dwell would make phases pass unseen
pub const MIN_PHASE_DWELL: Duration = Duration::from_millis(1);

/// Advances through [`ProcessingPhase::ALL`] by elapsed time. Fed explicit
/// deltas, so a test can drive it without a real clock.
///
/// Moves at most one phase per [`PhaseSequencer::advance`] call, so a slow
/// caller still sees every label in order. The part of a delta that overruns
/// the current dwell carries into the next phase, less any whole dwells.
#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    dwell: Duration,
    index: usize,
    /// Time spent in the current phase
    in_phase: Duration,
    finished: bool,
}

impl PhaseSequencer {
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell: dwell.max(MIN_PHASE_DWELL),
            index: 0,
            in_phase: Duration::ZERO,
            finished: false,
        }
    }

    /// Add elapsed time. Returns the phase just entered, if any.
    pub fn advance(&mut self, delta: Duration) -> Option<ProcessingPhase> {
        if self.finished {
            return None;
        }
        self.in_phase = self.in_phase.saturating_add(delta);
        if self.in_phase < self.dwell {
            return None;
        }

        if self.index + 1 == ProcessingPhase::ALL.len() {
            self.finished = true;
            self.in_phase = self.dwell;
            return None;
        }
        self.index += 1;
        let carry = (self.in_phase - self.dwell).as_nanos() % self.dwell.as_nanos();
        self.in_phase = Duration::from_nanos(carry as u64);
        Some(ProcessingPhase::ALL[self.index])
    }

    /// The phase on screen. Stays on the last phase once the sequence is over.
    pub fn current(&self) -> ProcessingPhase {
        ProcessingPhase::ALL[self.index]
    }

    /// Every phase has been shown for its dwell time
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fraction of the sequence shown (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        let shown = self.dwell * self.index as u32 + self.in_phase.min(self.dwell);
        (shown.as_secs_f32() / self.total_duration().as_secs_f32()).min(1.0)
    }

    /// Time the whole sequence takes when polled in steps no longer than the dwell
    pub fn total_duration(&self) -> Duration {
        self.dwell * ProcessingPhase::ALL.len() as u32
    }
}

impl Default for PhaseSequencer {
    fn default() -> Self {
        Self::new(PHASE_DWELL)
    }
}

//! Runtime statistics and work-loop status

use std::time::Duration;

use sprig_fiber::CommitReport;

/// Outcome of one work-loop slice
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing to do
    Idle,
    /// Budget ran out with fibers left; call again later
    Yielded,
    /// The cycle finished and its tree is now current
    Committed(CommitReport),
}

impl WorkStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, WorkStatus::Yielded)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub cycles_started: u64,
    pub cycles_committed: u64,
    pub cycles_abandoned: u64,
    pub units_processed: u64,
    pub slices: u64,
    pub yields: u64,
    pub last_commit: Option<CommitReport>,
    pub last_commit_duration: Duration,
}

use std::fmt;
use std::time::Duration;

/// Counters as seen at one progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub dispatched: usize,
    pub alive: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {}/{}/{}. Time elapsed: {:?}",
            self.dispatched, self.alive, self.total, self.elapsed
        )
    }
}

/// Receives a snapshot after every result the aggregator consumes.
pub trait ProgressObserver {
    fn update(&mut self, snapshot: &ProgressSnapshot);

    fn finish(&mut self, _snapshot: &ProgressSnapshot) {}
}

/// Discards progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn update(&mut self, _snapshot: &ProgressSnapshot) {}
}

impl ProgressObserver for Vec<ProgressSnapshot> {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.push(*snapshot);
    }
}

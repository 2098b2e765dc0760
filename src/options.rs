use std::time::Duration;

/// Tuning knobs for a sweep. The defaults keep the reference pacing: one
/// launch every 50 ms and a 3 s pause after resource exhaustion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Maximum number of lookups in flight at once.
    pub concurrency: usize,
    /// Minimum delay between two launches. Zero disables pacing.
    pub launch_interval: Duration,
    /// Pause applied to dispatch (and to the retrying task) after exhaustion.
    pub cooldown: Duration,
    /// Upper bound for a single MX lookup; expiry counts as dead.
    pub lookup_timeout: Duration,
    /// Extra lookups allowed for an address that hit resource exhaustion.
    pub max_retries: u32,
    /// Pending throttle signals kept before new ones are coalesced.
    pub throttle_capacity: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            concurrency: 256,
            launch_interval: Duration::from_millis(50),
            cooldown: Duration::from_secs(3),
            lookup_timeout: Duration::from_secs(5),
            max_retries: 2,
            throttle_capacity: 64,
        }
    }
}

impl CheckOptions {
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn pacing(&self) -> Option<Duration> {
        if self.launch_interval.is_zero() {
            None
        } else {
            Some(self.launch_interval)
        }
    }
}

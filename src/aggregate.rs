//! Fan-in of classified results.
//!
//! The [`Aggregator`] is the single owner of the run counters, of the result
//! sink and of the progress observer. Other tasks only ever talk to it through
//! the result channel.

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::mx::{Liveness, Outcome};
use crate::progress::{ProgressObserver, ProgressSnapshot};
use crate::sink::ResultSink;

/// Running totals for one sweep. `alive <= dispatched <= total` holds after
/// every [`RunCounters::record`].
#[derive(Debug, Clone)]
pub struct RunCounters {
    /// Results received so far, one per launched lookup.
    pub dispatched: usize,
    pub alive: usize,
    pub dead: usize,
    /// Addresses still exhausted after their last retry.
    pub unresolved: usize,
    pub total: usize,
    pub write_errors: usize,
    /// Lookups that failed on local resource exhaustion, retries included.
    pub exhaustion_events: u64,
    pub started: Instant,
}

impl RunCounters {
    pub fn new(total: usize) -> Self {
        Self {
            dispatched: 0,
            alive: 0,
            dead: 0,
            unresolved: 0,
            total,
            write_errors: 0,
            exhaustion_events: 0,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        self.dispatched += 1;
        let attempts = u64::from(outcome.attempts.max(1));
        match outcome.liveness {
            Liveness::Alive => {
                self.alive += 1;
                self.exhaustion_events += attempts - 1;
            }
            Liveness::Dead => {
                self.dead += 1;
                self.exhaustion_events += attempts - 1;
            }
            Liveness::ResourceExhausted => {
                self.unresolved += 1;
                self.exhaustion_events += attempts;
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.dispatched >= self.total
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            dispatched: self.dispatched,
            alive: self.alive,
            total: self.total,
            elapsed: self.started.elapsed(),
        }
    }
}

/// What is left once the aggregator has drained the result channel.
pub struct Aggregated<S, P> {
    pub counters: RunCounters,
    pub sink: S,
    pub progress: P,
}

pub struct Aggregator<S, P> {
    counters: RunCounters,
    sink: S,
    progress: P,
}

impl<S, P> Aggregator<S, P>
where
    S: ResultSink,
    P: ProgressObserver,
{
    pub fn new(total: usize, sink: S, progress: P) -> Self {
        Self {
            counters: RunCounters::new(total),
            sink,
            progress,
        }
    }

    /// Accounts for one result: counters first, then persistence of alive
    /// addresses, then a progress update. Write failures are logged and
    /// counted, never fatal.
    pub fn consume(&mut self, outcome: Outcome) {
        self.counters.record(&outcome);

        if outcome.is_alive() {
            if let Err(err) = self.sink.append(&outcome.address) {
                self.counters.write_errors += 1;
                tracing::warn!(error = %err, "could not persist alive address");
            }
        }

        self.progress.update(&self.counters.snapshot());
    }

    /// Consumes results until one has arrived for every address or every
    /// producer has gone away, whichever comes first.
    pub async fn run(mut self, mut results: mpsc::Receiver<Outcome>) -> Aggregated<S, P> {
        while !self.counters.is_complete() {
            match results.recv().await {
                Some(outcome) => self.consume(outcome),
                None => break,
            }
        }
        self.finish()
    }

    fn finish(mut self) -> Aggregated<S, P> {
        if let Err(err) = self.sink.flush() {
            self.counters.write_errors += 1;
            tracing::error!(error = %err, "could not flush result sink");
        }
        self.progress.finish(&self.counters.snapshot());
        Aggregated {
            counters: self.counters,
            sink: self.sink,
            progress: self.progress,
        }
    }
}

//! Fan-out of lookups.
//!
//! The [`Dispatcher`] walks the address list in input order and spawns one
//! task per address. Launches are gated three ways: a semaphore bounds the
//! number of lookups in flight, an interval keeps a minimum delay between
//! launches, and a throttle signal from any task pauses dispatch for one
//! cooldown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::mx::{LookupMx, MxChecker, Outcome};
use crate::options::CheckOptions;
use crate::throttle::{self, ThrottleReceiver};

/// What the dispatcher did, available once it has launched its last lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub launched: usize,
    /// Number of cooldowns applied in response to throttle signals.
    pub cooldowns: usize,
    pub cancelled: bool,
}

/// A running dispatch: its results plus a handle yielding the report.
pub struct Dispatch {
    pub results: mpsc::Receiver<Outcome>,
    pub handle: JoinHandle<DispatchReport>,
}

pub struct Dispatcher<R: ?Sized> {
    checker: Arc<MxChecker<R>>,
    throttle: ThrottleReceiver,
    permits: Arc<Semaphore>,
    pacing: Option<Duration>,
    cooldown: Duration,
    result_capacity: usize,
    shutdown: watch::Receiver<bool>,
}

impl<R> Dispatcher<R>
where
    R: LookupMx + ?Sized + 'static,
{
    pub fn new(resolver: Arc<R>, options: &CheckOptions, shutdown: watch::Receiver<bool>) -> Self {
        let (throttle_tx, throttle_rx) = throttle::channel(options.throttle_capacity);
        Self {
            checker: Arc::new(MxChecker::new(resolver, throttle_tx, options)),
            throttle: throttle_rx,
            permits: Arc::new(Semaphore::new(options.concurrency())),
            pacing: options.pacing(),
            cooldown: options.cooldown,
            result_capacity: options.concurrency(),
            shutdown,
        }
    }

    /// Starts dispatching `addresses` on a background task. The result
    /// channel closes once the last launched lookup has reported.
    pub fn dispatch(self, addresses: Vec<String>) -> Dispatch {
        let (tx, rx) = mpsc::channel(self.result_capacity);
        let handle = tokio::spawn(self.run(addresses, tx));
        Dispatch {
            results: rx,
            handle,
        }
    }

    async fn run(mut self, addresses: Vec<String>, results: mpsc::Sender<Outcome>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut pacer = self.pacing.map(pacer);

        for address in addresses {
            let permit = match until_shutdown(
                &mut self.shutdown,
                Arc::clone(&self.permits).acquire_owned(),
            )
            .await
            {
                Some(Ok(permit)) => permit,
                Some(Err(err)) => {
                    tracing::error!(error = %err, "lookup permits closed, stopping dispatch");
                    break;
                }
                None => {
                    report.cancelled = true;
                    break;
                }
            };

            // paced after the permit so a long wait for capacity never lets
            // two launches through back to back
            if let Some(pacer) = pacer.as_mut() {
                if until_shutdown(&mut self.shutdown, pacer.tick()).await.is_none() {
                    report.cancelled = true;
                    break;
                }
            }

            if self.throttle.drain() > 0 {
                // any signal raised while paused, retries included, means
                // descriptors are still short: pause again
                loop {
                    report.cooldowns += 1;
                    tracing::warn!(cooldown = ?self.cooldown, "Throttling triggered.");
                    let paused = tokio::time::sleep(self.cooldown);
                    if until_shutdown(&mut self.shutdown, paused).await.is_none() {
                        report.cancelled = true;
                        break;
                    }
                    if self.throttle.drain() == 0 {
                        break;
                    }
                }
                if report.cancelled {
                    break;
                }
                if let Some(pacer) = pacer.as_mut() {
                    pacer.reset();
                }
            }

            let checker = Arc::clone(&self.checker);
            let results = results.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let outcome = checker.check(address).await;
                if results.send(outcome).await.is_err() {
                    tracing::debug!("result receiver gone, outcome discarded");
                }
            });
            report.launched += 1;
        }

        if report.cancelled {
            tracing::info!(launched = report.launched, "dispatch interrupted");
        }
        report
    }
}

fn pacer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Runs `fut` unless shutdown is requested first, in which case `None`.
async fn until_shutdown<F: Future>(shutdown: &mut watch::Receiver<bool>, fut: F) -> Option<F::Output> {
    if *shutdown.borrow_and_update() {
        return None;
    }
    tokio::select! {
        biased;
        _ = shutdown_requested(shutdown) => None,
        out = fut => Some(out),
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if shutdown.changed().await.is_err() {
            // nobody can request shutdown any more
            std::future::pending::<()>().await;
        }
        if *shutdown.borrow_and_update() {
            return;
        }
    }
}

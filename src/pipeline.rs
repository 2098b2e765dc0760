use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::aggregate::{Aggregated, Aggregator};
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::mx::LookupMx;
use crate::options::CheckOptions;
use crate::progress::ProgressObserver;
use crate::sink::ResultSink;

/// Final accounting of a sweep.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Results received, one per launched lookup.
    pub dispatched: usize,
    pub alive: usize,
    pub dead: usize,
    /// Addresses whose lookups kept failing on local resource exhaustion.
    pub unresolved: usize,
    /// Addresses never launched because the run was interrupted.
    pub skipped: usize,
    pub write_errors: usize,
    pub exhaustion_events: u64,
    pub cooldowns: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checked {}/{} in {:?}: {} alive, {} dead, {} unresolved",
            self.dispatched, self.total, self.elapsed, self.alive, self.dead, self.unresolved
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if self.cooldowns > 0 {
            write!(
                f,
                " ({} exhaustion events, {} cooldowns)",
                self.exhaustion_events, self.cooldowns
            )?;
        }
        if self.write_errors > 0 {
            write!(f, " [{} write errors]", self.write_errors)?;
        }
        if self.cancelled {
            f.write_str(" [interrupted]")?;
        }
        Ok(())
    }
}

/// Everything a sweep hands back: its summary plus ownership of the sink and
/// progress observer it was given.
pub struct Sweep<S, P> {
    pub summary: RunSummary,
    pub sink: S,
    pub progress: P,
}

/// Checks every address in `addresses` against `resolver`, persisting the
/// alive ones to `sink`.
///
/// Flipping `shutdown` to `true` stops new launches; lookups already running
/// are still collected and the sink is flushed before returning.
pub async fn check_addresses<R, S, P>(
    addresses: Vec<String>,
    resolver: Arc<R>,
    sink: S,
    progress: P,
    options: &CheckOptions,
    shutdown: watch::Receiver<bool>,
) -> Sweep<S, P>
where
    R: LookupMx + ?Sized + 'static,
    S: ResultSink,
    P: ProgressObserver,
{
    let total = addresses.len();
    tracing::info!(
        total,
        concurrency = options.concurrency(),
        interval = ?options.launch_interval,
        "starting MX sweep"
    );

    let dispatch = Dispatcher::new(resolver, options, shutdown).dispatch(addresses);
    let Aggregated {
        counters,
        sink,
        progress,
    } = Aggregator::new(total, sink, progress)
        .run(dispatch.results)
        .await;

    let report = match dispatch.handle.await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "dispatcher task failed");
            DispatchReport {
                launched: counters.dispatched,
                cancelled: true,
                ..DispatchReport::default()
            }
        }
    };

    let summary = RunSummary {
        total,
        dispatched: counters.dispatched,
        alive: counters.alive,
        dead: counters.dead,
        unresolved: counters.unresolved,
        skipped: total.saturating_sub(report.launched),
        write_errors: counters.write_errors,
        exhaustion_events: counters.exhaustion_events,
        cooldowns: report.cooldowns,
        elapsed: counters.started.elapsed(),
        cancelled: report.cancelled,
    };
    tracing::info!(%summary, "MX sweep finished");

    Sweep {
        summary,
        sink,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::tests::{StubResolver, exhausted_error};
    use crate::mx::{MxError, MxRecord};
    use crate::progress::ProgressSnapshot;

    fn options() -> CheckOptions {
        CheckOptions {
            max_retries: 0,
            ..CheckOptions::default()
        }
    }

    fn scenario_resolver() -> StubResolver {
        StubResolver::new(|domain| match domain {
            "good.com" => Ok(vec![MxRecord::new(10, "mx.good.com")]),
            "empty.com" => Ok(Vec::new()),
            other => panic!("unexpected lookup for {other}"),
        })
    }

    fn input(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn good_empty_and_malformed_addresses() {
        let (_tx, shutdown) = watch::channel(false);
        let sweep = check_addresses(
            input(&["a@good.com", "b@empty.com", "c@bad"]),
            Arc::new(scenario_resolver()),
            Vec::<String>::new(),
            Vec::<ProgressSnapshot>::new(),
            &options(),
            shutdown,
        )
        .await;

        assert_eq!(sweep.sink, ["a@good.com"]);
        assert_eq!(sweep.summary.total, 3);
        assert_eq!(sweep.summary.dispatched, 3);
        assert_eq!(sweep.summary.alive, 1);
        assert_eq!(sweep.summary.dead, 2);
        assert_eq!(sweep.summary.skipped, 0);
        assert!(!sweep.summary.cancelled);

        assert_eq!(sweep.progress.len(), 3);
        for snapshot in &sweep.progress {
            assert!(snapshot.alive <= snapshot.dispatched);
            assert!(snapshot.dispatched <= snapshot.total);
        }
        let last = sweep.progress.last().unwrap();
        assert_eq!((last.dispatched, last.alive, last.total), (3, 1, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_through_files() {
        let dir = std::env::temp_dir();
        let input_path = dir.join(format!("mxsweep-{}-e2e-input.txt", std::process::id()));
        let output_path = dir.join(format!("mxsweep-{}-e2e-output.txt", std::process::id()));
        std::fs::write(&input_path, "a@good.com\nb@empty.com\nc@bad\n").unwrap();
        let _ = std::fs::remove_file(&output_path);

        let addresses = crate::source::read_addresses_from_path(&input_path).unwrap();
        let sink = crate::sink::FileSink::open(&output_path).unwrap();
        let (_tx, shutdown) = watch::channel(false);
        let sweep = check_addresses(
            addresses,
            Arc::new(scenario_resolver()),
            sink,
            crate::progress::NoProgress,
            &options(),
            shutdown,
        )
        .await;
        drop(sweep.sink);

        assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "a@good.com\n");
        assert_eq!(sweep.summary.dispatched, 3);
        assert_eq!(sweep.summary.alive, 1);

        std::fs::remove_file(&input_path).unwrap();
        std::fs::remove_file(&output_path).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn alive_address_is_written_once_per_occurrence() {
        let (_tx, shutdown) = watch::channel(false);
        let sweep = check_addresses(
            input(&["a@good.com", "a@good.com"]),
            Arc::new(scenario_resolver()),
            Vec::<String>::new(),
            crate::progress::NoProgress,
            &options(),
            shutdown,
        )
        .await;

        // no dedup: the list said it twice, the sink says it twice
        assert_eq!(sweep.sink, ["a@good.com", "a@good.com"]);
    }

    #[tokio::test]
    async fn empty_input_completes_immediately() {
        let (_tx, shutdown) = watch::channel(false);
        let sweep = check_addresses(
            Vec::new(),
            Arc::new(scenario_resolver()),
            Vec::<String>::new(),
            crate::progress::NoProgress,
            &options(),
            shutdown,
        )
        .await;
        assert_eq!(sweep.summary.total, 0);
        assert_eq!(sweep.summary.dispatched, 0);
        assert!(sweep.sink.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_addresses_are_not_persisted_nor_dead() {
        let stub = StubResolver::new(|domain| match domain {
            "busy.com" => Err(MxError::lookup(exhausted_error())),
            _ => Ok(vec![MxRecord::new(10, "mx.good.com")]),
        });
        let (_tx, shutdown) = watch::channel(false);
        let sweep = check_addresses(
            input(&["x@busy.com", "a@good.com"]),
            Arc::new(stub),
            Vec::<String>::new(),
            crate::progress::NoProgress,
            &options(),
            shutdown,
        )
        .await;

        assert_eq!(sweep.sink, ["a@good.com"]);
        assert_eq!(sweep.summary.unresolved, 1);
        assert_eq!(sweep.summary.dead, 0);
        assert_eq!(sweep.summary.exhaustion_events, 1);
        assert_eq!(sweep.summary.cooldowns, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupted_run_reports_skipped_addresses() {
        let (tx, shutdown) = watch::channel(false);
        tx.send(true).unwrap();
        let sweep = check_addresses(
            input(&["a@good.com", "b@empty.com"]),
            Arc::new(scenario_resolver()),
            Vec::<String>::new(),
            crate::progress::NoProgress,
            &options(),
            shutdown,
        )
        .await;

        assert!(sweep.summary.cancelled);
        assert_eq!(sweep.summary.dispatched, 0);
        assert_eq!(sweep.summary.skipped, 2);
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn summary_serializes_its_counters() {
        let summary = RunSummary {
            total: 2,
            dispatched: 2,
            alive: 1,
            dead: 0,
            unresolved: 1,
            skipped: 0,
            write_errors: 0,
            exhaustion_events: 2,
            cooldowns: 2,
            elapsed: Duration::from_secs(1),
            cancelled: false,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["alive"], 1);
        assert_eq!(json["unresolved"], 1);
        assert_eq!(json["exhaustion_events"], 2);
        assert_eq!(json["cooldowns"], 2);
        assert_eq!(json["cancelled"], false);
    }

    #[test]
    fn summary_display() {
        let summary = RunSummary {
            total: 4,
            dispatched: 3,
            alive: 1,
            dead: 1,
            unresolved: 1,
            skipped: 1,
            write_errors: 0,
            exhaustion_events: 3,
            cooldowns: 2,
            elapsed: Duration::from_secs(7),
            cancelled: true,
        };
        insta::assert_snapshot!(
            summary.to_string(),
            @"checked 3/4 in 7s: 1 alive, 1 dead, 1 unresolved, 1 skipped (3 exhaustion events, 2 cooldowns) [interrupted]"
        );
    }
}

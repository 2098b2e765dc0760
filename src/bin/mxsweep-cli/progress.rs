use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use mxsweep::{ProgressObserver, ProgressSnapshot};

/// Spinner carrying the overwritten status line. Hidden with `--quiet`.
pub fn status_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl ProgressObserver for BarProgress {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_message(snapshot.to_string());
    }

    fn finish(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.finish_with_message(snapshot.to_string());
    }
}

//! Stdout sink and progress spinner for discovery runs.

use std::io::{self, Write};
use std::time::Duration;

use discovery_core::{DiscoverySink, PageProgress, WorkKey};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Decides whether to draw a spinner on stderr.
pub(crate) fn should_use_spinner(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Returns true when `TERM=dumb`.
pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term == "dumb")
}

/// Writes each discovered key to stdout as `kind:id`.
pub(crate) struct StdoutSink {
    spinner: Option<ProgressBar>,
    written: usize,
    broken: bool,
}

impl StdoutSink {
    pub(crate) fn new(use_spinner: bool) -> Self {
        let spinner = use_spinner.then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_message("Fetching first page...");
            spinner
        });
        Self {
            spinner,
            written: 0,
            broken: false,
        }
    }

    /// Number of keys written so far.
    pub(crate) fn written(&self) -> usize {
        self.written
    }

    /// Clears the spinner.
    pub(crate) fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }

    fn write_batch(&mut self, batch: &[WorkKey]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        for key in batch {
            writeln!(out, "{key}")?;
        }
        out.flush()
    }
}

impl DiscoverySink for StdoutSink {
    fn accept_batch(&mut self, batch: &[WorkKey]) {
        if batch.is_empty() || self.broken {
            return;
        }
        let result = match self.spinner.clone() {
            Some(spinner) => spinner.suspend(|| self.write_batch(batch)),
            None => self.write_batch(batch),
        };
        match result {
            Ok(()) => self.written += batch.len(),
            Err(error) => {
                // Downstream consumer went away; keep discovering for the report.
                debug!(error = %error, "stdout closed, dropping further output");
                self.broken = true;
            }
        }
    }

    fn page_progress(&mut self, progress: &PageProgress) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!(
                "Page {}: {} new ({} seen, {} filtered, {} known) - {} total",
                progress.page,
                progress.accepted,
                progress.raw,
                progress.filtered_out,
                progress.deduped_out,
                self.written
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_only_on_interactive_terminal() {
        assert!(should_use_spinner(true, false, false));
        assert!(!should_use_spinner(false, false, false));
        assert!(!should_use_spinner(true, true, false));
        assert!(!should_use_spinner(true, false, true));
    }

    #[test]
    fn test_sink_without_spinner_counts_written() {
        let mut sink = StdoutSink::new(false);
        sink.accept_batch(&[]);
        assert_eq!(sink.written(), 0);
        sink.finish();
    }
}

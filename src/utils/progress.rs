//! Progress indicators for long running export steps.
//!
//! Progress is hidden when disabled via `--no-progress` or when stderr is
//! not a terminal, so CI logs only contain the tracing output.

use indicatif::{ProgressBar as IndicatifBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

/// Progress bar over the combinations of one export step.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a bar for `len` combinations, hidden if `enabled` is false.
    #[must_use]
    pub fn new(len: u64, enabled: bool) -> Self {
        let inner = if enabled && std::io::stderr().is_terminal() {
            let bar = IndicatifBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
            bar.set_style(default_style());
            bar
        } else {
            IndicatifBar::hidden()
        };
        Self {
            inner,
        }
    }

    /// Set the message next to the bar.
    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.set_message(message.into());
    }

    /// Advance the bar by one combination.
    pub fn inc(&self) {
        self.inner.inc(1);
    }

    /// Finish and clear the bar.
    pub fn finish(&self) {
        self.inner.finish_and_clear();
    }
}

fn default_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

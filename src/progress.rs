//! Progress reporting utilities using indicatif.
//!
//! [`Progress`] implements [`ProgressCallback`] with a single bar over the
//! pending cases; the bar message shows the current case and step.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for the packaging pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called once before the first case, with the number of pending cases.
    fn on_start(&self, total: usize);

    /// Called when a case starts.
    ///
    /// * `current` - Case number (1-based)
    /// * `case` - Case folder name
    fn on_case_start(&self, current: usize, case: &str);

    /// Called when a case moves to a new step ("copying", "archiving", ...).
    fn on_step(&self, _case: &str, _step: &str) {}

    /// Called when a case has been archived, with the archive size.
    fn on_case_done(&self, _case: &str, _archive_size: u64) {}

    /// Called after the last case (or on interruption).
    fn on_finish(&self);
}

/// Progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter. With `quiet` nothing is drawn.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref pb) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_start(&self, total: usize) {
        if self.quiet || total == 0 {
            return;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::style());
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_case_start(&self, current: usize, case: &str) {
        self.with_bar(|pb| {
            pb.set_position(current.saturating_sub(1) as u64);
            pb.set_message(case.to_string());
        });
    }

    fn on_step(&self, case: &str, step: &str) {
        self.with_bar(|pb| pb.set_message(format!("{case}: {step}")));
    }

    fn on_case_done(&self, _case: &str, _archive_size: u64) {
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_with_message("Packaging complete");
            }
        }
    }
}

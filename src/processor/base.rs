use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress tracking for long-running scans
pub struct StandardProgressTracker {
    start_time: Option<Instant>,
    last_report: Option<Instant>,
    report_interval_ms: u64,
}

impl Default for StandardProgressTracker {
    fn default() -> Self {
        Self {
            start_time: None,
            last_report: None,
            report_interval_ms: 5_000, // Explorer scans are slow; report every 5s
        }
    }
}

impl StandardProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        let now = Instant::now();
        self.start_time = Some(now);
        self.last_report = Some(now);
    }

    pub fn should_report(&mut self) -> bool {
        let now = Instant::now();
        match self.last_report {
            Some(last) => {
                if now.duration_since(last).as_millis() > self.report_interval_ms as u128 {
                    self.last_report = Some(now);
                    true
                } else {
                    false
                }
            }
            None => {
                self.last_report = Some(now);
                true
            }
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        match self.start_time {
            Some(start) => start.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }
}

/// Format elapsed seconds into human-readable time
pub fn format_elapsed_time(elapsed_secs: f64) -> String {
    if elapsed_secs < 60.0 {
        format!("{:.1}s", elapsed_secs)
    } else if elapsed_secs < 3600.0 {
        let minutes = (elapsed_secs / 60.0).floor();
        let seconds = elapsed_secs % 60.0;
        format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
    } else {
        let hours = (elapsed_secs / 3600.0).floor();
        let remaining = elapsed_secs % 3600.0;
        let minutes = (remaining / 60.0).floor();
        let seconds = remaining % 60.0;
        format!(
            "{}h {}m {:.0}s ({:.1}s)",
            hours, minutes, seconds, elapsed_secs
        )
    }
}

/// External cancellation for a running scan
///
/// Clones share the same stop flag, so a clone handed to a signal handler can
/// stop a scan running elsewhere. Checked at every block/page boundary.
#[derive(Debug, Clone, Default)]
pub struct ScanControl {
    stop: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl ScanControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel once `timeout` has elapsed from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

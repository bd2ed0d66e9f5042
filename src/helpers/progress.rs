//! Transfer progress accounting and rendering
//!
//! [`TransferProgress`] is the pure bookkeeping shared by downloads and
//! extraction; [`Meter`] draws it with indicatif as
//! `[█████.....] 42.00% (1.23 MB/s)`.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Width of the rendered bar in cells
pub const BAR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub transferred: u64,
    pub total: u64,
}

impl TransferProgress {
    pub fn new(total: u64) -> Self {
        Self {
            transferred: 0,
            total,
        }
    }

    pub fn advance(&mut self, bytes: u64) {
        self.transferred += bytes;
    }

    /// Remove bytes from the denominator (work that turned out to be unnecessary).
    pub fn shrink(&mut self, bytes: u64) {
        self.total = self.total.saturating_sub(bytes);
    }

    /// Completion percentage. A zero-byte total counts as done.
    pub fn percent(&self) -> f64 {
        if self.total == 0 || self.transferred >= self.total {
            return 100.0;
        }
        self.transferred as f64 / self.total as f64 * 100.0
    }

    /// Number of filled bar cells.
    pub fn filled(&self) -> usize {
        ((self.percent() / 100.0) * BAR_WIDTH as f64) as usize
    }

    pub fn render(&self, elapsed: Duration) -> String {
        let filled = self.filled().min(BAR_WIDTH);
        format!(
            "[{}{}] {:.2}% ({})",
            "█".repeat(filled),
            ".".repeat(BAR_WIDTH - filled),
            self.percent(),
            format_rate(self.transferred, elapsed)
        )
    }
}

/// Average throughput, in KB/s up to 1024 KB/s and MB/s above.
pub fn format_rate(bytes: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let kb_per_sec = if secs > 0.0 {
        (bytes as f64 / 1024.0) / secs
    } else {
        0.0
    };
    if kb_per_sec > 1024.0 {
        format!("{:.2} MB/s", kb_per_sec / 1024.0)
    } else {
        format!("{:.2} KB/s", kb_per_sec)
    }
}

/// Progress line for one download or extraction.
pub struct Meter {
    bar: ProgressBar,
    progress: TransferProgress,
    started: Instant,
}

impl Meter {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("     {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let meter = Self {
            bar,
            progress: TransferProgress::new(total),
            started: Instant::now(),
        };
        meter.redraw();
        meter
    }

    pub fn advance(&mut self, bytes: u64) {
        self.progress.advance(bytes);
        self.redraw();
    }

    pub fn skip(&mut self, bytes: u64) {
        self.progress.shrink(bytes);
        self.redraw();
    }

    pub fn progress(&self) -> TransferProgress {
        self.progress
    }

    /// Leave the final line on screen.
    pub fn finish(self) -> TransferProgress {
        self.bar.finish();
        self.progress
    }

    fn redraw(&self) {
        self.bar
            .set_message(self.progress.render(self.started.elapsed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_total_is_complete() {
        let p = TransferProgress::new(0);
        assert_eq!(p.percent(), 100.0);
        assert_eq!(p.filled(), BAR_WIDTH);
    }

    #[test]
    fn test_half_way() {
        let mut p = TransferProgress::new(1000);
        p.advance(500);
        assert_eq!(p.percent(), 50.0);
        assert_eq!(p.filled(), 25);
        let line = p.render(Duration::from_secs(1));
        assert!(line.starts_with(&format!("[{}{}]", "█".repeat(25), ".".repeat(25))));
        assert!(line.contains("50.00%"));
    }

    #[test]
    fn test_shrink_never_underflows() {
        let mut p = TransferProgress::new(10);
        p.shrink(25);
        assert_eq!(p.total, 0);
        assert_eq!(p.percent(), 100.0);
    }

    #[test]
    fn test_rate_switches_units() {
        assert_eq!(format_rate(512 * 1024, Duration::from_secs(1)), "512.00 KB/s");
        assert_eq!(format_rate(3 * 1024 * 1024, Duration::from_secs(1)), "3.00 MB/s");
        assert_eq!(format_rate(4096, Duration::ZERO), "0.00 KB/s");
    }

    #[test]
    fn test_meter_tracks_skips() {
        let mut m = Meter::new(300);
        m.skip(100);
        m.advance(200);
        let p = m.finish();
        assert_eq!(p.total, 200);
        assert_eq!(p.percent(), 100.0);
    }
}

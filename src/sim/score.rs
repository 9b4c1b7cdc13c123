//! Score and session clock

/// How often the elapsed-time label is recomputed (seconds)
pub const ELAPSED_REFRESH_INTERVAL: f64 = 1.0;

/// Running score plus a wall-clock session timer for the HUD
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    score: u64,
    /// Wall-clock session start (seconds)
    started_at: f64,
    /// When the label was last recomputed
    last_refresh: f64,
    elapsed_label: String,
}

impl ScoreBoard {
    /// Start a session at wall-clock time `now` (seconds)
    pub fn new(now: f64) -> Self {
        Self {
            score: 0,
            started_at: now,
            last_refresh: now,
            elapsed_label: format_mm_ss(0.0),
        }
    }

    pub fn add(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Recompute the elapsed label if a refresh interval has passed.
    /// Returns true when the label was recomputed.
    ///
    /// Refreshes stay on a fixed grid measured from the session start, so a
    /// late frame doesn't push every later update back. After a long stall
    /// the grid skips ahead in whole intervals.
    pub fn refresh(&mut self, now: f64) -> bool {
        let behind = now - self.last_refresh;
        if behind < ELAPSED_REFRESH_INTERVAL {
            return false;
        }
        let intervals = (behind / ELAPSED_REFRESH_INTERVAL).floor();
        self.last_refresh += intervals * ELAPSED_REFRESH_INTERVAL;
        self.elapsed_label = format_mm_ss(now - self.started_at);
        true
    }

    /// Session length as `mm:ss`, as of the last refresh
    pub fn elapsed_label(&self) -> &str {
        &self.elapsed_label
    }
}

/// Format seconds as zero-padded `mm:ss`. Minutes keep counting past 59.
pub fn format_mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub const STATUS_READY: &str = "ready";
pub const STATUS_INIT_FAILED: &str = "failed to initialize; retry by restarting the session";
pub const STATUS_UPLOADED: &str = "uploaded, ready to transcode";
pub const STATUS_EMPTY_FILE: &str = "selected file is empty";
pub const STATUS_SELECT_FILE_FIRST: &str = "please select a file first";
pub const STATUS_IN_PROGRESS: &str = "transcoding in progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_TRANSCODE_ERROR: &str = "transcoding error";

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Single-slot status sink. Every write replaces the previous text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    text: String,
    revision: u64,
}

impl StatusLine {
    pub fn current(&self) -> &str {
        &self.text
    }

    /// Number of writes so far. Bumps even when the text is unchanged.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
    }
}

/// `"<percent>% (transcoded time: <seconds> s)"`, percent with two decimals and
/// elapsed engine time rounded to whole seconds.
pub fn format_progress(ratio: f64, elapsed_micros: i64) -> String {
    let percent = ratio * 100.0;
    let seconds = (elapsed_micros as f64 / MICROS_PER_SECOND).round() as i64;
    format!("{percent:.2}% (transcoded time: {seconds} s)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_uses_two_decimals_and_whole_seconds() {
        assert_eq!(
            format_progress(0.4567, 12_400_000),
            "45.67% (transcoded time: 12 s)"
        );
        assert_eq!(format_progress(1.0, 2_500_000), "100.00% (transcoded time: 3 s)");
        assert_eq!(format_progress(0.0, 0), "0.00% (transcoded time: 0 s)");
    }

    #[test]
    fn status_revision_counts_every_write() {
        let mut status = StatusLine::default();
        status.set("a");
        status.set("a");
        assert_eq!(status.current(), "a");
        assert_eq!(status.revision(), 2);
    }
}

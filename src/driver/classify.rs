//! Severity classification of reconciler diagnostics.
//!
//! The reconciler has no structured log channel. Its log format embeds a
//! bracketed level token (`[2017-01-01 12:00:00 DEBUG] ...`), so lines are
//! matched on those literal markers. Any change to the reconciler's format
//! silently demotes its lines to info.

/// Level a diagnostic line is re-logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLevel {
    Debug,
    Warn,
    Error,
    Critical,
    Info,
}

const MARKERS: [(&str, LineLevel); 4] = [
    ("DEBUG]", LineLevel::Debug),
    ("Warn]", LineLevel::Warn),
    ("ERROR]", LineLevel::Error),
    ("CRITICAL]", LineLevel::Critical),
];

/// First matching marker wins; unmarked lines are info.
pub fn classify(line: &str) -> LineLevel {
    MARKERS
        .iter()
        .find(|(marker, _)| line.contains(marker))
        .map(|(_, level)| *level)
        .unwrap_or(LineLevel::Info)
}

/// Re-log one reconciler line under the `reconciler` target.
pub fn log_line(pid: u32, line: &str) {
    match classify(line) {
        LineLevel::Debug => tracing::debug!(target: "reconciler", pid, "{line}"),
        LineLevel::Warn => tracing::warn!(target: "reconciler", pid, "{line}"),
        LineLevel::Error | LineLevel::Critical => {
            tracing::error!(target: "reconciler", pid, "{line}")
        }
        LineLevel::Info => tracing::info!(target: "reconciler", pid, "{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(classify("[2017-06-01 10:00:00,000 DEBUG] polling"), LineLevel::Debug);
        assert_eq!(classify("[2017-06-01 Warn] slow response"), LineLevel::Warn);
        assert_eq!(classify("[2017-06-01 ERROR] bad config"), LineLevel::Error);
        assert_eq!(classify("[2017-06-01 CRITICAL] giving up"), LineLevel::Critical);
        assert_eq!(classify("plain output"), LineLevel::Info);
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert_eq!(classify("[debug] lower case"), LineLevel::Info);
        assert_eq!(classify("[WARN] upper case"), LineLevel::Info);
    }

    #[test]
    fn test_first_marker_wins() {
        assert_eq!(classify("DEBUG] retrying after ERROR] x"), LineLevel::Debug);
    }
}

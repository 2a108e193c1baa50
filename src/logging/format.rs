//! Log and report lines. Reports are one JSON object per line on stdout;
//! diagnostics go to stderr so the two never interleave.

use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Envelope for one emitted report.
#[derive(Serialize)]
pub struct ReportLine<'a, T: Serialize> {
    pub ts: String,
    pub kind: &'a str,
    #[serde(flatten)]
    pub report: &'a T,
}

impl<'a, T: Serialize> ReportLine<'a, T> {
    pub fn new(kind: &'a str, report: &'a T) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            kind,
            report,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber: level from RUST_LOG or `default_level`,
    /// JSON or human format. Returns false if a subscriber was already set.
    pub fn init(json: bool, default_level: &str) -> bool {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .try_init()
                .is_ok()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .is_ok()
        }
    }

    /// Write `event` as a single JSON line.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[derive(Serialize)]
    struct Score {
        score: i32,
    }

    #[test]
    fn test_report_line_is_flat_ndjson() {
        let mut buf = Vec::new();
        let report = Score { score: 712 };
        StructuredLogger::emit_json(&ReportLine::new("citizen", &report), &mut buf).unwrap();
        StructuredLogger::emit_json(&ReportLine::new("citizen", &report), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["kind"], "citizen");
        assert_eq!(v["score"], 712);
        assert!(v["ts"].is_string());
    }
}

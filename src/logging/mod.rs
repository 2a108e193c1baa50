mod format;

pub use format::{ReportLine, StructuredLogger};

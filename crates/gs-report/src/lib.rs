//! # gs-report
//!
//! Reporting sinks for GridScape surface scans. Each evaluated grid point is
//! forwarded to every attached sink as one row; sinks carry an explicit
//! service order so interactive (on-screen) output is always emitted after
//! batch (file) output.

mod console;
mod file;
mod memory;
mod sink;

pub use console::ConsoleSink;
pub use file::TsvFileSink;
pub use memory::{MemorySink, RecordedRow, RowBuffer};
pub use sink::{has_interactive, sort_sinks, ReportSink, SinkOrder};

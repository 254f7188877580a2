use std::cell::RefCell;
use std::rc::Rc;

use gs_types::GsResult;

use crate::sink::{ReportSink, SinkOrder};

/// One captured row.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRow {
    pub sample: u64,
    pub point: Vec<f64>,
    pub log_density: f64,
}

/// Shared handle onto a memory sink's captured rows. Scans are
/// single-threaded by contract, so a plain `Rc<RefCell<_>>` suffices.
pub type RowBuffer = Rc<RefCell<Vec<RecordedRow>>>;

/// In-memory sink for tests and programmatic consumers.
pub struct MemorySink {
    name: String,
    rows: RowBuffer,
    opened: bool,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            rows: Rc::new(RefCell::new(Vec::new())),
            opened: false,
            closed: false,
        }
    }

    /// Handle onto the captured rows, valid after the sink itself has been
    /// handed to an engine.
    pub fn rows(&self) -> RowBuffer {
        Rc::clone(&self.rows)
    }

    pub fn is_open(&self) -> bool {
        self.opened && !self.closed
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> SinkOrder {
        SinkOrder::Batch
    }

    fn open(&mut self, _labels: &[String]) -> GsResult<()> {
        self.opened = true;
        self.closed = false;
        Ok(())
    }

    fn record(&mut self, sample: u64, point: &[f64], log_density: f64) -> GsResult<()> {
        self.rows.borrow_mut().push(RecordedRow {
            sample,
            point: point.to_vec(),
            log_density,
        });
        Ok(())
    }

    fn close(&mut self) -> GsResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_rows_through_shared_handle() {
        let mut sink = MemorySink::new();
        let rows = sink.rows();

        sink.open(&["kappa".to_string()]).unwrap();
        sink.record(0, &[1.0], -0.25).unwrap();
        sink.record(1, &[2.0], -0.25).unwrap();
        sink.close().unwrap();

        let captured = rows.borrow();
        assert_eq!(captured.len(), 2);
        assert_eq!(
            captured[0],
            RecordedRow {
                sample: 0,
                point: vec![1.0],
                log_density: -0.25,
            }
        );
        assert_eq!(captured[1].sample, 1);
    }

    #[test]
    fn tracks_open_and_close() {
        let mut sink = MemorySink::new();
        assert!(!sink.is_open());

        sink.open(&[]).unwrap();
        assert!(sink.is_open());

        sink.close().unwrap();
        assert!(!sink.is_open());
    }
}

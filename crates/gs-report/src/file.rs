use std::fs::File;
use std::path::{Path, PathBuf};

use gs_types::{GsResult, SinkError};
use tracing::{debug, info};

use crate::sink::{ReportSink, SinkOrder};

/// Tab-delimited trace file, one row per recorded grid point.
pub struct TsvFileSink {
    name: String,
    path: PathBuf,
    every: u64,
    writer: Option<csv::Writer<File>>,
}

impl TsvFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            name: "tracelog".to_string(),
            path: path.as_ref().to_path_buf(),
            every: 1,
            writer: None,
        }
    }

    /// Record only every n-th sample. `0` is treated as 1.
    pub fn with_every(mut self, every: u64) -> Self {
        self.every = every.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_error(&self, reason: impl ToString) -> SinkError {
        SinkError::OpenFailed {
            sink: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ReportSink for TsvFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> SinkOrder {
        SinkOrder::Batch
    }

    fn open(&mut self, labels: &[String]) -> GsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.open_error(e))?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&self.path)
            .map_err(|e| self.open_error(e))?;

        let mut header = Vec::with_capacity(labels.len() + 2);
        header.push("sample".to_string());
        header.extend(labels.iter().cloned());
        header.push("logDensity".to_string());
        writer
            .write_record(&header)
            .map_err(|e| self.open_error(e))?;

        info!(path = %self.path.display(), "opened trace file");
        self.writer = Some(writer);
        Ok(())
    }

    fn record(&mut self, sample: u64, point: &[f64], log_density: f64) -> GsResult<()> {
        if sample % self.every != 0 {
            return Ok(());
        }
        let writer = self.writer.as_mut().ok_or_else(|| SinkError::RecordFailed {
            sink: self.name.clone(),
            reason: "sink is not open".to_string(),
        })?;

        let mut row = Vec::with_capacity(point.len() + 2);
        row.push(sample.to_string());
        row.extend(point.iter().map(|value| value.to_string()));
        row.push(log_density.to_string());
        writer.write_record(&row).map_err(|e| SinkError::RecordFailed {
            sink: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn close(&mut self) -> GsResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| SinkError::CloseFailed {
                sink: self.name.clone(),
                reason: e.to_string(),
            })?;
            debug!(path = %self.path.display(), "flushed and closed trace file");
        }
        Ok(())
    }
}

use gs_types::GsResult;

use crate::sink::{ReportSink, SinkOrder};

/// On-screen sink with aligned columns, serviced after every batch sink.
pub struct ConsoleSink {
    name: String,
    every: u64,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            name: "screenlog".to_string(),
            every: 1,
        }
    }

    /// Print only every n-th sample. `0` is treated as 1.
    pub fn with_every(mut self, every: u64) -> Self {
        self.every = every.max(1);
        self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> SinkOrder {
        SinkOrder::Interactive
    }

    fn open(&mut self, labels: &[String]) -> GsResult<()> {
        let mut header = format!("{:>10}", "sample");
        for label in labels {
            header.push_str(&format!("{label:>16}"));
        }
        header.push_str(&format!("{:>16}", "logDensity"));
        println!("{header}");
        Ok(())
    }

    fn record(&mut self, sample: u64, point: &[f64], log_density: f64) -> GsResult<()> {
        if sample % self.every != 0 {
            return Ok(());
        }
        let mut row = format!("{sample:>10}");
        for value in point {
            row.push_str(&format!("{value:>16.6}"));
        }
        row.push_str(&format!("{log_density:>16.4}"));
        println!("{row}");
        Ok(())
    }

    fn close(&mut self) -> GsResult<()> {
        Ok(())
    }
}

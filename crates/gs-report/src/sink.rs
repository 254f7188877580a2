use serde::{Deserialize, Serialize};

use gs_types::GsResult;

/// When a sink is serviced relative to the others.
///
/// An explicit attribute rather than an inference from the destination type:
/// interactive sinks are serviced last so incremental on-screen feedback
/// stays readable below file output. Presentation-only; not a correctness
/// rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkOrder {
    Batch,
    Interactive,
}

/// A destination that records one row per evaluated grid point.
///
/// Sinks are driven single-threaded: `open` once before enumeration,
/// `record` once per leaf, `close` once afterwards. The engine guarantees
/// `close` runs even when a run aborts mid-grid, and never rolls back rows
/// already written.
pub trait ReportSink {
    fn name(&self) -> &str;

    fn order(&self) -> SinkOrder {
        SinkOrder::Batch
    }

    /// Called once before enumeration; `labels` are the axis column names.
    fn open(&mut self, labels: &[String]) -> GsResult<()>;

    /// Called once per grid point, in strictly increasing sample order.
    fn record(&mut self, sample: u64, point: &[f64], log_density: f64) -> GsResult<()>;

    /// Called once after enumeration, on both success and abort paths.
    fn close(&mut self) -> GsResult<()>;
}

/// Stable-sort sinks so batch sinks come first and interactive sinks last,
/// preserving insertion order within each class.
pub fn sort_sinks(sinks: &mut [Box<dyn ReportSink>]) {
    sinks.sort_by_key(|sink| sink.order());
}

/// Whether any sink gives on-screen feedback.
pub fn has_interactive(sinks: &[Box<dyn ReportSink>]) -> bool {
    sinks.iter().any(|sink| sink.order() == SinkOrder::Interactive)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSink {
        name: String,
        order: SinkOrder,
    }

    impl StubSink {
        fn boxed(name: &str, order: SinkOrder) -> Box<dyn ReportSink> {
            Box::new(Self {
                name: name.to_string(),
                order,
            })
        }
    }

    impl ReportSink for StubSink {
        fn name(&self) -> &str {
            &self.name
        }
        fn order(&self) -> SinkOrder {
            self.order
        }
        fn open(&mut self, _labels: &[String]) -> GsResult<()> {
            Ok(())
        }
        fn record(&mut self, _sample: u64, _point: &[f64], _log_density: f64) -> GsResult<()> {
            Ok(())
        }
        fn close(&mut self) -> GsResult<()> {
            Ok(())
        }
    }

    #[test]
    fn interactive_sinks_are_serviced_last() {
        let mut sinks = vec![
            StubSink::boxed("screen", SinkOrder::Interactive),
            StubSink::boxed("trace", SinkOrder::Batch),
            StubSink::boxed("extra", SinkOrder::Batch),
        ];

        sort_sinks(&mut sinks);

        let names: Vec<&str> = sinks.iter().map(|sink| sink.name()).collect();
        assert_eq!(names, vec!["trace", "extra", "screen"]);
    }

    #[test]
    fn sort_is_stable_within_a_class() {
        let mut sinks = vec![
            StubSink::boxed("a", SinkOrder::Batch),
            StubSink::boxed("s1", SinkOrder::Interactive),
            StubSink::boxed("b", SinkOrder::Batch),
            StubSink::boxed("s2", SinkOrder::Interactive),
        ];

        sort_sinks(&mut sinks);

        let names: Vec<&str> = sinks.iter().map(|sink| sink.name()).collect();
        assert_eq!(names, vec!["a", "b", "s1", "s2"]);
    }

    #[test]
    fn detects_missing_interactive_sink() {
        let sinks = vec![StubSink::boxed("trace", SinkOrder::Batch)];
        assert!(!has_interactive(&sinks));

        let sinks = vec![
            StubSink::boxed("trace", SinkOrder::Batch),
            StubSink::boxed("screen", SinkOrder::Interactive),
        ];
        assert!(has_interactive(&sinks));
    }
}

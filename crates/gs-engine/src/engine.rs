//! Exhaustive evaluation of an objective over the configured grid.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use gs_grid::{GridSpace, Odometer};
use gs_report::{has_interactive, sort_sinks, ReportSink};
use gs_types::{
    ConfigError, EvalError, GsResult, Objective, ParameterStore, ScanConfig, ScanReport,
    ScanStatus,
};

use crate::companion::CompanionSetter;

/// The surface-scan engine.
///
/// Owns the parameter store for the duration of a run: every grid point
/// mutates the store in place and the next point builds on the resulting
/// state, so a run is strictly sequential and non-reentrant. Configuration
/// faults are rejected at construction, never at first use.
pub struct Engine<S: ParameterStore> {
    config: ScanConfig,
    store: S,
    space: GridSpace,
    objective: Box<dyn Objective>,
    sinks: Vec<Box<dyn ReportSink>>,
    companions: Vec<CompanionSetter>,
    status: ScanStatus,
}

impl<S: ParameterStore> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("space", &self.space)
            .field("sinks", &self.sinks.len())
            .field("companions", &self.companions.len())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<S: ParameterStore> Engine<S> {
    pub fn new(
        config: ScanConfig,
        store: S,
        space: GridSpace,
        objective: Box<dyn Objective>,
    ) -> GsResult<Self> {
        space.validate(&store)?;

        let points = space.grid_size()?;
        if points > config.max_points {
            return Err(ConfigError::GridTooLarge {
                points,
                max: config.max_points,
            }
            .into());
        }
        if let Some(sample) = config.resume_from {
            if sample >= points {
                return Err(ConfigError::ResumeOutOfRange { sample, points }.into());
            }
        }

        let status = ScanStatus::new(config.id);
        Ok(Self {
            config,
            store,
            space,
            objective,
            sinks: Vec::new(),
            companions: Vec::new(),
            status,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn status(&self) -> &ScanStatus {
        &self.status
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn add_sink(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    /// Attach a companion setter. Its binding is checked here, like an axis
    /// binding: the parameter must be managed by the store and must not
    /// collide with a grid axis or another companion.
    pub fn add_companion(&mut self, companion: CompanionSetter) -> GsResult<()> {
        let parameter = companion.parameter();
        let matches = self
            .store
            .node_ids()
            .iter()
            .filter(|id| id.as_str() == parameter)
            .count();
        if matches == 0 {
            return Err(ConfigError::UnknownParameter {
                axis: companion.label(),
                parameter: parameter.to_string(),
            }
            .into());
        }

        let len = self.store.node_len(parameter)?;
        if companion.component() >= len {
            return Err(ConfigError::ComponentOutOfRange {
                axis: companion.label(),
                parameter: parameter.to_string(),
                component: companion.component(),
                len,
            }
            .into());
        }

        let collides = self
            .space
            .axes()
            .iter()
            .any(|axis| axis.parameter() == parameter && axis.component() == companion.component())
            || self
                .companions
                .iter()
                .any(|other| {
                    other.parameter() == parameter && other.component() == companion.component()
                });
        if collides {
            return Err(ConfigError::CompanionCollision {
                parameter: parameter.to_string(),
                component: companion.component(),
            }
            .into());
        }

        self.companions.push(companion);
        Ok(())
    }

    /// Run the scan: baseline evaluation, sink setup, exhaustive traversal,
    /// final report.
    ///
    /// Sample indices are assigned in strictly increasing order matching the
    /// lexicographic order of grid-point tuples (axis 0 varies slowest). On
    /// an evaluation failure the whole run aborts; rows already written to
    /// sinks remain, and sinks are closed on both paths.
    pub fn run(&mut self) -> GsResult<ScanReport> {
        let started = Instant::now();

        self.space.validate(&self.store)?;
        let points = self.space.grid_size()?;
        info!(
            scan = %self.config.name,
            points,
            axes = self.space.len(),
            "starting surface scan"
        );
        self.status.mark_running();

        let mut completed = self.config.resume_from.unwrap_or(0);

        // Baseline under everything-dirty, so a caching objective starts
        // from a fully recomputed value.
        self.store.propagate_dirty(true);
        let baseline = match self.objective.log_density(&self.store) {
            Ok(value) => value,
            Err(source) => {
                let point = self.space.point(&self.store).unwrap_or_default();
                error!(%source, "baseline objective evaluation failed");
                self.status.mark_failed(completed, source.to_string());
                return Err(EvalError::ObjectiveFailed {
                    sample: completed,
                    point,
                    reason: source.to_string(),
                }
                .into());
            }
        };
        debug!(baseline, "baseline objective computed");

        let mut odometer = Odometer::new(&self.space.sizes())?;
        self.space.reset();
        if let Some(sample) = self.config.resume_from {
            odometer.seek(sample);
            info!(sample, "resuming scan from checkpointed sample index");
        }

        // Interactive sinks go last so on-screen feedback stays readable.
        sort_sinks(&mut self.sinks);
        if !has_interactive(&self.sinks) {
            warn!("no interactive sink attached; nothing will appear on screen during the scan");
        }
        let labels = self.space.labels();
        let mut opened = 0;
        let mut open_error = None;
        for sink in &mut self.sinks {
            match sink.open(&labels) {
                Ok(()) => opened += 1,
                Err(e) => {
                    open_error = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = open_error {
            for sink in &mut self.sinks[..opened] {
                let _ = sink.close();
            }
            self.status.mark_failed(completed, e.to_string());
            return Err(e);
        }

        let outcome = self.sweep(&mut odometer, baseline, &mut completed);
        let close_outcome = self.close_sinks();

        match outcome {
            Ok(final_log_density) => {
                if let Err(e) = close_outcome {
                    self.status.mark_failed(completed, e.to_string());
                    return Err(e);
                }
                let elapsed_seconds = started.elapsed().as_secs_f64();
                self.status.mark_completed(completed);
                info!(
                    total_samples = completed,
                    elapsed_seconds, final_log_density, "surface scan complete"
                );
                Ok(ScanReport {
                    scan_id: self.config.id,
                    total_samples: completed,
                    final_log_density,
                    elapsed_seconds,
                })
            }
            Err(e) => {
                self.status.mark_failed(completed, e.to_string());
                Err(e)
            }
        }
    }

    /// Walk every remaining grid point, returning the last objective value.
    fn sweep(
        &mut self,
        odometer: &mut Odometer,
        baseline: f64,
        completed: &mut u64,
    ) -> GsResult<f64> {
        let mut log_density = baseline;

        while let Some(step) = odometer.step() {
            // Only the axes whose digit moved need to touch the store; the
            // rest still hold their value from the previous point.
            for dim in step.changed_from..self.space.len() {
                let axis = &mut self.space.axes_mut()[dim];
                axis.seek(step.cursors[dim]);
                axis.advance(&mut self.store)?;
            }
            for companion in &self.companions {
                companion.apply(&mut self.store, step.sample)?;
            }

            self.store.accept_changes();
            self.store.recompute_dirtiness();

            log_density = match self.objective.log_density(&self.store) {
                Ok(value) => value,
                Err(source) => {
                    let point = self.space.point(&self.store).unwrap_or_default();
                    error!(
                        sample = step.sample,
                        %source,
                        "objective evaluation failed; aborting scan"
                    );
                    return Err(EvalError::ObjectiveFailed {
                        sample: step.sample,
                        point,
                        reason: source.to_string(),
                    }
                    .into());
                }
            };
            self.store.propagate_dirty(false);

            let point = self.space.point(&self.store)?;
            for sink in &mut self.sinks {
                sink.record(step.sample, &point, log_density)?;
            }

            *completed = step.sample + 1;
            debug!(sample = step.sample, log_density, "evaluated grid point");
        }

        Ok(log_density)
    }

    /// Close every sink, reporting the first failure after trying them all.
    fn close_sinks(&mut self) -> GsResult<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                error!(sink = sink.name(), error = %e, "failed to close sink");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

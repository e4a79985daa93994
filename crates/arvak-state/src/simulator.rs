//! Repetition-running simulator.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::dispatch::ActOnDispatcher;
use crate::error::StateResult;
use crate::log::MeasurementLog;
use crate::operation::Operation;
use crate::representation::Representation;
use crate::state::SimulationState;

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Number of independent runs.
    pub repetitions: usize,
    /// Base seed; repetition `i` is reseeded with `seed + i`. Without one,
    /// every run draws a fresh base seed.
    pub seed: Option<u64>,
    /// Whether operations may be decomposed during dispatch.
    pub allow_decompose: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            repetitions: 1,
            seed: None,
            allow_decompose: true,
        }
    }
}

impl SimulatorConfig {
    /// Set the number of repetitions.
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Allow or forbid decomposition.
    #[must_use]
    pub fn with_allow_decompose(mut self, allow: bool) -> Self {
        self.allow_decompose = allow;
        self
    }
}

/// Measurement logs of every repetition of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    logs: Vec<MeasurementLog>,
}

impl RunResult {
    /// Number of repetitions that ran.
    pub fn repetitions(&self) -> usize {
        self.logs.len()
    }

    /// Per-repetition logs, in repetition order.
    pub fn logs(&self) -> &[MeasurementLog] {
        &self.logs
    }

    /// Results recorded under `key`, one row per repetition that has it.
    pub fn measurements(&self, key: &str) -> Vec<Vec<i64>> {
        self.logs
            .iter()
            .filter_map(|log| log.get(key).map(<[i64]>::to_vec))
            .collect()
    }

    /// Histogram of the results recorded under `key`.
    pub fn counts(&self, key: &str) -> FxHashMap<Vec<i64>, usize> {
        let mut counts = FxHashMap::default();
        for row in self.measurements(key) {
            *counts.entry(row).or_insert(0) += 1;
        }
        counts
    }
}

/// Runs a sequence of operations against copies of an initial state.
#[derive(Debug)]
pub struct Simulator {
    config: SimulatorConfig,
    dispatcher: ActOnDispatcher,
}

impl Simulator {
    /// Create a simulator with default settings.
    pub fn new() -> Self {
        Self::with_config(SimulatorConfig::default())
    }

    /// Create a simulator with `config`.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self {
            config,
            dispatcher: ActOnDispatcher::new(),
        }
    }

    /// Replace the act-on dispatcher.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: ActOnDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Apply `ops` in order to a copy of `initial` and return the final
    /// state.
    ///
    /// The copy is reseeded with the base seed.
    pub fn simulate<R: Representation>(
        &self,
        ops: &[Box<dyn Operation>],
        initial: &SimulationState<R>,
    ) -> StateResult<SimulationState<R>> {
        self.run_repetition(self.base_seed(), 0, ops, initial.copy())
    }

    fn base_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }

    /// Copies share their random source with `initial`, so every repetition
    /// is reseeded before it runs.
    fn run_repetition<R: Representation>(
        &self,
        base_seed: u64,
        repetition: usize,
        ops: &[Box<dyn Operation>],
        mut state: SimulationState<R>,
    ) -> StateResult<SimulationState<R>> {
        state.reseed(base_seed.wrapping_add(repetition as u64));
        for op in ops {
            state.act_on_with(
                &self.dispatcher,
                op.as_ref(),
                op.qids(),
                self.config.allow_decompose,
            )?;
        }
        debug!(
            "Repetition {} finished with {} logged keys",
            repetition,
            state.log().len()
        );
        Ok(state)
    }

    /// Run every repetition in turn, each on its own copy of `initial`.
    #[instrument(skip(self, ops, initial), fields(repetitions = self.config.repetitions))]
    pub fn run<R: Representation>(
        &self,
        ops: &[Box<dyn Operation>],
        initial: &SimulationState<R>,
    ) -> StateResult<RunResult> {
        info!(
            "Running {} operations on {} qids ({})",
            ops.len(),
            initial.len(),
            R::NAME
        );

        let base_seed = self.base_seed();
        let logs = (0..self.config.repetitions)
            .map(|rep| {
                self.run_repetition(base_seed, rep, ops, initial.copy())
                    .map(SimulationState::into_log)
            })
            .collect::<StateResult<Vec<_>>>()?;

        info!("Run completed, {} repetitions", logs.len());
        Ok(RunResult { logs })
    }

    /// Like [`Simulator::run`], but repetitions run on the rayon pool.
    ///
    /// Every task works on its own deep copy of `initial`; nothing mutable
    /// is shared. Results keep repetition order.
    #[instrument(skip(self, ops, initial), fields(repetitions = self.config.repetitions))]
    pub fn run_parallel<R: Representation>(
        &self,
        ops: &[Box<dyn Operation>],
        initial: &SimulationState<R>,
    ) -> StateResult<RunResult> {
        info!(
            "Running {} repetitions on {} threads ({})",
            self.config.repetitions,
            rayon::current_num_threads(),
            R::NAME
        );

        let base_seed = self.base_seed();
        let logs = (0..self.config.repetitions)
            .into_par_iter()
            .map(|rep| {
                self.run_repetition(base_seed, rep, ops, initial.copy())
                    .map(SimulationState::into_log)
            })
            .collect::<StateResult<Vec<_>>>()?;

        info!("Parallel run completed, {} repetitions", logs.len());
        Ok(RunResult { logs })
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

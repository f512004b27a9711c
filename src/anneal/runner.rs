//! Annealing loop.
//!
//! Each step runs Perturb -> Evaluate -> Decide -> Cool:
//!
//! 1. Flip `perturbations_per_step` uniformly sampled cells, recording each
//!    prior tile.
//! 2. Score the mutated grid.
//! 3. Accept when `delta > 0` or `exp(delta / T) > u`, `u ~ U[0, 1)`.
//!    Otherwise restore the recorded tiles in reverse order.
//! 4. `T *= cooling_factor`.
//!
//! The grid is mutated in place; nothing is cloned per step except on a new
//! best score, when a snapshot goes to the [`ImprovementSink`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use super::config::AnnealConfig;
use super::types::{ImprovementEvent, ImprovementSink};
use crate::error::Result;
use crate::grid::{Cell, ConnectivityEvaluator, ConnectivityResult, Grid, ReachMask, Tile};

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult {
    /// Snapshot of the grid when the best score was first reached.
    pub best: Grid,

    /// Best connectivity score found.
    pub best_score: usize,

    /// Reachability mask of `best`.
    pub best_mask: ReachMask,

    /// Score of the grid as left at the end of the run.
    pub final_score: usize,

    /// Steps executed.
    pub iterations: usize,

    /// Temperature after the last cooling step.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of accepted moves with `delta > 0`.
    pub improving_moves: usize,

    /// Number of new best scores, i.e. improvement events emitted.
    pub improvements: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best score sampled every `history_interval` steps.
    pub score_history: Vec<usize>,
}

/// Executes the annealing search over a [`Grid`].
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs the search, mutating `grid` in place.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) if `config` is invalid.
    pub fn run<R, S>(
        grid: &mut Grid,
        config: &AnnealConfig,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<AnnealResult>
    where
        R: Rng,
        S: ImprovementSink,
    {
        Self::run_with_cancel(grid, config, rng, sink, None)
    }

    /// Runs the search with an optional cancellation flag.
    ///
    /// The flag is checked once per step, before perturbing, so a cancelled
    /// run never leaves a half-applied perturbation in the grid.
    pub fn run_with_cancel<R, S>(
        grid: &mut Grid,
        config: &AnnealConfig,
        rng: &mut R,
        sink: &mut S,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult>
    where
        R: Rng,
        S: ImprovementSink,
    {
        config.validate()?;

        let mut search = Search::new(grid, config);
        let mut cancelled = false;

        info!(
            rows = search.grid.rows(),
            cols = search.grid.cols(),
            source = %search.grid.source(),
            initial_score = search.state.current_score,
            iterations = config.max_iterations,
            "starting annealing run"
        );

        let mut score_history = vec![search.state.best_score];

        for _ in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            search.step(rng, sink);

            if search.iterations.is_multiple_of(config.history_interval) {
                score_history.push(search.state.best_score);
            }
        }

        if score_history.last() != Some(&search.state.best_score) {
            score_history.push(search.state.best_score);
        }

        info!(
            best_score = search.state.best_score,
            improvements = search.state.attempt_counter,
            iterations = search.iterations,
            cancelled,
            "annealing run finished"
        );

        Ok(search.finish(cancelled, score_history))
    }
}

/// Mutable state of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SearchState {
    current_score: usize,
    best_score: usize,
    temperature: f64,
    attempt_counter: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Rejected,
    Accepted,
    Improved,
}

struct Search<'a> {
    grid: &'a mut Grid,
    config: &'a AnnealConfig,
    evaluator: ConnectivityEvaluator,
    candidate: ConnectivityResult,
    undo: Vec<(Cell, Tile)>,
    state: SearchState,
    best: Grid,
    best_mask: ReachMask,
    iterations: usize,
    accepted_moves: usize,
    improving_moves: usize,
}

impl<'a> Search<'a> {
    fn new(grid: &'a mut Grid, config: &'a AnnealConfig) -> Self {
        let mut evaluator = ConnectivityEvaluator::new(config.traversal);
        let candidate = evaluator.evaluate(grid);
        let best = grid.clone();
        let best_mask = candidate.mask.clone();

        Self {
            state: SearchState {
                current_score: candidate.score,
                best_score: candidate.score,
                temperature: config.initial_temperature,
                attempt_counter: 0,
            },
            grid,
            config,
            evaluator,
            candidate,
            undo: Vec::with_capacity(config.perturbations_per_step),
            best,
            best_mask,
            iterations: 0,
            accepted_moves: 0,
            improving_moves: 0,
        }
    }

    fn step<R: Rng, S: ImprovementSink>(&mut self, rng: &mut R, sink: &mut S) -> StepOutcome {
        self.perturb(rng);
        self.evaluator.evaluate_into(self.grid, &mut self.candidate);

        let delta = self.candidate.score as i64 - self.state.current_score as i64;
        let outcome = if accept(delta, self.state.temperature, rng) {
            self.accepted_moves += 1;
            if delta > 0 {
                self.improving_moves += 1;
            }
            self.state.current_score = self.candidate.score;

            if self.state.current_score > self.state.best_score {
                self.record_best(sink);
                StepOutcome::Improved
            } else {
                StepOutcome::Accepted
            }
        } else {
            self.rollback();
            StepOutcome::Rejected
        };

        self.state.temperature *= self.config.cooling_factor;
        self.iterations += 1;
        outcome
    }

    fn perturb<R: Rng>(&mut self, rng: &mut R) {
        self.undo.clear();
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        for _ in 0..self.config.perturbations_per_step {
            let row = rng.random_range(0..rows);
            let col = rng.random_range(0..cols);
            let prior = self.grid.flip(row, col);
            self.undo.push((Cell::new(row, col), prior));
        }
    }

    /// Restores perturbed cells. Reverse order matters when the same cell
    /// was sampled twice in one step.
    fn rollback(&mut self) {
        for &(cell, prior) in self.undo.iter().rev() {
            self.grid.set(cell.row, cell.col, prior);
        }
    }

    fn record_best<S: ImprovementSink>(&mut self, sink: &mut S) {
        self.state.best_score = self.state.current_score;
        self.state.attempt_counter += 1;
        self.best.clone_from(self.grid);
        self.best_mask.clone_from(&self.candidate.mask);

        debug!(
            score = self.state.best_score,
            attempt = self.state.attempt_counter,
            step = self.iterations,
            temperature = self.state.temperature,
            "new best score"
        );

        sink.on_improvement(ImprovementEvent {
            grid: self.best.clone(),
            score: self.state.best_score,
            mask: self.best_mask.clone(),
            attempt: self.state.attempt_counter,
        });
    }

    fn finish(self, cancelled: bool, score_history: Vec<usize>) -> AnnealResult {
        AnnealResult {
            best: self.best,
            best_score: self.state.best_score,
            best_mask: self.best_mask,
            final_score: self.state.current_score,
            iterations: self.iterations,
            final_temperature: self.state.temperature,
            accepted_moves: self.accepted_moves,
            improving_moves: self.improving_moves,
            improvements: self.state.attempt_counter,
            cancelled,
            score_history,
        }
    }
}

/// Acceptance rule for a maximization objective.
///
/// Strict improvements always pass without consuming a random draw.
/// Otherwise the move passes with probability `exp(delta / temperature)`,
/// which is 1 for `delta == 0` at any positive temperature. Once the
/// temperature underflows to zero, `0 / 0` is NaN and neutral moves fail.
fn accept<R: Rng>(delta: i64, temperature: f64, rng: &mut R) -> bool {
    if delta > 0 {
        return true;
    }
    let probability = (delta as f64 / temperature).exp();
    probability > rng.random_range(0.0..1.0)
}

//! Annealing configuration.

use rand::Rng;
use u_numflow::random::create_rng;

use crate::error::{Error, Result};
use crate::grid::Traversal;

/// Configuration for [`AnnealRunner`](super::AnnealRunner).
///
/// Cooling is geometric: after every step, `T_{k+1} = cooling_factor * T_k`,
/// whether or not the step was accepted.
///
/// # Examples
///
/// ```
/// use tile_anneal::anneal::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_max_iterations(50_000)
///     .with_cooling_factor(0.98)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AnnealConfig {
    /// Starting temperature.
    pub initial_temperature: f64,

    /// Multiplicative cooling factor in (0, 1).
    pub cooling_factor: f64,

    /// Number of steps to run.
    pub max_iterations: usize,

    /// Cells flipped per step. Sampled with replacement.
    pub perturbations_per_step: usize,

    /// Traversal used by the connectivity evaluator.
    pub traversal: Traversal,

    /// Best score is sampled into the history every this many steps.
    pub history_interval: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            cooling_factor: 0.95,
            max_iterations: 1_000_000,
            perturbations_per_step: 2,
            traversal: Traversal::default(),
            history_interval: 1000,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_factor(mut self, alpha: f64) -> Self {
        self.cooling_factor = alpha;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_perturbations_per_step(mut self, n: usize) -> Self {
        self.perturbations_per_step = n;
        self
    }

    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Creates the run's generator from `seed`, or from entropy when unset.
    ///
    /// Grid initialization and the search should share this one generator.
    pub fn rng(&self) -> impl Rng {
        create_rng(self.seed.unwrap_or_else(rand::random))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(Error::Config(format!(
                "initial_temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if self.cooling_factor <= 0.0 || self.cooling_factor >= 1.0 {
            return Err(Error::Config(format!(
                "cooling_factor must be in (0, 1), got {}",
                self.cooling_factor
            )));
        }
        if self.perturbations_per_step == 0 {
            return Err(Error::Config("perturbations_per_step must be at least 1".into()));
        }
        if self.history_interval == 0 {
            return Err(Error::Config("history_interval must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnealConfig::default();
        assert!((config.initial_temperature - 1.0).abs() < 1e-12);
        assert!((config.cooling_factor - 0.95).abs() < 1e-12);
        assert_eq!(config.max_iterations, 1_000_000);
        assert_eq!(config.perturbations_per_step, 2);
        assert_eq!(config.traversal, Traversal::Stack);
    }

    #[test]
    fn test_validate_ok() {
        assert!(AnnealConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_temperature() {
        assert!(AnnealConfig::default()
            .with_initial_temperature(0.0)
            .validate()
            .is_err());
        assert!(AnnealConfig::default()
            .with_initial_temperature(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_bad_cooling() {
        for alpha in [0.0, 1.0, 1.5, -0.2] {
            let err = AnnealConfig::default()
                .with_cooling_factor(alpha)
                .validate()
                .unwrap_err();
            assert!(matches!(err, Error::Config(_)), "alpha {alpha}");
        }
    }

    #[test]
    fn test_validate_zero_perturbations() {
        let config = AnnealConfig::default().with_perturbations_per_step(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = AnnealConfig::default().with_seed(9);
        let a: Vec<u32> = (0..8).map(|_| config.rng().random()).collect();
        let mut r1 = config.rng();
        let mut r2 = config.rng();
        let b: Vec<u32> = (0..8).map(|_| r1.random()).collect();
        let c: Vec<u32> = (0..8).map(|_| r2.random()).collect();
        assert_eq!(b, c);
        assert!(a.iter().all(|&v| v == a[0]));
    }
}

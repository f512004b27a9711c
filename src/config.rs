//! Run configuration.
//!
//! All run parameters can come from a TOML file; every field is optional
//! and falls back to the defaults below. The binary applies CLI overrides
//! on top.
//!
//! ```toml
//! [grid]
//! rows = 12
//! cols = 12
//! source = { row = 11, col = 11 }
//! protection = "source-lines"   # or "source-only"
//!
//! [anneal]
//! iterations = 1000000
//! initial_temperature = 1.0
//! cooling_factor = 0.95
//! perturbations_per_step = 2
//! traversal = "stack"           # or "recursive"
//! seed = 42
//!
//! [output]
//! frames_dir = "./grids"
//! animation_path = "./simulation.gif"
//! frame_delay = 50              # hundredths of a second
//! scale = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::anneal::AnnealConfig;
use crate::error::{Error, Result};
use crate::grid::{Cell, ProtectionPolicy, Traversal};
use crate::render::DEFAULT_QUEUE_CAPACITY;

/// Complete configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub grid: GridSection,
    pub anneal: AnnealSection,
    pub output: OutputSection,
}

/// `[grid]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub rows: usize,
    pub cols: usize,
    pub source: Cell,
    pub protection: ProtectionPolicy,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 12,
            source: Cell::new(11, 11),
            protection: ProtectionPolicy::default(),
        }
    }
}

/// `[anneal]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnealSection {
    pub iterations: usize,
    pub initial_temperature: f64,
    pub cooling_factor: f64,
    pub perturbations_per_step: usize,
    pub traversal: Traversal,
    pub seed: Option<u64>,
}

impl Default for AnnealSection {
    fn default() -> Self {
        let defaults = AnnealConfig::default();
        Self {
            iterations: defaults.max_iterations,
            initial_temperature: defaults.initial_temperature,
            cooling_factor: defaults.cooling_factor,
            perturbations_per_step: defaults.perturbations_per_step,
            traversal: defaults.traversal,
            seed: None,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Directory receiving one PNG per improvement. Cleared at run start.
    pub frames_dir: PathBuf,
    /// GIF assembled from the frames after the run.
    pub animation_path: PathBuf,
    /// Per-frame delay in hundredths of a second.
    pub frame_delay: u32,
    /// Pixels per tile edge.
    pub scale: u32,
    /// Events buffered between the search and the frame writer.
    pub queue_capacity: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("./grids"),
            animation_path: PathBuf::from("./simulation.gif"),
            frame_delay: 50,
            scale: 30,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl RunConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Annealing parameters for [`AnnealRunner`](crate::anneal::AnnealRunner).
    pub fn anneal_config(&self) -> AnnealConfig {
        let a = &self.anneal;
        let config = AnnealConfig::default()
            .with_max_iterations(a.iterations)
            .with_initial_temperature(a.initial_temperature)
            .with_cooling_factor(a.cooling_factor)
            .with_perturbations_per_step(a.perturbations_per_step)
            .with_traversal(a.traversal);
        match a.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let g = &self.grid;
        if g.rows == 0 || g.cols == 0 {
            return Err(Error::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                g.rows, g.cols
            )));
        }
        if g.source.row >= g.rows || g.source.col >= g.cols {
            return Err(Error::Config(format!(
                "source {} is outside the {}x{} grid",
                g.source, g.rows, g.cols
            )));
        }
        if self.output.scale == 0 {
            return Err(Error::Config("output scale must be at least 1".into()));
        }
        self.anneal_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_run() {
        let config = RunConfig::default();
        assert_eq!((config.grid.rows, config.grid.cols), (12, 12));
        assert_eq!(config.grid.source, Cell::new(11, 11));
        assert_eq!(config.grid.protection, ProtectionPolicy::SourceLines);
        assert_eq!(config.anneal.iterations, 1_000_000);
        assert_eq!(config.output.frame_delay, 50);
        assert_eq!(config.output.scale, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RunConfig::from_toml_str("").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let text = r#"
            [grid]
            rows = 20
            cols = 30
            source = { row = 0, col = 5 }
            protection = "source-only"

            [anneal]
            iterations = 5000
            cooling_factor = 0.99
            traversal = "recursive"
            seed = 7

            [output]
            frames_dir = "/tmp/frames"
            frame_delay = 20
            scale = 10
        "#;
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.grid.source, Cell::new(0, 5));
        assert_eq!(config.grid.protection, ProtectionPolicy::SourceOnly);
        assert_eq!(config.output.frames_dir, PathBuf::from("/tmp/frames"));
        assert_eq!(config.output.animation_path, PathBuf::from("./simulation.gif"));

        let anneal = config.anneal_config();
        assert_eq!(anneal.max_iterations, 5000);
        assert_eq!(anneal.traversal, Traversal::Recursive);
        assert_eq!(anneal.seed, Some(7));
        assert!((anneal.cooling_factor - 0.99).abs() < 1e-12);
        assert!((anneal.initial_temperature - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_out_of_bounds_source() {
        let text = "[grid]\nrows = 4\ncols = 4\nsource = { row = 4, col = 0 }\n";
        let err = RunConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_bad_cooling() {
        let err = RunConfig::from_toml_str("[anneal]\ncooling_factor = 1.5\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = RunConfig::from_toml_str("[grid]\nsize = 3\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("run.toml");
        fs::write(&path, "[grid]\nrows = 5\ncols = 6\nsource = { row = 1, col = 1 }\n").unwrap();
        let config = RunConfig::load(&path).unwrap();
        assert_eq!((config.grid.rows, config.grid.cols), (5, 6));

        let missing = RunConfig::load(&tmp.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, Error::Io { .. }));
    }
}

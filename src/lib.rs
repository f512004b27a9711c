//! Simulated annealing search for tile layouts.
//!
//! Given a fixed-size grid of [`Tile::Path`](grid::Tile::Path) and
//! [`Tile::Obstacle`](grid::Tile::Obstacle) tiles and a source cell, the
//! search looks for the layout that maximizes the number of obstacles
//! reachable from the source through 4-connected path tiles.
//!
//! - **[`grid`]**: the tile matrix, its mutation primitive, and the
//!   depth-first connectivity evaluator.
//! - **[`anneal`]**: the perturb / evaluate / accept-or-rollback / cool loop,
//!   reporting each new best score to an
//!   [`ImprovementSink`](anneal::ImprovementSink).
//! - **[`render`]**: PNG frames for improvement events, written on a
//!   background thread, and GIF assembly of the saved frames.
//! - **[`config`]**: TOML run configuration.
//!
//! # Example
//!
//! ```
//! use tile_anneal::anneal::{AnnealConfig, AnnealRunner, ImprovementEvent};
//! use tile_anneal::grid::{Cell, Grid};
//!
//! let config = AnnealConfig::default().with_max_iterations(2_000).with_seed(7);
//! let mut rng = config.rng();
//! let mut grid = Grid::random(8, 8, Cell::new(7, 7), &mut rng).unwrap();
//!
//! let mut events: Vec<ImprovementEvent> = Vec::new();
//! let result = AnnealRunner::run(&mut grid, &config, &mut rng, &mut events).unwrap();
//! assert_eq!(events.len(), result.improvements);
//! ```

pub mod anneal;
pub mod config;
mod error;
pub mod grid;
pub mod render;

pub use error::{Error, Result};

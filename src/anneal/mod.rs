//! Simulated annealing over a tile grid.
//!
//! A single-solution trajectory search that maximizes the connectivity
//! score of a [`Grid`](crate::grid::Grid). Worsening moves are accepted
//! with a probability that shrinks as the temperature cools, which lets the
//! search leave local optima early on.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod runner;
mod types;

pub use config::AnnealConfig;
pub use runner::{AnnealResult, AnnealRunner};
pub use types::{ImprovementEvent, ImprovementSink};

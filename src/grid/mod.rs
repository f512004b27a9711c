//! Tile grid model and connectivity scoring.
//!
//! - [`Grid`]: fixed-size matrix of [`Tile`]s with a source cell that is
//!   always a path. Mutated in place through [`Grid::flip`].
//! - [`evaluate`]: counts the obstacles reachable from the source through
//!   4-connected path tiles and reports which tiles were credited.

mod connectivity;
mod types;

pub use connectivity::{
    evaluate, evaluate_with, ConnectivityEvaluator, ConnectivityResult, ReachMask, Traversal,
};
pub use types::{Cell, Grid, ProtectionPolicy, Tile};

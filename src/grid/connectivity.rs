//! Connectivity scoring.
//!
//! A depth-first traversal from the source cell through orthogonally
//! adjacent path tiles. Every obstacle touching the reached path region is
//! counted once; obstacles never propagate connectivity.

use serde::{Deserialize, Serialize};

use super::types::{Grid, Tile};

/// Orthogonal neighbor offsets: up, down, left, right.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Traversal strategy for [`ConnectivityEvaluator`].
///
/// Both strategies credit exactly the same tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Recursive DFS. Call depth grows up to `rows * cols`, so only
    /// suitable for small grids.
    Recursive,
    /// Iterative DFS with an explicit stack.
    #[default]
    Stack,
}

/// Row-major boolean grid of tiles credited during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl ReachMask {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the tile at `(row, col)` was credited.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.rows && col < self.cols);
        self.cells[row * self.cols + col]
    }

    /// Row-major view of the mask.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of credited tiles.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn reset(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.cells.clear();
        self.cells.resize(rows * cols, false);
    }
}

/// Outcome of scoring one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityResult {
    /// Distinct obstacle tiles reachable from the source.
    pub score: usize,
    /// Tiles credited while traversing (path tiles visited, obstacles counted).
    pub mask: ReachMask,
}

impl ConnectivityResult {
    /// An empty result sized for a `rows x cols` grid.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            score: 0,
            mask: ReachMask::new(rows, cols),
        }
    }
}

/// Scores grids while reusing its scratch buffers between calls.
///
/// The annealing loop evaluates once per step; keeping the visited set and
/// stack here means steady-state evaluation performs no allocation.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityEvaluator {
    traversal: Traversal,
    visited: Vec<bool>,
    stack: Vec<usize>,
}

impl ConnectivityEvaluator {
    pub fn new(traversal: Traversal) -> Self {
        Self {
            traversal,
            visited: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Scores `grid`, returning a freshly allocated result.
    pub fn evaluate(&mut self, grid: &Grid) -> ConnectivityResult {
        let mut out = ConnectivityResult::empty(grid.rows(), grid.cols());
        self.evaluate_into(grid, &mut out);
        out
    }

    /// Scores `grid` into `out`, overwriting its previous contents.
    pub fn evaluate_into(&mut self, grid: &Grid, out: &mut ConnectivityResult) {
        let (rows, cols) = (grid.rows(), grid.cols());
        out.mask.reset(rows, cols);
        self.visited.clear();
        self.visited.resize(rows * cols, false);

        let source = grid.source();
        let start = source.row * cols + source.col;
        out.mask.cells[start] = true;

        out.score = match self.traversal {
            Traversal::Recursive => visit(grid, start, &mut self.visited, &mut out.mask.cells),
            Traversal::Stack => {
                walk(grid, start, &mut self.visited, &mut out.mask.cells, &mut self.stack)
            }
        };
    }
}

/// Scores `grid` with the default traversal.
///
/// ```
/// use tile_anneal::grid::{evaluate, Cell, Grid};
///
/// let grid = Grid::from_layout("...\n..#\n.#.", Cell::new(2, 2)).unwrap();
/// assert_eq!(evaluate(&grid).score, 2);
/// ```
pub fn evaluate(grid: &Grid) -> ConnectivityResult {
    ConnectivityEvaluator::default().evaluate(grid)
}

/// Scores `grid` with the given traversal.
pub fn evaluate_with(grid: &Grid, traversal: Traversal) -> ConnectivityResult {
    ConnectivityEvaluator::new(traversal).evaluate(grid)
}

/// In-bounds orthogonal neighbors of a row-major index.
fn neighbors(rows: usize, cols: usize, idx: usize) -> impl Iterator<Item = usize> {
    let (row, col) = (idx / cols, idx % cols);
    DIRECTIONS.into_iter().filter_map(move |(dr, dc)| {
        let r = row.checked_add_signed(dr).filter(|&r| r < rows)?;
        let c = col.checked_add_signed(dc).filter(|&c| c < cols)?;
        Some(r * cols + c)
    })
}

fn visit(grid: &Grid, idx: usize, visited: &mut [bool], counted: &mut [bool]) -> usize {
    visited[idx] = true;
    let tiles = grid.tiles();
    let mut score = 0;

    for next in neighbors(grid.rows(), grid.cols(), idx) {
        if visited[next] {
            continue;
        }
        match tiles[next] {
            Tile::Path => {
                counted[next] = true;
                score += visit(grid, next, visited, counted);
            }
            Tile::Obstacle if !counted[next] => {
                counted[next] = true;
                score += 1;
            }
            Tile::Obstacle => {}
        }
    }
    score
}

fn walk(
    grid: &Grid,
    start: usize,
    visited: &mut [bool],
    counted: &mut [bool],
    stack: &mut Vec<usize>,
) -> usize {
    let tiles = grid.tiles();
    let mut score = 0;

    stack.clear();
    visited[start] = true;
    stack.push(start);

    while let Some(idx) = stack.pop() {
        for next in neighbors(grid.rows(), grid.cols(), idx) {
            if visited[next] {
                continue;
            }
            match tiles[next] {
                Tile::Path => {
                    // Marked on push so a cell is never stacked twice.
                    visited[next] = true;
                    counted[next] = true;
                    stack.push(next);
                }
                Tile::Obstacle if !counted[next] => {
                    counted[next] = true;
                    score += 1;
                }
                Tile::Obstacle => {}
            }
        }
    }
    score
}

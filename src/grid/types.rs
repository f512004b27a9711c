//! Tile grid and its mutation primitive.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of a single grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tile {
    /// Walkable tile. Connectivity propagates through it.
    Path,
    /// Terminal tile. Scores when adjacent to the reachable path region.
    Obstacle,
}

impl Tile {
    /// Layout character: `.` for path, `#` for obstacle.
    pub fn symbol(self) -> char {
        match self {
            Tile::Path => '.',
            Tile::Obstacle => '#',
        }
    }
}

/// A `(row, col)` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Which path tiles [`Grid::flip`] refuses to turn into obstacles.
///
/// The source tile is always protected. The policies differ in whether the
/// rest of the source's row and column are protected as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtectionPolicy {
    /// Every cell sharing the source's row or column is protected.
    ///
    /// A path tile may only become an obstacle when
    /// `row != source.row && col != source.col`.
    #[default]
    SourceLines,

    /// Only the source cell itself is protected.
    SourceOnly,
}

impl ProtectionPolicy {
    /// Returns `true` if a path tile at `cell` must stay a path.
    pub fn protects(self, cell: Cell, source: Cell) -> bool {
        match self {
            ProtectionPolicy::SourceLines => !(cell.row != source.row && cell.col != source.col),
            ProtectionPolicy::SourceOnly => cell == source,
        }
    }
}

/// Fixed-size tile matrix with a designated source cell.
///
/// Tiles are stored row-major. The source tile is always [`Tile::Path`];
/// no public operation can change that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
    source: Cell,
    protection: ProtectionPolicy,
}

impl Grid {
    /// Creates a grid where every tile is independently a path with
    /// probability 0.5, then forces the source to a path.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a dimension is zero or `source` is out of bounds.
    pub fn random<R: Rng>(rows: usize, cols: usize, source: Cell, rng: &mut R) -> Result<Self> {
        let len = check_dimensions(rows, cols, source)?;

        let mut tiles: Vec<Tile> = (0..len)
            .map(|_| {
                if rng.random_bool(0.5) {
                    Tile::Path
                } else {
                    Tile::Obstacle
                }
            })
            .collect();
        tiles[source.row * cols + source.col] = Tile::Path;

        Ok(Self {
            rows,
            cols,
            tiles,
            source,
            protection: ProtectionPolicy::default(),
        })
    }

    /// Builds a grid from a text layout, one line per row.
    ///
    /// `.` is a path and `#` an obstacle. Surrounding whitespace and blank
    /// lines are ignored.
    ///
    /// ```
    /// use tile_anneal::grid::{Cell, Grid, Tile};
    ///
    /// let grid = Grid::from_layout("..#\n.#.\n...", Cell::new(2, 2)).unwrap();
    /// assert_eq!(grid.get(0, 2), Tile::Obstacle);
    /// assert_eq!(grid.rows(), 3);
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::Config`] on ragged rows, unknown characters, an
    /// out-of-bounds source, or a source that is not a path.
    pub fn from_layout(layout: &str, source: Cell) -> Result<Self> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());
        let len = check_dimensions(rows, cols, source)?;

        let mut tiles = Vec::with_capacity(len);
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(Error::Config(format!(
                    "layout row {row} has {} columns, expected {cols}",
                    line.chars().count()
                )));
            }
            for ch in line.chars() {
                let tile = match ch {
                    '.' => Tile::Path,
                    '#' => Tile::Obstacle,
                    other => {
                        return Err(Error::Config(format!(
                            "unknown layout character {other:?} in row {row}"
                        )))
                    }
                };
                tiles.push(tile);
            }
        }

        if tiles[source.row * cols + source.col] != Tile::Path {
            return Err(Error::Config(format!("source {source} must be a path tile")));
        }

        Ok(Self {
            rows,
            cols,
            tiles,
            source,
            protection: ProtectionPolicy::default(),
        })
    }

    /// Replaces the protection policy used by [`flip`](Self::flip).
    pub fn with_protection(mut self, protection: ProtectionPolicy) -> Self {
        self.protection = protection;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn source(&self) -> Cell {
        self.source
    }

    pub fn protection(&self) -> ProtectionPolicy {
        self.protection
    }

    /// Row-major view of all tiles.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles of the given kind.
    pub fn tile_count(&self, kind: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == kind).count()
    }

    /// Returns the tile at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.tiles[self.index(row, col)]
    }

    /// Whether a path tile at `(row, col)` is barred from becoming an obstacle.
    pub fn is_protected(&self, row: usize, col: usize) -> bool {
        self.protection.protects(Cell::new(row, col), self.source)
    }

    /// Mutates one tile and returns its previous kind.
    ///
    /// An obstacle always becomes a path. A path becomes an obstacle unless
    /// the cell is protected, in which case the tile is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn flip(&mut self, row: usize, col: usize) -> Tile {
        let idx = self.index(row, col);
        let prior = self.tiles[idx];
        match prior {
            Tile::Obstacle => self.tiles[idx] = Tile::Path,
            Tile::Path if !self.is_protected(row, col) => self.tiles[idx] = Tile::Obstacle,
            Tile::Path => {}
        }
        prior
    }

    /// Writes a tile directly. Used to roll back rejected perturbations.
    pub(crate) fn set(&mut self, row: usize, col: usize, tile: Tile) {
        let idx = self.index(row, col);
        debug_assert!(
            tile == Tile::Path || Cell::new(row, col) != self.source,
            "source tile must stay a path"
        );
        self.tiles[idx] = tile;
    }

    #[inline]
    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) out of bounds for {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.cols) {
            for tile in row {
                write!(f, "{}", tile.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_dimensions(rows: usize, cols: usize, source: Cell) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(Error::Config(format!(
            "grid dimensions must be positive, got {rows}x{cols}"
        )));
    }
    if source.row >= rows || source.col >= cols {
        return Err(Error::Config(format!(
            "source {source} is outside the {rows}x{cols} grid"
        )));
    }
    rows.checked_mul(cols)
        .ok_or_else(|| Error::Config(format!("grid {rows}x{cols} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    #[test]
    fn test_random_forces_source_path() {
        for seed in 0..20 {
            let mut rng = create_rng(seed);
            let grid = Grid::random(5, 7, Cell::new(4, 6), &mut rng).unwrap();
            assert_eq!(grid.get(4, 6), Tile::Path);
            assert_eq!(grid.tiles().len(), 35);
        }
    }

    #[test]
    fn test_random_is_roughly_balanced() {
        let mut rng = create_rng(7);
        let grid = Grid::random(100, 100, Cell::new(0, 0), &mut rng).unwrap();
        let paths = grid.tile_count(Tile::Path) as f64 / 10_000.0;
        assert!((0.45..0.55).contains(&paths), "path share {paths}");
    }

    #[test]
    fn test_random_same_seed_same_grid() {
        let a = Grid::random(12, 12, Cell::new(11, 11), &mut create_rng(3)).unwrap();
        let b = Grid::random(12, 12, Cell::new(11, 11), &mut create_rng(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_rejects_bad_source() {
        let mut rng = create_rng(1);
        let err = Grid::random(3, 3, Cell::new(3, 0), &mut rng).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(Grid::random(3, 3, Cell::new(0, 3), &mut rng).is_err());
    }

    #[test]
    fn test_random_rejects_zero_dimension() {
        let mut rng = create_rng(1);
        assert!(Grid::random(0, 3, Cell::new(0, 0), &mut rng).is_err());
        assert!(Grid::random(3, 0, Cell::new(0, 0), &mut rng).is_err());
    }

    #[test]
    fn test_from_layout_and_display() {
        let layout = "..#\n.#.\n...\n";
        let grid = Grid::from_layout(layout, Cell::new(2, 2)).unwrap();
        assert_eq!(grid.to_string(), layout);
        assert_eq!(grid.tile_count(Tile::Obstacle), 2);
    }

    #[test]
    fn test_from_layout_errors() {
        assert!(Grid::from_layout("..\n.", Cell::new(0, 0)).is_err());
        assert!(Grid::from_layout(".x", Cell::new(0, 0)).is_err());
        assert!(Grid::from_layout("#.", Cell::new(0, 0)).is_err());
        assert!(Grid::from_layout("", Cell::new(0, 0)).is_err());
    }

    #[test]
    fn test_flip_obstacle_always_becomes_path() {
        let mut grid = Grid::from_layout("###\n#.#\n###", Cell::new(1, 1)).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                if (row, col) == (1, 1) {
                    continue;
                }
                assert_eq!(grid.flip(row, col), Tile::Obstacle);
                assert_eq!(grid.get(row, col), Tile::Path);
            }
        }
    }

    #[test]
    fn test_flip_source_lines_protects_row_and_column() {
        let mut grid = Grid::from_layout("...\n...\n...", Cell::new(1, 1)).unwrap();
        assert_eq!(grid.protection(), ProtectionPolicy::SourceLines);

        // Same row or column as the source: stays a path.
        for (row, col) in [(1, 0), (1, 1), (1, 2), (0, 1), (2, 1)] {
            assert_eq!(grid.flip(row, col), Tile::Path);
            assert_eq!(grid.get(row, col), Tile::Path, "({row}, {col})");
        }
        // Corners share neither.
        for (row, col) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
            grid.flip(row, col);
            assert_eq!(grid.get(row, col), Tile::Obstacle, "({row}, {col})");
        }
    }

    #[test]
    fn test_flip_source_only_protects_source() {
        let mut grid = Grid::from_layout("...\n...\n...", Cell::new(1, 1))
            .unwrap()
            .with_protection(ProtectionPolicy::SourceOnly);

        grid.flip(1, 1);
        assert_eq!(grid.get(1, 1), Tile::Path);
        for (row, col) in [(1, 0), (1, 2), (0, 1), (2, 1), (0, 0)] {
            grid.flip(row, col);
            assert_eq!(grid.get(row, col), Tile::Obstacle, "({row}, {col})");
        }
    }

    #[test]
    fn test_flip_twice_on_unprotected_restores() {
        let mut grid = Grid::from_layout("...\n...\n...", Cell::new(2, 2)).unwrap();
        let before = grid.clone();
        grid.flip(0, 0);
        grid.flip(0, 0);
        assert_eq!(grid, before);
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_bounds_panics() {
        let grid = Grid::from_layout("..\n..", Cell::new(0, 0)).unwrap();
        grid.get(2, 0);
    }
}

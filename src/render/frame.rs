//! Grid snapshot to RGBA frame.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::anneal::ImprovementEvent;
use crate::error::{Error, Result};
use crate::grid::{Grid, ReachMask, Tile};

pub const PATH_REACHABLE: Rgba<u8> = Rgba([190, 190, 190, 255]);
pub const PATH_UNREACHABLE: Rgba<u8> = Rgba([20, 20, 20, 255]);
pub const OBSTACLE_REACHABLE: Rgba<u8> = Rgba([185, 126, 31, 255]);
pub const OBSTACLE_UNREACHABLE: Rgba<u8> = Rgba([177, 57, 14, 255]);

/// Pixel color for a tile, depending on whether the evaluation credited it.
pub fn tile_color(tile: Tile, reachable: bool) -> Rgba<u8> {
    match (tile, reachable) {
        (Tile::Path, true) => PATH_REACHABLE,
        (Tile::Path, false) => PATH_UNREACHABLE,
        (Tile::Obstacle, true) => OBSTACLE_REACHABLE,
        (Tile::Obstacle, false) => OBSTACLE_UNREACHABLE,
    }
}

/// Renders one pixel per tile, then upscales by `scale` with
/// nearest-neighbor sampling. Column maps to x, row to y.
pub fn render_frame(grid: &Grid, mask: &ReachMask, scale: u32) -> Result<RgbaImage> {
    let too_large = || {
        Error::Config(format!(
            "{}x{} grid is too large to render",
            grid.rows(),
            grid.cols()
        ))
    };
    let width = u32::try_from(grid.cols()).map_err(|_| too_large())?;
    let height = u32::try_from(grid.rows()).map_err(|_| too_large())?;

    let base = RgbaImage::from_fn(width, height, |x, y| {
        let (row, col) = (y as usize, x as usize);
        tile_color(grid.get(row, col), mask.get(row, col))
    });
    upscale(&base, scale)
}

/// Nearest-neighbor upscale by an integer factor.
///
/// Fails when `factor` is zero or the scaled dimensions overflow `u32`.
pub fn upscale(img: &RgbaImage, factor: u32) -> Result<RgbaImage> {
    if factor == 0 {
        return Err(Error::Config("frame scale must be at least 1".into()));
    }
    if factor == 1 {
        return Ok(img.clone());
    }
    let (width, height) = img
        .width()
        .checked_mul(factor)
        .zip(img.height().checked_mul(factor))
        .ok_or_else(|| {
            Error::Config(format!(
                "{}x{} image at scale {factor} is too large to render",
                img.width(),
                img.height()
            ))
        })?;
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        *img.get_pixel(x / factor, y / factor)
    }))
}

/// File name for the frame of an improvement: `grid_{attempt}_{score}.png`.
pub fn frame_file_name(attempt: usize, score: usize) -> String {
    format!("grid_{attempt}_{score}.png")
}

/// Renders `event` and writes it as PNG into `dir`. Returns the file path.
pub fn save_frame(dir: &Path, event: &ImprovementEvent, scale: u32) -> Result<PathBuf> {
    let img = render_frame(&event.grid, &event.mask, scale)?;
    let path = dir.join(frame_file_name(event.attempt, event.score));
    img.save_with_format(&path, ImageFormat::Png)
        .map_err(|e| Error::image(&path, e))?;
    Ok(path)
}

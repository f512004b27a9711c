//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by grid construction, configuration and frame export.
///
/// The optimization core only ever produces [`Error::Config`]; the other
/// variants come from the rendering and export layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid grid dimensions, source cell or annealing parameter.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to parse a TOML run configuration.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Filesystem failure on a specific path.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being read, written or removed.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Image decode or encode failure.
    #[error("image error at {path}: {source}")]
    Image {
        /// The frame or animation file involved.
        path: PathBuf,
        /// The underlying codec error.
        source: image::ImageError,
    },

    /// Animation export found no frames to assemble.
    #[error("no frames found in {0}")]
    NoFrames(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Image {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

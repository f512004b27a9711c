//! Output directory handling.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::natural::natural_cmp;
use crate::error::{Error, Result};

/// Ensures `dir` exists and removes everything inside it.
///
/// Callers treat failure as non-fatal: a stale frame left behind only ends
/// up in the animation.
pub fn clear_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let mut removed = 0usize;
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
        removed += 1;
    }

    debug!(dir = %dir.display(), removed, "cleared output directory");
    Ok(())
}

/// Best-effort [`clear_output_dir`] run before a search.
///
/// A failure is logged and swallowed; returns whether the directory was
/// cleared.
pub fn prepare_output_dir(dir: &Path) -> bool {
    match clear_output_dir(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, dir = %dir.display(), "failed to clear frames directory");
            false
        }
    }
}

/// Regular files in `dir`, sorted by file name in natural order.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if entry.file_type().map_err(|e| Error::io(&path, e))?.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| {
        let a = a.file_name().unwrap_or_default().to_string_lossy();
        let b = b.file_name().unwrap_or_default().to_string_lossy();
        natural_cmp(&a, &b)
    });
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("frames");
        clear_output_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_clear_removes_files_and_subdirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("grid_1_1.png"), b"x").unwrap();
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("nested/deeper/file"), b"y").unwrap();

        clear_output_dir(dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(dir).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_fails_on_file_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();
        let err = clear_output_dir(&file).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_prepare_output_dir_is_best_effort() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("frames");
        assert!(prepare_output_dir(&dir));
        assert!(dir.is_dir());

        let file = tmp.path().join("frames.png");
        fs::write(&file, b"x").unwrap();
        assert!(!prepare_output_dir(&file));
        assert_eq!(fs::read(&file).unwrap(), b"x");
    }

    #[test]
    fn test_list_frames_natural_order_skips_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        for name in ["grid_10_9.png", "grid_2_4.png", "grid_1_3.png"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        fs::create_dir(dir.join("grid_0_0.png")).unwrap();

        let names: Vec<String> = list_frames(dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["grid_1_3.png", "grid_2_4.png", "grid_10_9.png"]);
    }
}

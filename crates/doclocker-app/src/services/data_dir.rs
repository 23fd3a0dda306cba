// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

use doclocker_core::error::Result;

const APP_DIR: &str = "doclocker";

/// Return the application data directory, creating it if needed.
///
/// `$XDG_DATA_HOME/doclocker`, else `$HOME/.local/share/doclocker`, else
/// `/tmp/doclocker`.
pub fn data_dir() -> Result<PathBuf> {
    let dir = resolve(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Return a subdirectory of `base` (e.g. "blobs"), creating it if needed.
pub fn data_subdir(base: &Path, name: &str) -> Result<PathBuf> {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn resolve(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    let base = xdg_data_home
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins() {
        let dir = resolve(Some("/data".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/data/doclocker"));
    }

    #[test]
    fn relative_xdg_is_ignored() {
        let dir = resolve(Some("rel".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/doclocker"));
    }

    #[test]
    fn tmp_is_last_resort() {
        assert_eq!(resolve(None, None), PathBuf::from("/tmp/doclocker"));
    }

    #[test]
    fn subdir_is_created() {
        let base = tempfile::tempdir().unwrap();
        let dir = data_subdir(base.path(), "blobs").unwrap();
        assert!(dir.is_dir());
    }
}

use log::debug;

use std::fs;
use std::path::Path;

use snafu::prelude::*;

use crate::ballot::*;

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Creates the directory that will hold the given file, if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> BallotResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            debug!("ensure_parent_dir: creating {:?}", dir);
            fs::create_dir_all(dir).context(CreatingDataDirSnafu {
                path: display_path(dir),
            })?;
            Ok(())
        }
        _ => Ok(()),
    }
}

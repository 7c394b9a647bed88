//! Reading and writing JSON documents on disk.

use crate::error::{CliError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON value, creating parent directories as needed.
pub fn write_json(path: &Path, value: &Value, pretty: bool) -> Result<()> {
    let write_err = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');

    fs::write(path, text).map_err(write_err)?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

/// Files in `dir` whose name ends with `suffix`, sorted by file name.
///
/// `exclude` is skipped when it resolves to one of the matches, so combining
/// into the same directory never reads its own output.
pub fn dealer_files(dir: &Path, suffix: &str, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let read_err = |source| CliError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let excluded = exclude.and_then(|p| p.canonicalize().ok());

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let matches = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix));
        if !matches {
            continue;
        }
        if excluded.is_some() && path.canonicalize().ok() == excluded {
            tracing::info!(
                "Skipping {} as it matches the output file",
                path.display()
            );
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

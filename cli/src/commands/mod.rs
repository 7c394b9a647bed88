//! Subcommand implementations.
//!
//! Each command returns a summary that is printed either as a one-line
//! message or, with `--json`, as a JSON document on stdout.

pub mod combine;
pub mod merge;
pub mod split;

use crate::error::{CliError, Result};
use crate::io::read_json;
use dealer_engine::{DealerCollection, Error, LoadOutcome, Loader};
use std::path::Path;

/// Read a file that must hold a dealer collection.
///
/// Entries the loader rejects are returned alongside the collection; a
/// document that is not a collection at all is fatal.
pub(crate) fn read_collection(
    loader: &Loader,
    path: &Path,
) -> Result<(DealerCollection, Vec<Error>)> {
    match loader.load(read_json(path)?) {
        LoadOutcome::Collection {
            collection,
            rejected,
        } => {
            for err in &rejected {
                tracing::warn!("{}: skipping dealer: {}", path.display(), err);
            }
            Ok((collection, rejected))
        }
        LoadOutcome::SingleDealer(_) => Err(CliError::NotACollection {
            path: path.to_path_buf(),
            reason: "document is a single dealer".to_string(),
        }),
        LoadOutcome::Invalid(err) => Err(CliError::NotACollection {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

/// Source label for errors found in `path`.
pub(crate) fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//! `split`: write one file per dealer.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::io::{read_json, write_json};
use clap::{Args, ValueEnum};
use dealer_engine::{renamed_key, split_document, DealerName, Error, SplitMode};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Collection file to split
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the dealer files are written to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Keep the collection's global keys in every file
    #[arg(long)]
    pub wrapped: bool,

    /// What to do when two dealers map to the same file name
    #[arg(long, value_enum, default_value_t = CollisionArg::Skip)]
    pub on_collision: CollisionArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    /// Keep the first dealer, skip the rest
    Skip,
    /// Write later dealers as `<key>_2`, `<key>_3`, ...
    Rename,
    /// Later dealers replace the earlier file
    Overwrite,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSummary {
    pub output_dir: PathBuf,
    /// File names written, in collection order
    pub files: Vec<String>,
    /// Dealers not written because their file name was taken
    pub skipped: Vec<DealerName>,
    /// Dealers written under a renamed key
    pub renamed: Vec<DealerName>,
    /// Files written more than once
    pub overwritten: Vec<String>,
    pub collisions: Vec<Error>,
    /// Unusable entries, fallback names and failed writes
    pub errors: Vec<String>,
}

impl fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unique: HashSet<&String> = self.files.iter().collect();
        write!(
            f,
            "Split {} dealers into {}",
            unique.len(),
            self.output_dir.display()
        )?;
        if !self.collisions.is_empty() {
            write!(
                f,
                " ({} collisions: {} skipped, {} renamed, {} overwritten)",
                self.collisions.len(),
                self.skipped.len(),
                self.renamed.len(),
                self.overwritten.len()
            )?;
        }
        if !self.errors.is_empty() {
            write!(f, "; {} error(s)", self.errors.len())?;
        }
        Ok(())
    }
}

pub fn run(args: &SplitArgs, config: &Config) -> Result<SplitSummary> {
    let value = read_json(&args.input)?;
    let mode = if args.wrapped {
        SplitMode::Wrapped
    } else {
        SplitMode::Bare
    };

    let output = split_document(value, mode).map_err(|err| CliError::NotACollection {
        path: args.input.clone(),
        reason: err.to_string(),
    })?;
    let mut summary = SplitSummary {
        output_dir: args.output.clone(),
        collisions: output.collisions,
        ..Default::default()
    };
    for err in &output.errors {
        tracing::warn!("{}: {}", args.input.display(), err);
        summary.errors.push(err.to_string());
    }
    for collision in &summary.collisions {
        tracing::warn!("{}", collision);
    }

    let mut used: HashSet<String> = HashSet::new();
    for doc in output.documents {
        let key = if used.contains(&doc.key) {
            match args.on_collision {
                CollisionArg::Skip => {
                    tracing::warn!("Skipping dealer '{}': {} is taken", doc.name, doc.key);
                    summary.skipped.push(doc.name);
                    continue;
                }
                CollisionArg::Rename => {
                    let key = (2..)
                        .map(|n| renamed_key(&doc.key, n))
                        .find(|candidate| !used.contains(candidate))
                        .unwrap_or_else(|| doc.key.clone());
                    tracing::info!("Renaming dealer '{}' to {}", doc.name, key);
                    summary.renamed.push(doc.name.clone());
                    key
                }
                CollisionArg::Overwrite => {
                    tracing::warn!("Overwriting {} with dealer '{}'", doc.key, doc.name);
                    summary.overwritten.push(doc.key.clone());
                    doc.key
                }
            }
        } else {
            doc.key
        };

        let file_name = format!("{key}{}", config.split_suffix);
        let path = args.output.join(&file_name);
        match write_json(&path, &doc.document, config.pretty) {
            Ok(()) => {
                tracing::info!("Saved dealer '{}' to {}", doc.name, path.display());
                used.insert(key);
                summary.files.push(file_name);
            }
            Err(err) => {
                tracing::error!("{}", err);
                summary.errors.push(err.to_string());
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    fn write_input(dir: &Path, value: serde_json::Value) -> PathBuf {
        let path = dir.join("empire.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn args(dir: &Path, input: PathBuf, on_collision: CollisionArg) -> SplitArgs {
        SplitArgs {
            input,
            output: dir.join("out"),
            wrapped: false,
            on_collision,
        }
    }

    #[test]
    fn writes_one_file_per_dealer() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            json!({"dealers": [{"name": "Big Bob's Dealer: East/West"}, {"name": "Ray"}]}),
        );

        let summary = run(&args(dir.path(), input, CollisionArg::Skip), &Config::default()).unwrap();

        assert_eq!(
            summary.files,
            vec!["Big_Bobs_Dealer_EastWest_dealer.json", "Ray_dealer.json"]
        );
        let ray = read_json(&dir.path().join("out/Ray_dealer.json")).unwrap();
        assert_eq!(ray, json!({"name": "Ray"}));
    }

    #[test]
    fn collision_policies() {
        let dealers = json!({"dealers": [{"name": "Big Bob", "n": 1}, {"name": "Big_Bob", "n": 2}]});

        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), dealers.clone());
        let summary = run(&args(dir.path(), input, CollisionArg::Skip), &Config::default()).unwrap();
        assert_eq!(summary.files, vec!["Big_Bob_dealer.json"]);
        assert_eq!(summary.skipped, vec!["Big_Bob"]);
        let kept = read_json(&dir.path().join("out/Big_Bob_dealer.json")).unwrap();
        assert_eq!(kept["n"], 1);

        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), dealers.clone());
        let summary =
            run(&args(dir.path(), input, CollisionArg::Rename), &Config::default()).unwrap();
        assert_eq!(
            summary.files,
            vec!["Big_Bob_dealer.json", "Big_Bob_2_dealer.json"]
        );
        assert_eq!(summary.renamed, vec!["Big_Bob"]);

        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), dealers);
        let summary =
            run(&args(dir.path(), input, CollisionArg::Overwrite), &Config::default()).unwrap();
        assert_eq!(summary.overwritten, vec!["Big_Bob"]);
        let last = read_json(&dir.path().join("out/Big_Bob_dealer.json")).unwrap();
        assert_eq!(last["n"], 2);
    }

    #[test]
    fn nameless_dealer_gets_index_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), json!({"dealers": [{"name": "Ray"}, {"tier": 2}]}));

        let summary = run(&args(dir.path(), input, CollisionArg::Skip), &Config::default()).unwrap();

        assert_eq!(summary.files, vec!["Ray_dealer.json", "dealer_1_dealer.json"]);
        assert_eq!(summary.errors.len(), 1);
        let fallback = read_json(&dir.path().join("out/dealer_1_dealer.json")).unwrap();
        assert_eq!(fallback, json!({"tier": 2}));
    }

    #[test]
    fn not_a_collection_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), json!({"tier": 2}));

        let result = run(&args(dir.path(), input, CollisionArg::Skip), &Config::default());
        assert!(matches!(result, Err(CliError::NotACollection { .. })));
    }

    #[test]
    fn uses_configured_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), json!({"dealers": [{"name": "Ray"}]}));
        let config = Config {
            split_suffix: ".dealer.json".to_string(),
            ..Config::default()
        };

        let summary = run(&args(dir.path(), input, CollisionArg::Skip), &config).unwrap();
        assert_eq!(summary.files, vec!["Ray.dealer.json"]);
    }
}

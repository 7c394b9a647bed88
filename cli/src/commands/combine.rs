//! `combine`: gather split dealer files into one collection.

use super::source_label;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::io::{dealer_files, read_json, write_json};
use clap::Args;
use dealer_engine::{Combiner, Error, Loader, ReconciliationReport, SourceDocument};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CombineArgs {
    /// Directory holding the dealer files
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,

    /// Where the combined collection is written
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineSummary {
    pub output: PathBuf,
    /// Dealer files read, sorted by name
    pub files: Vec<String>,
    pub dealers: usize,
    pub report: ReconciliationReport,
}

impl fmt::Display for CombineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Combined {} dealers from {} files into {}: {}",
            self.dealers,
            self.files.len(),
            self.output.display(),
            self.report
        )
    }
}

pub fn run(args: &CombineArgs, config: &Config) -> Result<CombineSummary> {
    let paths = dealer_files(&args.dir, &config.split_suffix, Some(&args.output))?;
    if paths.is_empty() {
        return Err(CliError::NoDealerFiles {
            dir: args.dir.clone(),
            suffix: config.split_suffix.clone(),
        });
    }

    let loader = Loader::default();
    let mut combiner = Combiner::new(&loader);
    for path in &paths {
        match read_json(path) {
            Ok(value) => combiner.add(SourceDocument::new(source_label(path), value)),
            Err(err) => {
                tracing::warn!("{}", err);
                combiner.skip(source_label(path), Error::invalid(err.to_string()));
            }
        }
    }

    let (combined, report) = combiner.finish();
    for entry in &report.errors {
        tracing::warn!("{}: {}", entry.source, entry.error);
    }

    if combined.is_empty() {
        return Err(CliError::NothingToCombine);
    }

    write_json(&args.output, &combined.to_value(), config.pretty)?;
    tracing::info!(
        "Combined {} dealers into {}",
        combined.len(),
        args.output.display()
    );

    Ok(CombineSummary {
        output: args.output.clone(),
        files: paths.iter().map(|p| source_label(p)).collect(),
        dealers: combined.len(),
        report,
    })
}

//! `merge`: fold incoming files into a base collection.

use super::{read_collection, source_label};
use crate::config::Config;
use crate::error::Result;
use crate::io::{read_json, write_json};
use crate::prompt::TerminalResolver;
use clap::{Args, ValueEnum};
use dealer_engine::{
    ConflictPolicy, Error, Loader, ReconciliationReport, Reconciler, SourceDocument,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Collection the incoming dealers are merged into
    #[arg(short, long)]
    pub base: PathBuf,

    /// Where the merged collection is written
    #[arg(short, long)]
    pub output: PathBuf,

    /// Conflict policy [default: DEALER_DEFAULT_POLICY or overwrite]
    #[arg(short, long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Collections or single-dealer files, merged in order
    #[arg(required = true)]
    pub incoming: Vec<PathBuf>,
}

/// Command-line spelling of [`ConflictPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Incoming dealer replaces the existing one
    Overwrite,
    /// Existing dealer stays
    Keep,
    /// Incoming fields are copied onto the existing dealer
    MergeFields,
    /// Conflicts are reported and the existing dealer stays
    Reject,
    /// Ask on the terminal for every conflicting name
    Prompt,
}

impl From<PolicyArg> for ConflictPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Overwrite => ConflictPolicy::Overwrite,
            PolicyArg::Keep => ConflictPolicy::KeepExisting,
            PolicyArg::MergeFields => ConflictPolicy::MergeFields,
            PolicyArg::Reject => ConflictPolicy::Reject,
            PolicyArg::Prompt => ConflictPolicy::PromptPerConflict,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub output: PathBuf,
    pub policy: ConflictPolicy,
    /// False when the merge was cancelled and nothing was saved
    pub written: bool,
    pub dealers: usize,
    pub report: ReconciliationReport,
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.written {
            write!(
                f,
                "Merged into {} ({} dealers): {}",
                self.output.display(),
                self.dealers,
                self.report
            )
        } else {
            write!(f, "Merge cancelled, {} not written: {}", self.output.display(), self.report)
        }
    }
}

pub fn run(args: &MergeArgs, config: &Config) -> Result<MergeSummary> {
    let policy = args
        .policy
        .map(ConflictPolicy::from)
        .unwrap_or(config.default_policy);
    let loader = Loader::default();

    let (base, base_rejected) = read_collection(&loader, &args.base)?;
    let mut report = ReconciliationReport::new();
    let base_source = source_label(&args.base);
    for err in base_rejected {
        report.record_skipped(base_source.clone(), err);
    }

    let mut documents = Vec::with_capacity(args.incoming.len());
    for path in &args.incoming {
        match read_json(path) {
            Ok(value) => documents.push(SourceDocument::new(source_label(path), value)),
            Err(err) => {
                tracing::warn!("{}", err);
                report.record_skipped(source_label(path), Error::invalid(err.to_string()));
            }
        }
    }

    tracing::debug!(?policy, files = documents.len(), "merging");
    let mut terminal;
    let mut reconciler = Reconciler::new(&base, policy);
    if policy == ConflictPolicy::PromptPerConflict {
        terminal = TerminalResolver::stdio();
        reconciler = reconciler.with_resolver(&mut terminal);
    }
    reconciler.merge_documents(&loader, documents)?;
    let (merged, merge_report) = reconciler.finish();
    report.absorb(merge_report);

    for entry in &report.errors {
        tracing::warn!("{}: {}", entry.source, entry.error);
    }

    let written = !report.cancelled;
    if written {
        write_json(&args.output, &merged.to_value(), config.pretty)?;
        tracing::info!("Merged collection saved to {}", args.output.display());
    } else {
        tracing::warn!("Merge cancelled; {} left untouched", args.output.display());
    }

    Ok(MergeSummary {
        output: args.output.clone(),
        policy,
        written,
        dealers: merged.len(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;

    fn write(dir: &Path, name: &str, value: Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn merge_args(dir: &Path, policy: Option<PolicyArg>) -> MergeArgs {
        let base = write(
            dir,
            "base.json",
            json!({"version": "1.0", "dealers": [{"name": "Ray", "tier": 1, "image": "ray.png"}]}),
        );
        let incoming = write(
            dir,
            "update.json",
            json!({"dealers": [{"name": "Ray", "tier": 2}, {"name": "Benji"}]}),
        );
        MergeArgs {
            base,
            output: dir.join("merged.json"),
            policy,
            incoming: vec![incoming],
        }
    }

    #[test]
    fn policy_flag_maps_to_engine_policy() {
        assert_eq!(ConflictPolicy::from(PolicyArg::Keep), ConflictPolicy::KeepExisting);
        assert_eq!(
            ConflictPolicy::from(PolicyArg::Prompt),
            ConflictPolicy::PromptPerConflict
        );
    }

    #[test]
    fn merge_fields_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = merge_args(dir.path(), Some(PolicyArg::MergeFields));

        let summary = run(&args, &Config::default()).unwrap();
        assert!(summary.written);
        assert_eq!((summary.report.added, summary.report.merged), (1, 1));

        let merged = read_json(&args.output).unwrap();
        assert_eq!(
            merged,
            json!({
                "version": "1.0",
                "dealers": [
                    {"name": "Ray", "tier": 2, "image": "ray.png"},
                    {"name": "Benji"}
                ]
            })
        );
    }

    #[test]
    fn falls_back_to_configured_policy() {
        let dir = tempfile::tempdir().unwrap();
        let args = merge_args(dir.path(), None);
        let config = Config {
            default_policy: ConflictPolicy::KeepExisting,
            ..Config::default()
        };

        let summary = run(&args, &config).unwrap();
        assert_eq!(summary.policy, ConflictPolicy::KeepExisting);
        assert_eq!(summary.report.kept, 1);
    }

    #[test]
    fn unreadable_incoming_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = merge_args(dir.path(), Some(PolicyArg::Overwrite));
        args.incoming.insert(0, dir.path().join("missing.json"));

        let summary = run(&args, &Config::default()).unwrap();
        assert!(summary.written);
        assert_eq!(summary.report.skipped_invalid, 1);
        assert_eq!(summary.report.errors[0].source, "missing.json");
        assert_eq!(summary.report.overwritten, 1);
    }
}

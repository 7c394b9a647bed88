//! Reconciling dealer collections by name.
//!
//! # Algorithm
//!
//! 1. Index the base dealers by name (last occurrence wins)
//! 2. Walk incoming dealers strictly in input order
//! 3. Append unknown names and index them, so a later dealer with the same
//!    name in the same batch conflicts with the one just added
//! 4. Resolve known names with the conflict policy
//! 5. Return a new collection and the report; the base is never mutated

use crate::{
    error::Result, Dealer, DealerCollection, DealerName, Error, LoadOutcome, Loader,
    ReconciliationReport, SourceDocument,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a name conflict is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictPolicy {
    /// Incoming dealer replaces the existing one (default)
    #[default]
    Overwrite,
    /// Existing dealer stays, incoming one is dropped
    KeepExisting,
    /// Incoming top-level keys are copied over the existing dealer
    MergeFields,
    /// Conflict is recorded as an error and the existing dealer stays
    Reject,
    /// A [`ConflictResolver`] decides each conflicting name
    PromptPerConflict,
}

/// Answer from a [`ConflictResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictDecision {
    Overwrite,
    Keep,
    /// Stop the whole merge; work done so far is kept
    Cancel,
}

/// Decides conflicts for [`ConflictPolicy::PromptPerConflict`].
///
/// Called synchronously and may block (e.g. waiting on a terminal prompt).
/// Each distinct name is asked about at most once per merge.
pub trait ConflictResolver {
    fn resolve(&mut self, name: &str) -> ConflictDecision;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&str) -> ConflictDecision,
{
    fn resolve(&mut self, name: &str) -> ConflictDecision {
        self(name)
    }
}

/// The reconciler folds incoming dealers into a copy of a base collection.
pub struct Reconciler<'r> {
    policy: ConflictPolicy,
    resolver: Option<&'r mut dyn ConflictResolver>,
    collection: DealerCollection,
    /// Name -> position in `collection.dealers`
    index: HashMap<DealerName, usize>,
    /// Answers already given by the resolver
    decisions: HashMap<DealerName, ConflictDecision>,
    report: ReconciliationReport,
}

impl<'r> Reconciler<'r> {
    /// Start a merge on top of `base`.
    pub fn new(base: &DealerCollection, policy: ConflictPolicy) -> Self {
        let collection = base.clone();
        let index = collection
            .dealers
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.name().map(|name| (name.to_string(), i)))
            .collect();

        Self {
            policy,
            resolver: None,
            collection,
            index,
            decisions: HashMap::new(),
            report: ReconciliationReport::new(),
        }
    }

    /// Attach the resolver used by [`ConflictPolicy::PromptPerConflict`].
    pub fn with_resolver(mut self, resolver: &'r mut dyn ConflictResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.report.cancelled
    }

    /// Merge one batch of incoming dealers.
    ///
    /// `source` labels errors as `source[i]`. Returns `Ok(false)` once the
    /// merge has been cancelled; later batches are then ignored.
    pub fn merge_batch(&mut self, source: &str, incoming: &[Dealer]) -> Result<bool> {
        self.check_resolver()?;

        for (i, dealer) in incoming.iter().enumerate() {
            if self.report.cancelled {
                break;
            }

            let Some(name) = dealer.name() else {
                self.report
                    .record_skipped(format!("{source}[{i}]"), Error::MissingName { index: i });
                continue;
            };

            match self.index.get(name).copied() {
                None => {
                    self.index
                        .insert(name.to_string(), self.collection.dealers.len());
                    self.collection.dealers.push(dealer.clone());
                    self.report.added += 1;
                }
                Some(existing) => self.resolve(format!("{source}[{i}]"), existing, dealer),
            }
        }

        Ok(!self.report.cancelled)
    }

    /// Merge several documents in order.
    ///
    /// Collections contribute their dealers, single-dealer documents
    /// contribute themselves. Invalid documents and rejected entries are
    /// recorded and skipped. Stops at the first cancel.
    pub fn merge_documents(&mut self, loader: &Loader, documents: Vec<SourceDocument>) -> Result<()> {
        self.check_resolver()?;
        for doc in documents {
            let incoming = match loader.load(doc.value) {
                LoadOutcome::Collection {
                    collection,
                    rejected,
                } => {
                    for err in rejected {
                        self.report.record_skipped(doc.source.clone(), err);
                    }
                    collection.dealers
                }
                LoadOutcome::SingleDealer(dealer) => vec![dealer],
                LoadOutcome::Invalid(err) => {
                    self.report.record_skipped(doc.source, err);
                    continue;
                }
            };

            if !self.merge_batch(&doc.source, &incoming)? {
                break;
            }
        }
        Ok(())
    }

    /// Finish and return the merged collection and report.
    pub fn finish(self) -> (DealerCollection, ReconciliationReport) {
        (self.collection, self.report)
    }

    fn check_resolver(&self) -> Result<()> {
        if self.policy == ConflictPolicy::PromptPerConflict && self.resolver.is_none() {
            return Err(Error::MissingResolver);
        }
        Ok(())
    }

    fn resolve(&mut self, source: String, existing: usize, incoming: &Dealer) {
        let decision = match self.policy {
            ConflictPolicy::Overwrite => ConflictDecision::Overwrite,
            ConflictPolicy::KeepExisting => ConflictDecision::Keep,
            ConflictPolicy::MergeFields => {
                self.collection.dealers[existing].merge_fields(incoming);
                self.report.merged += 1;
                return;
            }
            ConflictPolicy::Reject => {
                self.report.rejected += 1;
                self.report.record_error(
                    source,
                    Error::NameConflict {
                        name: name_of(incoming),
                    },
                );
                return;
            }
            ConflictPolicy::PromptPerConflict => self.ask(&name_of(incoming)),
        };

        match decision {
            ConflictDecision::Overwrite => {
                self.collection.dealers[existing] = incoming.clone();
                self.report.overwritten += 1;
            }
            ConflictDecision::Keep => {
                self.report.kept += 1;
            }
            ConflictDecision::Cancel => {
                self.report.cancelled = true;
                self.report.record_error(
                    source,
                    Error::UserCancelled {
                        name: name_of(incoming),
                    },
                );
            }
        }
    }

    fn ask(&mut self, name: &str) -> ConflictDecision {
        if let Some(decision) = self.decisions.get(name) {
            return *decision;
        }
        let decision = match self.resolver.as_mut() {
            Some(resolver) => resolver.resolve(name),
            // merge_batch refuses to start without a resolver
            None => ConflictDecision::Cancel,
        };
        self.decisions.insert(name.to_string(), decision);
        decision
    }
}

fn name_of(dealer: &Dealer) -> DealerName {
    dealer.name().unwrap_or_default().to_string()
}

/// Merge `incoming` into a copy of `base`.
///
/// Returns [`Error::MissingResolver`] for
/// [`ConflictPolicy::PromptPerConflict`]; use [`merge_with`] for that.
pub fn merge(
    base: &DealerCollection,
    incoming: &[Dealer],
    policy: ConflictPolicy,
) -> Result<(DealerCollection, ReconciliationReport)> {
    let mut reconciler = Reconciler::new(base, policy);
    reconciler.merge_batch("incoming", incoming)?;
    Ok(reconciler.finish())
}

/// Merge `incoming` into a copy of `base`, asking `resolver` on conflicts
/// when the policy is [`ConflictPolicy::PromptPerConflict`].
pub fn merge_with(
    base: &DealerCollection,
    incoming: &[Dealer],
    policy: ConflictPolicy,
    resolver: &mut dyn ConflictResolver,
) -> Result<(DealerCollection, ReconciliationReport)> {
    let mut reconciler = Reconciler::new(base, policy).with_resolver(resolver);
    reconciler.merge_batch("incoming", incoming)?;
    Ok(reconciler.finish())
}

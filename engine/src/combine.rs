//! Combining many dealer documents into one collection.
//!
//! The inverse of [`split`](crate::split()). There is no destination to
//! overwrite, so the first dealer seen under a name wins and later ones
//! are reported as duplicates.

use crate::{
    Dealer, DealerCollection, Error, LoadOutcome, Loader, ReconciliationReport, SourceDocument,
};
use std::collections::HashSet;

/// Combine documents with the default loader.
pub fn combine(
    documents: impl IntoIterator<Item = SourceDocument>,
) -> (DealerCollection, ReconciliationReport) {
    combine_with(&Loader::default(), documents)
}

/// Combine documents, validating dealers with `loader`.
pub fn combine_with(
    loader: &Loader,
    documents: impl IntoIterator<Item = SourceDocument>,
) -> (DealerCollection, ReconciliationReport) {
    let mut combiner = Combiner::new(loader);
    for doc in documents {
        combiner.add(doc);
    }
    combiner.finish()
}

/// Builds a combined collection one document at a time.
///
/// Report entries appear in the order documents are added or skipped.
pub struct Combiner<'l> {
    loader: &'l Loader,
    combined: DealerCollection,
    seen: HashSet<String>,
    report: ReconciliationReport,
}

impl<'l> Combiner<'l> {
    pub fn new(loader: &'l Loader) -> Self {
        Self {
            loader,
            combined: DealerCollection::default(),
            seen: HashSet::new(),
            report: ReconciliationReport::new(),
        }
    }

    /// Add one parsed document.
    pub fn add(&mut self, doc: SourceDocument) {
        match self.loader.load(doc.value) {
            LoadOutcome::SingleDealer(dealer) => self.accept(&doc.source, dealer),
            LoadOutcome::Collection {
                collection,
                rejected,
            } => {
                for err in rejected {
                    self.report.record_skipped(doc.source.clone(), err);
                }
                if self.combined.other_keys.is_empty() && !collection.other_keys.is_empty() {
                    self.combined.other_keys = collection.other_keys;
                }
                for dealer in collection.dealers {
                    self.accept(&doc.source, dealer);
                }
            }
            LoadOutcome::Invalid(err) => self.report.record_skipped(doc.source, err),
        }
    }

    /// Record a document that could not be parsed at all.
    pub fn skip(&mut self, source: impl Into<String>, error: Error) {
        self.report.record_skipped(source, error);
    }

    pub fn finish(self) -> (DealerCollection, ReconciliationReport) {
        (self.combined, self.report)
    }

    fn accept(&mut self, source: &str, dealer: Dealer) {
        // The loader only hands out named dealers
        let Some(name) = dealer.name() else {
            return;
        };

        if self.seen.insert(name.to_string()) {
            self.combined.dealers.push(dealer);
            self.report.added += 1;
        } else {
            self.report.record_skipped(
                source,
                Error::DuplicateName {
                    name: name.to_string(),
                },
            );
        }
    }
}

//! # Dealer Engine
//!
//! Merge, split and combine logic for mod dealer collections.
//!
//! A dealer collection is a JSON document holding a `dealers` list plus
//! global settings (version info, effect and product tables). Dealers are
//! identified by `name`; everything else about them is opaque and carried
//! through untouched, so the engine keeps working as the mod format evolves.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine takes and returns `serde_json::Value`s
//! - **Immutable inputs**: every operation returns a new collection
//! - **No throwing on bad data**: malformed documents and entries become
//!   report entries; only contract violations return `Err`
//!
//! ## Operations
//!
//! - [`merge`] / [`merge_with`] - fold incoming dealers into a base
//!   collection using a [`ConflictPolicy`]
//! - [`split()`] - one document per dealer, with filesystem-safe keys
//! - [`combine`] - many documents into one collection, first name wins
//!
//! ## Quick Start
//!
//! ```rust
//! use dealer_engine::{load, merge, ConflictPolicy, Dealer, LoadOutcome};
//! use serde_json::json;
//!
//! let LoadOutcome::Collection { collection: base, .. } = load(json!({
//!     "version": "1.0",
//!     "dealers": [{"name": "Ray", "tier": 1}]
//! })) else {
//!     panic!("not a collection");
//! };
//!
//! let incoming = vec![
//!     Dealer::from_value(json!({"name": "Ray", "tier": 2})).unwrap(),
//!     Dealer::from_value(json!({"name": "Uncle Nelson"})).unwrap(),
//! ];
//!
//! let (merged, report) = merge(&base, &incoming, ConflictPolicy::Overwrite).unwrap();
//! assert_eq!(merged.len(), 2);
//! assert_eq!((report.added, report.overwritten), (1, 1));
//! ```
//!
//! ## FFI
//!
//! The [`ffi`] module exposes the same operations to C callers. All data is
//! exchanged as JSON strings.

pub mod combine;
pub mod dealer;
pub mod error;
pub mod ffi;
pub mod loader;
pub mod reconcile;
pub mod report;
pub mod schema;
pub mod split;

// Re-export main types at crate root
pub use combine::{combine, combine_with, Combiner};
pub use dealer::{Dealer, DealerCollection, DEALERS_KEY, NAME_KEY};
pub use error::Error;
pub use loader::{load, load_str, LoadOutcome, Loader, SourceDocument};
pub use reconcile::{
    merge, merge_with, ConflictDecision, ConflictPolicy, ConflictResolver, Reconciler,
};
pub use report::{ReconciliationReport, ReportError};
pub use schema::{DealerSchema, FieldDef, FieldType};
pub use split::{
    renamed_key, sanitize_filename, split, split_document, SplitDocument, SplitMode, SplitOutput,
    SPLIT_FILE_SUFFIX, UNNAMED_DEALER,
};

/// Type alias for clarity
pub type DealerName = String;

//! Splitting a collection into one document per dealer.

use crate::{
    dealer::{json_type_name, DEALERS_KEY, NAME_KEY},
    error::Result,
    Dealer, DealerCollection, DealerName, Error,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Suffix of split dealer files; combine looks for it.
pub const SPLIT_FILE_SUFFIX: &str = "_dealer.json";

/// Key used when sanitizing leaves nothing.
pub const UNNAMED_DEALER: &str = "unnamed_dealer";

/// Longest filename key, in characters.
pub const MAX_KEY_CHARS: usize = 100;

const ILLEGAL_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|', '\''];

/// Turn a dealer name into a filesystem-safe key.
///
/// Strips `\ / * ? : " < > | '`, replaces spaces with underscores and
/// truncates to [`MAX_KEY_CHARS`] characters.
pub fn sanitize_filename(name: &str) -> String {
    let key: String = name
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(MAX_KEY_CHARS)
        .collect();

    if key.is_empty() {
        UNNAMED_DEALER.to_string()
    } else {
        key
    }
}

/// Suggest an alternative key for the `ordinal`-th dealer sharing `key`.
///
/// `renamed_key("Ray", 2)` is `Ray_2`.
pub fn renamed_key(key: &str, ordinal: usize) -> String {
    format!("{key}_{ordinal}")
}

/// Shape of each split document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitMode {
    /// The dealer object on its own
    #[default]
    Bare,
    /// The collection's other keys plus `"dealers": [dealer]`
    Wrapped,
}

/// One dealer ready to be written out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitDocument {
    /// Filesystem-safe key derived from the name
    pub key: String,
    /// Dealer name, or the `dealer_{index}` fallback
    pub name: DealerName,
    /// Suggested file name: `<key>_dealer.json`
    pub file_name: String,
    /// Position in the source collection
    pub index: usize,
    pub document: Value,
}

/// Result of splitting a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOutput {
    /// One document per dealer, in collection order
    pub documents: Vec<SplitDocument>,
    /// Keys produced by more than one dealer; nothing has been dropped
    pub collisions: Vec<Error>,
    /// Dealers that had no usable name and got a fallback
    pub errors: Vec<Error>,
}

impl SplitOutput {
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// Split a collection into one document per dealer.
pub fn split(collection: &DealerCollection, mode: SplitMode) -> SplitOutput {
    let positions: Vec<usize> = (0..collection.len()).collect();
    split_at(collection, &positions, mode)
}

/// Split a raw collection document.
///
/// Unlike [`split`] this does not go through the loader: dealers without a
/// usable name still get a document under the `dealer_{index}` fallback,
/// and entries that are not objects are listed first in `errors`. Indices
/// refer to positions in the document's `dealers` array. A single-dealer
/// document splits into one file.
pub fn split_document(value: Value, mode: SplitMode) -> Result<SplitOutput> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(Error::invalid(format!(
                "top-level value must be an object, got {}",
                json_type_name(&other)
            )))
        }
    };

    let entries = match object.remove(DEALERS_KEY) {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(Error::invalid(format!(
                "'{DEALERS_KEY}' must be a list, got {}",
                json_type_name(&other)
            )))
        }
        None if object.contains_key(NAME_KEY) => {
            let collection = DealerCollection::new(vec![Dealer::new(object)]);
            return Ok(split(&collection, mode));
        }
        None => {
            return Err(Error::invalid(format!(
                "document has neither '{DEALERS_KEY}' nor '{NAME_KEY}'"
            )))
        }
    };

    let mut dealers = Vec::with_capacity(entries.len());
    let mut positions = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(fields) => {
                dealers.push(Dealer::new(fields));
                positions.push(index);
            }
            other => rejected.push(Error::invalid(format!(
                "dealer at index {index} must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    let collection = DealerCollection::new(dealers).with_other_keys(object);
    let mut output = split_at(&collection, &positions, mode);
    output.errors.splice(0..0, rejected);
    Ok(output)
}

/// `positions[i]` is the source index reported for `collection.dealers[i]`.
fn split_at(collection: &DealerCollection, positions: &[usize], mode: SplitMode) -> SplitOutput {
    let mut output = SplitOutput::default();
    let mut by_key: BTreeMap<String, Vec<DealerName>> = BTreeMap::new();

    for (dealer, &index) in collection.dealers.iter().zip(positions) {
        let name = match dealer.name() {
            Some(name) => name.to_string(),
            None => {
                output.errors.push(Error::MissingName { index });
                format!("dealer_{index}")
            }
        };
        let key = sanitize_filename(&name);
        by_key.entry(key.clone()).or_default().push(name.clone());

        output.documents.push(SplitDocument {
            file_name: format!("{key}{SPLIT_FILE_SUFFIX}"),
            key,
            name,
            index,
            document: render(collection, dealer, mode),
        });
    }

    // Report in document order of first occurrence
    for doc in &output.documents {
        if let Some(names) = by_key.remove(&doc.key) {
            if names.len() > 1 {
                output.collisions.push(Error::FilenameCollision {
                    key: doc.key.clone(),
                    names,
                });
            }
        }
    }

    output
}

fn render(collection: &DealerCollection, dealer: &Dealer, mode: SplitMode) -> Value {
    match mode {
        SplitMode::Bare => dealer.clone().into_value(),
        SplitMode::Wrapped => {
            let mut doc = collection.other_keys.clone();
            doc.insert(
                DEALERS_KEY.to_string(),
                Value::Array(vec![dealer.clone().into_value()]),
            );
            Value::Object(doc)
        }
    }
}

//! Classifying parsed JSON documents.
//!
//! A document is either a dealer collection (`{"dealers": [...]}` plus any
//! global keys), a single dealer (`{"name": ...}`), or neither. Loading
//! never fails: malformed input becomes a typed outcome.

use crate::{
    dealer::{json_type_name, DEALERS_KEY, NAME_KEY},
    Dealer, DealerCollection, DealerSchema, Error,
};
use serde_json::{Map, Value};

/// What a parsed document turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A collection; entries that failed validation are listed in `rejected`
    /// and are not part of `collection`.
    Collection {
        collection: DealerCollection,
        rejected: Vec<Error>,
    },
    SingleDealer(Dealer),
    Invalid(Error),
}

impl LoadOutcome {
    pub fn is_invalid(&self) -> bool {
        matches!(self, LoadOutcome::Invalid(_))
    }
}

/// A parsed document and a label for where it came from (file name, index).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub source: String,
    pub value: Value,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>, value: Value) -> Self {
        Self {
            source: source.into(),
            value,
        }
    }
}

/// Document loader with optional key checks.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    schema: DealerSchema,
}

impl Loader {
    pub fn new(schema: DealerSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &DealerSchema {
        &self.schema
    }

    /// Classify a parsed JSON value.
    pub fn load(&self, value: Value) -> LoadOutcome {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return LoadOutcome::Invalid(Error::invalid(format!(
                    "top-level value must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        match object.remove(DEALERS_KEY) {
            Some(Value::Array(entries)) => {
                let (collection, rejected) = self.load_collection(entries, object);
                LoadOutcome::Collection {
                    collection,
                    rejected,
                }
            }
            Some(other) => LoadOutcome::Invalid(Error::invalid(format!(
                "'{DEALERS_KEY}' must be a list, got {}",
                json_type_name(&other)
            ))),
            None if object.contains_key(NAME_KEY) => {
                let dealer = Dealer::new(object);
                match self.validate(&dealer, 0) {
                    Ok(()) => LoadOutcome::SingleDealer(dealer),
                    Err(err) => LoadOutcome::Invalid(err),
                }
            }
            None => LoadOutcome::Invalid(Error::invalid(format!(
                "document has neither '{DEALERS_KEY}' nor '{NAME_KEY}'"
            ))),
        }
    }

    /// Parse and classify a JSON string. Parse failures are `Invalid`.
    pub fn load_str(&self, json: &str) -> LoadOutcome {
        match serde_json::from_str(json) {
            Ok(value) => self.load(value),
            Err(e) => LoadOutcome::Invalid(Error::invalid(format!("malformed JSON: {e}"))),
        }
    }

    fn load_collection(
        &self,
        entries: Vec<Value>,
        other_keys: Map<String, Value>,
    ) -> (DealerCollection, Vec<Error>) {
        let mut dealers = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let dealer = match entry {
                Value::Object(fields) => Dealer::new(fields),
                other => {
                    rejected.push(Error::invalid(format!(
                        "dealer at index {index} must be an object, got {}",
                        json_type_name(&other)
                    )));
                    continue;
                }
            };

            match self.validate(&dealer, index) {
                Ok(()) => dealers.push(dealer),
                Err(err) => rejected.push(err),
            }
        }

        (
            DealerCollection::new(dealers).with_other_keys(other_keys),
            rejected,
        )
    }

    fn validate(&self, dealer: &Dealer, index: usize) -> Result<(), Error> {
        if dealer.name().is_none() {
            return Err(Error::MissingName { index });
        }
        self.schema.validate(dealer)
    }
}

/// Classify a parsed JSON value with the default loader.
pub fn load(value: Value) -> LoadOutcome {
    Loader::default().load(value)
}

/// Parse and classify a JSON string with the default loader.
pub fn load_str(json: &str) -> LoadOutcome {
    Loader::default().load_str(json)
}

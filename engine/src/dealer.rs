//! Dealer records and dealer collections.

use crate::{error::Result, DealerName, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Top-level key holding the dealer list in a collection document.
pub const DEALERS_KEY: &str = "dealers";

/// Field used as the reconciliation key.
pub const NAME_KEY: &str = "name";

/// A single dealer record.
///
/// Only `name` has meaning to the engine. Every other field (drugs,
/// shipping, dialogue, unlock requirements, ...) is carried through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dealer {
    fields: Map<String, Value>,
}

impl Dealer {
    /// Wrap a JSON object as a dealer.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a dealer from an arbitrary JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::invalid(format!(
                "dealer must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// The reconciliation key: `name` when it is a non-empty string.
    pub fn name(&self) -> Option<&str> {
        match self.fields.get(NAME_KEY) {
            Some(Value::String(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Shallow merge: every top-level key of `other` replaces ours.
    pub fn merge_fields(&mut self, other: &Dealer) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Dealer> for Value {
    fn from(dealer: Dealer) -> Self {
        dealer.into_value()
    }
}

/// An ordered set of dealers plus the global settings that travel with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealerCollection {
    /// Dealers in document order
    pub dealers: Vec<Dealer>,
    /// Every top-level key other than `dealers`, in document order
    pub other_keys: Map<String, Value>,
}

impl DealerCollection {
    pub fn new(dealers: Vec<Dealer>) -> Self {
        Self {
            dealers,
            other_keys: Map::new(),
        }
    }

    pub fn with_other_keys(mut self, other_keys: Map<String, Value>) -> Self {
        self.other_keys = other_keys;
        self
    }

    pub fn len(&self) -> usize {
        self.dealers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dealers.is_empty()
    }

    /// Find a dealer by name. Returns the last match when names repeat.
    pub fn get(&self, name: &str) -> Option<&Dealer> {
        self.dealers.iter().rev().find(|d| d.name() == Some(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dealers.iter().filter_map(Dealer::name)
    }

    /// Names that occur more than once, in order of first repetition.
    pub fn duplicate_names(&self) -> Vec<DealerName> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for name in self.names() {
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(name.to_string());
            }
        }
        duplicates
    }

    /// Render as a collection document: other keys first, then `dealers`.
    pub fn to_value(&self) -> Value {
        let mut doc = self.other_keys.clone();
        doc.insert(
            DEALERS_KEY.to_string(),
            Value::Array(self.dealers.iter().cloned().map(Dealer::into_value).collect()),
        );
        Value::Object(doc)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

impl Serialize for DealerCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DealerCollection {
    /// Strict deserialization: the document must be a valid collection and
    /// every entry must carry a name. Use [`crate::load`] for lenient loading.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;

        let value = Value::deserialize(deserializer)?;
        match crate::load(value) {
            crate::LoadOutcome::Collection {
                collection,
                rejected,
            } => match rejected.into_iter().next() {
                None => Ok(collection),
                Some(err) => Err(D::Error::custom(err)),
            },
            crate::LoadOutcome::SingleDealer(_) => {
                Err(D::Error::custom("expected a collection, found a single dealer"))
            }
            crate::LoadOutcome::Invalid(err) => Err(D::Error::custom(err)),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dealer(value: Value) -> Dealer {
        Dealer::from_value(value).unwrap()
    }

    #[test]
    fn dealer_name() {
        assert_eq!(dealer(json!({"name": "Ray"})).name(), Some("Ray"));
        assert_eq!(dealer(json!({"name": ""})).name(), None);
        assert_eq!(dealer(json!({"name": 7})).name(), None);
        assert_eq!(dealer(json!({"image": "ray.png"})).name(), None);
    }

    #[test]
    fn dealer_rejects_non_object() {
        let err = Dealer::from_value(json!(["Ray"])).unwrap_err();
        assert_eq!(err, Error::invalid("dealer must be an object, got Array"));
    }

    #[test]
    fn merge_fields_is_shallow() {
        let mut base = dealer(json!({"name": "Ray", "drugs": [{"name": "weed"}], "tier": 1}));
        let other = dealer(json!({"name": "Ray", "drugs": [{"name": "meth"}]}));
        base.merge_fields(&other);

        assert_eq!(
            base.into_value(),
            json!({"name": "Ray", "drugs": [{"name": "meth"}], "tier": 1})
        );
    }

    #[test]
    fn collection_document_keeps_key_order() {
        let mut other = Map::new();
        other.insert("version".into(), json!(3));
        other.insert("effects".into(), json!(["Calming"]));
        let collection =
            DealerCollection::new(vec![dealer(json!({"name": "Ray"}))]).with_other_keys(other);

        let rendered = collection.to_json().unwrap();
        assert_eq!(
            rendered,
            r#"{"version":3,"effects":["Calming"],"dealers":[{"name":"Ray"}]}"#
        );
    }

    #[test]
    fn duplicate_names_reported_once() {
        let collection = DealerCollection::new(vec![
            dealer(json!({"name": "A"})),
            dealer(json!({"name": "B"})),
            dealer(json!({"name": "A", "x": 2})),
            dealer(json!({"name": "A", "x": 3})),
        ]);

        assert_eq!(collection.duplicate_names(), vec!["A".to_string()]);
        assert_eq!(collection.get("A").unwrap().get("x"), Some(&json!(3)));
    }

    #[test]
    fn serialization_roundtrip() {
        let doc = json!({"version": 1, "dealers": [{"name": "Ray", "tier": 2}]});
        let collection: DealerCollection = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(serde_json::to_value(&collection).unwrap(), doc);
    }

    #[test]
    fn strict_deserialize_rejects_nameless_entries() {
        let doc = json!({"dealers": [{"name": "Ray"}, {"tier": 2}]});
        assert!(serde_json::from_value::<DealerCollection>(doc).is_err());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw, loosely-typed document as the external store hands it over.
///
/// Field shapes are whatever the producing apps happened to write; the
/// normalizer in the `domain` crate is the only place they get pinned down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

use crate::{RawDocument, StoreError};
use serde_json::Value;

/// Comparison operator supported by the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// A conjunction of field conditions.
///
/// Only scalar comparisons are expressible; anything else is rejected at
/// call time with `StoreError::InvalidQuery` rather than silently
/// matching nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<FieldCondition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        self.conditions.push(FieldCondition {
            field: field.into(),
            op,
            value,
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: Value) -> Self {
        self.field(field, FilterOp::Eq, value)
    }

    pub fn conditions(&self) -> &[FieldCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Reject filters the store backend cannot express.
    pub fn validate(&self) -> Result<(), StoreError> {
        for cond in &self.conditions {
            if cond.field.is_empty() {
                return Err(StoreError::InvalidQuery(
                    "filter condition with empty field name".to_string(),
                ));
            }
            if cond.value.is_array() || cond.value.is_object() {
                return Err(StoreError::InvalidQuery(format!(
                    "non-scalar comparison value for field '{}'",
                    cond.field
                )));
            }
            if matches!(
                cond.op,
                FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte
            ) && !(cond.value.is_number() || cond.value.is_string())
            {
                return Err(StoreError::InvalidQuery(format!(
                    "ordering comparison on non-orderable value for field '{}'",
                    cond.field
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, doc: &RawDocument) -> bool {
        self.conditions.iter().all(|cond| {
            let actual = match doc.get(&cond.field) {
                Some(v) => v,
                None => return false,
            };
            match cond.op {
                FilterOp::Eq => actual == &cond.value,
                FilterOp::Ne => actual != &cond.value,
                FilterOp::Gt => compare(actual, &cond.value).is_some_and(|o| o.is_gt()),
                FilterOp::Gte => compare(actual, &cond.value).is_some_and(|o| o.is_ge()),
                FilterOp::Lt => compare(actual, &cond.value).is_some_and(|o| o.is_lt()),
                FilterOp::Lte => compare(actual, &cond.value).is_some_and(|o| o.is_le()),
            }
        })
    }

    /// Stable textual form used as part of cache keys.
    pub fn fingerprint(&self) -> String {
        let mut parts: Vec<String> = self
            .conditions
            .iter()
            .map(|c| format!("{}{:?}{}", c.field, c.op, c.value))
            .collect();
        parts.sort();
        parts.join("&")
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

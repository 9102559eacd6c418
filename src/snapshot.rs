//! Per-item field value snapshots and their per-call cache

use crate::error::Result;
use crate::showon::RawValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One stored custom field value of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    #[serde(rename = "rawvalue", default)]
    pub raw_value: RawValue,
}

impl FieldValue {
    pub fn new(name: &str, raw_value: RawValue) -> Self {
        Self {
            name: name.to_string(),
            raw_value,
        }
    }
}

/// The content item a form is being prepared for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemRef {
    #[serde(default)]
    pub id: Option<String>,
}

impl ItemRef {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
        }
    }

    /// Cache key; items without an identifier share the empty key
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}

/// Stored values of one item, keyed by declared field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFieldSnapshot {
    values: HashMap<String, RawValue>,
}

impl ItemFieldSnapshot {
    /// Pivot a value list by name. A repeated name keeps the last value.
    pub fn from_values(values: Vec<FieldValue>) -> Self {
        let values = values
            .into_iter()
            .map(|v| (v.name, v.raw_value))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Source of every stored field value of an item, regardless of the
/// current user's access level
#[cfg_attr(test, mockall::automock)]
pub trait ValueSnapshotProvider {
    fn field_values(&self, context: &str, item: &ItemRef) -> Result<Vec<FieldValue>>;
}

/// Snapshots loaded during one form preparation, keyed by item
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<String, ItemFieldSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot for `item`, loading it on first use
    pub fn get_or_load<P>(
        &mut self,
        provider: &P,
        context: &str,
        item: &ItemRef,
    ) -> Result<&ItemFieldSnapshot>
    where
        P: ValueSnapshotProvider + ?Sized,
    {
        let key = item.key().to_string();
        if !self.entries.contains_key(&key) {
            let values = provider.field_values(context, item)?;
            tracing::debug!(item = %key, count = values.len(), "loaded item field values");
            self.entries
                .insert(key.clone(), ItemFieldSnapshot::from_values(values));
        }
        Ok(&self.entries[&key])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Provider backed by a fixed list of values, as used by the demo host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticSnapshot {
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

impl ValueSnapshotProvider for StaticSnapshot {
    fn field_values(&self, _context: &str, _item: &ItemRef) -> Result<Vec<FieldValue>> {
        Ok(self.fields.clone())
    }
}

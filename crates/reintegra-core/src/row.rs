//! Single-record attribute rows.
//!
//! A row is an insertion-ordered mapping from column name to value. Known
//! survey headers are stored under their canonical English name; any other
//! key is kept verbatim. Rows convert to a one-row Arrow [`RecordBatch`],
//! the representation handed to classifiers.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::attribute::{Attribute, AttributeKind};
use crate::error::CoreError;

/// A single cell value.
///
/// Serialized untagged: JSON integers are counts, strings are categories,
/// `null` is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Count(i64),
    Category(String),
    /// Not applicable / not recorded.
    Missing,
}

impl AttributeValue {
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    fn kind(&self) -> Option<AttributeKind> {
        match self {
            Self::Count(_) => Some(AttributeKind::Count),
            Self::Category(_) => Some(AttributeKind::Category),
            Self::Missing => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Category(s) => f.write_str(s),
            Self::Missing => f.write_str("null"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Category(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Category(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Count(n)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

/// One survey record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRow {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a column, replacing any previous value in place.
    ///
    /// Survey headers are stored under their canonical name, so
    /// `"Sexo"` and `"Sex"` address the same column.
    pub fn insert(&mut self, key: &str, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
        let key = canonical_key(key);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        let key = canonical_key(key);
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get_attr(&self, attr: Attribute) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == attr.as_str())
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        let key = canonical_key(key);
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in row order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a one-row batch with one nullable column per entry, in row order.
    ///
    /// Counts become `Int64`, categories `Utf8`. A missing value takes the
    /// column type of its attribute (`Utf8` for unknown columns) and is null.
    pub fn to_record_batch(&self) -> Result<RecordBatch, CoreError> {
        let mut fields = Vec::with_capacity(self.entries.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.entries.len());

        for (key, value) in &self.entries {
            let kind = value.kind().unwrap_or_else(|| {
                Attribute::from_name(key).map_or(AttributeKind::Category, |a| a.kind())
            });
            match kind {
                AttributeKind::Count => {
                    fields.push(Field::new(key, DataType::Int64, true));
                    columns.push(Arc::new(Int64Array::from(vec![value.as_count()])));
                }
                AttributeKind::Category => {
                    fields.push(Field::new(key, DataType::Utf8, true));
                    columns.push(Arc::new(StringArray::from(vec![value.as_category()])));
                }
            }
        }

        let options = RecordBatchOptions::new().with_row_count(Some(1));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &options,
        )?)
    }
}

impl<K: AsRef<str>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v);
        }
        row
    }
}

fn canonical_key(key: &str) -> String {
    Attribute::from_name(key)
        .map(|a| a.as_str().to_string())
        .unwrap_or_else(|| key.to_string())
}

// ── Serde: a JSON object in row order ──

impl Serialize for AttributeRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = AttributeRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to string, integer, or null")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut row = AttributeRow::new();
                while let Some((key, value)) = access.next_entry::<String, AttributeValue>()? {
                    row.insert(&key, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Projection of rights records into flat, multi-valued search index documents.
//!
//! Every populated combination of access level and principal type becomes one field named
//! `<level>_access_<group|person>_<suffix>` holding the principal names. A set embargo release date
//! becomes `embargo_release_date_<suffix>`. Suffixes follow the index schema and are configured
//! with [`IndexConfig`].
use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::access::{AccessLevel, PrincipalType};
use crate::rights::RightsRecord;

/// Default suffix of multi-valued string fields.
pub const DEFAULT_MULTI_VALUED_SUFFIX: &str = "ssim";

/// Default suffix of date fields.
pub const DEFAULT_DATE_SUFFIX: &str = "dtsi";

/// Format of dates in index documents.
pub const INDEX_DATE_FORMAT: &str = "%Y-%m-%dT00:00:00Z";

/// Field naming of the search index schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Suffix of the multi-valued principal name fields.
    pub(crate) multi_valued_suffix: String,

    /// Suffix of the embargo release date field.
    pub(crate) date_suffix: String,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_multi_valued_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.multi_valued_suffix = suffix.into();
        self
    }

    pub fn with_date_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.date_suffix = suffix.into();
        self
    }

    pub fn multi_valued_suffix(&self) -> &str {
        &self.multi_valued_suffix
    }

    pub fn date_suffix(&self) -> &str {
        &self.date_suffix
    }

    /// Name of the field holding principals of `principal_type` at `access`.
    pub fn access_field(&self, access: AccessLevel, principal_type: PrincipalType) -> String {
        with_suffix(
            format!("{}_access_{}", access, principal_type.index_label()),
            &self.multi_valued_suffix,
        )
    }

    /// Name of the field holding the embargo release date.
    pub fn embargo_field(&self) -> String {
        with_suffix("embargo_release_date".to_string(), &self.date_suffix)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            multi_valued_suffix: DEFAULT_MULTI_VALUED_SUFFIX.to_string(),
            date_suffix: DEFAULT_DATE_SUFFIX.to_string(),
        }
    }
}

fn with_suffix(mut name: String, suffix: &str) -> String {
    if !suffix.is_empty() {
        name.push('_');
        name.push_str(suffix);
    }
    name
}

/// Value of an index document field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Single(String),
    Multiple(Vec<String>),
}

impl IndexValue {
    /// Number of values held by this field.
    pub fn len(&self) -> usize {
        match self {
            IndexValue::Single(_) => 1,
            IndexValue::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            IndexValue::Single(value) => Some(value),
            IndexValue::Multiple(_) => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            IndexValue::Single(_) => None,
            IndexValue::Multiple(values) => Some(values),
        }
    }
}

/// A flat key value map of index field names to values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDocument(BTreeMap<String, IndexValue>);

impl IndexDocument {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a field, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: IndexValue) -> Option<IndexValue> {
        self.0.insert(name.into(), value)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&IndexValue> {
        self.0.get(name)
    }

    /// Field names in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_, String, IndexValue> {
        self.0.iter()
    }

    /// Merge all fields of `other` into this document, replacing fields with the same name.
    pub fn merge(&mut self, other: IndexDocument) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for IndexDocument {
    type Item = (String, IndexValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, IndexValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Turns rights records into index documents.
#[derive(Clone, Debug, Default)]
pub struct IndexProjector {
    config: IndexConfig,
}

impl IndexProjector {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Flatten a record into an index document.
    ///
    /// Only populated (level, principal type) buckets produce a field, so the document holds one
    /// field per bucket plus one for the embargo release date if it is set.
    pub fn project(&self, record: &RightsRecord) -> IndexDocument {
        let mut document = IndexDocument::new();

        for principal_type in PrincipalType::ALL {
            let mut buckets: BTreeMap<AccessLevel, Vec<String>> = BTreeMap::new();
            for (name, access) in record.principals(principal_type) {
                buckets.entry(*access).or_default().push(name.to_owned());
            }

            for (access, names) in buckets {
                document.insert(
                    self.config.access_field(access, principal_type),
                    IndexValue::Multiple(names),
                );
            }
        }

        if let Some(date) = record.embargo_release_date() {
            document.insert(
                self.config.embargo_field(),
                IndexValue::Single(date.format(INDEX_DATE_FORMAT).to_string()),
            );
        }

        debug!(fields = document.len(), "projected rights record");

        document
    }
}

impl RightsRecord {
    /// Index document with the default field naming.
    pub fn to_solr(&self) -> IndexDocument {
        IndexProjector::default().project(self)
    }

    /// Index document with custom field naming.
    pub fn to_index_document(&self, config: &IndexConfig) -> IndexDocument {
        IndexProjector::new(config.clone()).project(self)
    }
}

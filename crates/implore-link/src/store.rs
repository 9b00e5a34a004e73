//! Entity records and the per-load record store
//!
//! The store is built once per dataset load and is read-only afterwards.
//! Besides the records themselves it keeps an id index and a summary of
//! every attribute (numeric or categorical, extent, missing count), which
//! the filter layer uses to decide which attributes carry a numeric scale.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{LinkError, LinkResult};
use crate::value::Value;

/// Stable record identifier, assigned once at load time
pub type EntityId = u64;

static MISSING: Value = Value::Missing;

/// One catalogue item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: EntityId,
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    /// Create a record with no attributes
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute; absent attributes read as [`Value::Missing`]
    pub fn get(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&MISSING)
    }
}

/// Whether an attribute has a numeric scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Numeric,
    Categorical,
}

/// Schema information gathered for one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSummary {
    pub name: String,
    pub kind: AttributeKind,
    /// Min and max over the values that coerce to numbers
    pub extent: Option<(f64, f64)>,
    /// Records with a value, per [`Value::has_value`]
    pub present: usize,
    /// Records whose value is missing or blank text; these are the records
    /// a `RequireMissing` filter selects
    pub missing: usize,
}

impl AttributeSummary {
    pub fn is_numeric(&self) -> bool {
        self.kind == AttributeKind::Numeric
    }
}

/// Immutable set of records for one filtering pass
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    records: Vec<Record>,
    index: HashMap<EntityId, usize>,
    attributes: BTreeMap<String, AttributeSummary>,
}

impl EntityStore {
    /// Build a store, rejecting duplicate ids
    pub fn new(records: Vec<Record>) -> LinkResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if index.insert(record.id, pos).is_some() {
                return Err(LinkError::DuplicateId { id: record.id });
            }
        }

        let attributes = summarize(&records);
        tracing::info!(
            records = records.len(),
            attributes = attributes.len(),
            "Loaded entity store"
        );

        Ok(Self {
            records,
            index,
            attributes,
        })
    }

    /// Build a store from attribute rows, assigning ids by row position
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = BTreeMap<String, Value>>,
    {
        let records: Vec<Record> = rows
            .into_iter()
            .enumerate()
            .map(|(i, attributes)| Record {
                id: i as EntityId,
                attributes,
            })
            .collect();

        let index = records
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.id, pos))
            .collect();
        let attributes = summarize(&records);

        Self {
            records,
            index,
            attributes,
        }
    }

    /// Get a record by id
    pub fn get(&self, id: EntityId) -> Option<&Record> {
        self.index.get(&id).map(|&pos| &self.records[pos])
    }

    /// All records in load order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record ids in load order
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summary for one attribute
    pub fn attribute(&self, name: &str) -> Option<&AttributeSummary> {
        self.attributes.get(name)
    }

    /// All attribute summaries, keyed by name
    pub fn attributes(&self) -> &BTreeMap<String, AttributeSummary> {
        &self.attributes
    }

    /// Attribute names in sorted order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    /// Check whether an attribute has a numeric scale
    pub fn is_numeric(&self, name: &str) -> bool {
        self.attribute(name).is_some_and(AttributeSummary::is_numeric)
    }

    /// Records whose id is in `ids`, in load order
    pub fn restricted_to<'a>(&'a self, ids: &'a BTreeSet<EntityId>) -> Vec<&'a Record> {
        self.records.iter().filter(|r| ids.contains(&r.id)).collect()
    }
}

fn summarize(records: &[Record]) -> BTreeMap<String, AttributeSummary> {
    let names: BTreeSet<&String> = records.iter().flat_map(|r| r.attributes.keys()).collect();

    names
        .into_iter()
        .map(|name| {
            let mut present = 0;
            let mut all_numeric = true;
            let mut extent: Option<(f64, f64)> = None;

            for record in records {
                let value = record.get(name);
                if !value.has_value() {
                    continue;
                }
                present += 1;
                match value.as_number() {
                    Some(n) => {
                        extent = Some(match extent {
                            Some((lo, hi)) => (lo.min(n), hi.max(n)),
                            None => (n, n),
                        });
                    }
                    None => all_numeric = false,
                }
            }

            let kind = if present > 0 && all_numeric {
                AttributeKind::Numeric
            } else {
                AttributeKind::Categorical
            };

            let summary = AttributeSummary {
                name: name.clone(),
                kind,
                extent,
                present,
                missing: records.len() - present,
            };
            (name.clone(), summary)
        })
        .collect()
}

//! Metadata types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema and description of one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    /// Dataset name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// When the rows were last updated (sent as Unix epoch seconds)
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub rows_updated_at: Option<DateTime<Utc>>,
    /// Column definitions
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
}

impl DatasetMetadata {
    /// Find a column by its field name
    pub fn column(&self, field_name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.field_name == field_name)
    }

    /// Check whether a column exists
    pub fn has_column(&self, field_name: &str) -> bool {
        self.column(field_name).is_some()
    }

    /// Field names, in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field_name.as_str())
    }
}

/// One column of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// API field name, as used in SoQL clauses
    pub field_name: String,
    /// Service data type (e.g. `text`, `number`, `calendar_date`, `point`)
    pub data_type_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One page of catalog search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<CatalogResult>,
    /// Total matches across all pages
    #[serde(default)]
    pub result_set_size: u64,
}

/// A single catalog hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogResult {
    pub resource: CatalogResource,
    #[serde(default)]
    pub permalink: Option<String>,
}

/// The dataset a catalog hit points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResource {
    /// Dataset identifier, usable with `query`/`paginate`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

//! Schema introspection seam.
//!
//! The coalesce generator only needs one capability from the warehouse: the
//! ordered column names of a table, minus a set of excluded names. Anything
//! that can answer that question implements [`SchemaIntrospector`].

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::IntrospectError;

/// One row of an introspection result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub column_name: String,
}

impl ColumnRecord {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
        }
    }
}

pub trait SchemaIntrospector: Send + Sync {
    /// List the columns of `table` in schema order, leaving out any column
    /// whose name is in `excluding`.
    fn list_columns(
        &self,
        table: &str,
        excluding: &[&str],
    ) -> impl Future<Output = Result<Vec<ColumnRecord>, IntrospectError>> + Send;
}

impl<T: SchemaIntrospector> SchemaIntrospector for &T {
    fn list_columns(
        &self,
        table: &str,
        excluding: &[&str],
    ) -> impl Future<Output = Result<Vec<ColumnRecord>, IntrospectError>> + Send {
        (**self).list_columns(table, excluding)
    }
}

/// In-memory schema catalog.
///
/// Used for offline generation from a schema file, and as a stand-in for the
/// warehouse in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIntrospector {
    tables: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    tables: HashMap<String, Vec<String>>,
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_table(table, columns);
        self
    }

    pub fn insert_table<I, S>(&mut self, table: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
    }

    /// Parse a TOML schema description:
    ///
    /// ```toml
    /// [tables]
    /// staging_stats_table = ["player_", "minutes", "tackles_tkl"]
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SchemaFile = toml::from_str(content).context("Invalid schema file")?;
        Ok(Self { tables: file.tables })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

impl SchemaIntrospector for StaticIntrospector {
    async fn list_columns(
        &self,
        table: &str,
        excluding: &[&str],
    ) -> Result<Vec<ColumnRecord>, IntrospectError> {
        let columns = self
            .tables
            .get(table)
            .ok_or_else(|| IntrospectError::TableNotFound {
                table: table.to_string(),
            })?;

        Ok(columns
            .iter()
            .filter(|c| !excluding.contains(&c.as_str()))
            .map(ColumnRecord::new)
            .collect())
    }
}

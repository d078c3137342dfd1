//! Static catalog of log-type schemas and their categories.
//!
//! The catalog is loaded once at startup (embedded JSON by default, or a
//! user-supplied file) and never mutated afterwards. Everything the graph
//! and the panels show is derived from it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

const EMBEDDED_CATALOG: &str = include_str!("../../assets/catalog.json");

/// Display style driver for a field. Unknown strings in the catalog JSON
/// degrade to `Other` instead of failing deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Time,
    String,
    Addr,
    Port,
    Count,
    Bool,
    Interval,
    Enum,
    Vector,
    Set,
    Record,
    #[serde(other)]
    Other,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::String => "string",
            Self::Addr => "addr",
            Self::Port => "port",
            Self::Count => "count",
            Self::Bool => "bool",
            Self::Interval => "interval",
            Self::Enum => "enum",
            Self::Vector => "vector",
            Self::Set => "set",
            Self::Record => "record",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub description: String,
    pub optional: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogType {
    pub id: String,
    pub name: String,
    pub category: String,
    pub color: [u8; 3],
    pub description: String,
    pub related_logs: Vec<String>,
    #[serde(default)]
    pub example: String,
    pub fields: Vec<Field>,
}

impl LogType {
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub fn has_field_containing(&self, fragment: &str) -> bool {
        self.fields.iter().any(|field| field.name.contains(fragment))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: [u8; 3],
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub log_types: Vec<LogType>,
    #[serde(skip)]
    log_index: HashMap<String, usize>,
    #[serde(skip)]
    category_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_json(EMBEDDED_CATALOG).context("embedded catalog is invalid")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("failed to parse catalog file {}", path.display()))
    }

    fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut catalog: Catalog = serde_json::from_str(raw)?;
        catalog.log_index = catalog
            .log_types
            .iter()
            .enumerate()
            .map(|(index, log)| (log.id.clone(), index))
            .collect();
        catalog.category_index = catalog
            .categories
            .iter()
            .enumerate()
            .map(|(index, category)| (category.id.clone(), index))
            .collect();
        catalog.warn_on_dangling_references();
        Ok(catalog)
    }

    /// Dangling references are tolerated everywhere downstream; they are
    /// only reported once here so a broken custom catalog is diagnosable.
    fn warn_on_dangling_references(&self) {
        for log in &self.log_types {
            if !self.category_index.contains_key(&log.category) {
                log::warn!(
                    "log type '{}' references unknown category '{}'; using fallback style",
                    log.id,
                    log.category
                );
            }
            for related in &log.related_logs {
                if !self.log_index.contains_key(related) {
                    log::warn!(
                        "log type '{}' lists unknown related log '{}'; ignoring",
                        log.id,
                        related
                    );
                }
            }
        }
    }

    pub fn log_type(&self, id: &str) -> Option<&LogType> {
        self.log_index.get(id).map(|&index| &self.log_types[index])
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index
            .get(id)
            .map(|&index| &self.categories[index])
    }

    pub fn log_count(&self) -> usize {
        self.log_types.len()
    }

    /// True if the two log types declare a relationship in either
    /// direction. Consumers treat `related_logs` as symmetric.
    pub fn related(&self, a: &str, b: &str) -> bool {
        let listed = |from: &str, to: &str| {
            self.log_type(from)
                .is_some_and(|log| log.related_logs.iter().any(|id| id == to))
        };
        listed(a, b) || listed(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_parses() {
        let catalog = Catalog::embedded().expect("embedded catalog");
        assert!(catalog.log_count() >= 10);
        assert!(!catalog.categories.is_empty());
    }

    #[test]
    fn every_category_reference_resolves() {
        let catalog = Catalog::embedded().expect("embedded catalog");
        for log in &catalog.log_types {
            assert!(
                catalog.category(&log.category).is_some(),
                "log type '{}' has dangling category '{}'",
                log.id,
                log.category
            );
        }
    }

    #[test]
    fn relationships_are_symmetric_for_consumers() {
        let catalog = Catalog::embedded().expect("embedded catalog");
        // dns lists conn but conn also lists dns; either is enough.
        assert!(catalog.related("conn", "dns"));
        assert!(catalog.related("dns", "conn"));
        assert!(!catalog.related("dns", "x509"));
    }

    #[test]
    fn unknown_field_kind_degrades_to_other() {
        let field: Field = serde_json::from_str(
            r#"{"name":"f","kind":"subnet","description":"","optional":false}"#,
        )
        .expect("field with unknown kind");
        assert_eq!(field.kind, FieldKind::Other);
    }

    #[test]
    fn conn_fields_cover_the_pivot_predicates() {
        let catalog = Catalog::embedded().expect("embedded catalog");
        let conn = catalog.log_type("conn").expect("conn present");
        assert!(conn.has_field("uid"));
        assert!(conn.has_field_containing("id.orig_h"));
        assert!(conn.has_field_containing("id.resp_h"));
    }
}

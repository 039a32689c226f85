use crate::catalog::SchemaCatalog;
use crate::error::{Error, Result};
use crate::record::Record;
use std::collections::BTreeMap;

/// Table name to template record, built from the catalog.
///
/// Loading takes `&mut self`, so there is a single writer and nobody can
/// read a map that is still being filled.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: Option<BTreeMap<String, Record>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the registry from the catalog.
    ///
    /// Stops at the first table whose columns cannot be read. Tables stored
    /// before the failure stay in the registry, the error names the table
    /// that failed.
    pub async fn load<C: SchemaCatalog + ?Sized>(&mut self, catalog: &C) -> Result<()> {
        let tables = self.tables.get_or_insert_with(BTreeMap::new);

        let names = catalog
            .list_tables()
            .await
            .map_err(|e| Error::CatalogListing(Box::new(e)))?;
        tracing::info!(count = names.len(), "loading table schemas");

        for name in names {
            let schema = match catalog.columns_of(&name).await {
                Ok(schema) => schema,
                Err(e) => {
                    tracing::warn!(
                        table = %name,
                        loaded = tables.len(),
                        error = %e,
                        "catalog load stopped"
                    );
                    return Err(Error::Catalog {
                        table: name,
                        source: Box::new(e),
                    });
                }
            };
            tracing::debug!(table = %name, columns = schema.len(), "table loaded");
            tables.insert(name.clone(), Record::template(name, schema));
        }
        Ok(())
    }

    /// Rebuilds the registry from scratch, replacing it only if every table
    /// loads.
    pub async fn reload<C: SchemaCatalog + ?Sized>(&mut self, catalog: &C) -> Result<()> {
        let mut fresh = TableRegistry::new();
        fresh.load(catalog).await?;
        self.tables = fresh.tables;
        Ok(())
    }

    pub fn get(&self, table: &str) -> Option<&Record> {
        self.tables.as_ref()?.get(table)
    }

    pub fn all(&self) -> Vec<&Record> {
        self.tables
            .as_ref()
            .map(|t| t.values().collect())
            .unwrap_or_default()
    }

    /// Table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .as_ref()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tables.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loaded(&self) -> bool {
        self.tables.is_some()
    }
}

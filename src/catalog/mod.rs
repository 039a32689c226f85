use crate::db::{SqlExecutor, TextRow, sql};
use crate::error::{Error, Result};
use crate::record::Schema;
use async_trait::async_trait;

/// Discovers the structure of a database, never its data.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Table names in the catalog's namespace, in no particular order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column name to type name for one table.
    ///
    /// A table that exists but exposes no columns yields an empty schema;
    /// a table that does not exist is [`Error::UnknownTable`].
    async fn columns_of(&self, table: &str) -> Result<Schema>;
}

/// Reads `information_schema` through any executor.
pub struct InformationSchemaCatalog<'a, E: SqlExecutor> {
    executor: &'a E,
    namespace: String,
}

impl<'a, E: SqlExecutor> InformationSchemaCatalog<'a, E> {
    pub fn new(executor: &'a E, namespace: impl Into<String>) -> Self {
        InformationSchemaCatalog {
            executor,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

fn text_at(row: &TextRow, index: usize) -> Option<String> {
    row.get(index).and_then(|(_, value)| value.clone())
}

#[async_trait]
impl<'a, E: SqlExecutor> SchemaCatalog for InformationSchemaCatalog<'a, E> {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self
            .executor
            .query(sql::LIST_TABLES, &[Some(self.namespace.clone())])
            .await?;
        Ok(rows.iter().filter_map(|row| text_at(row, 0)).collect())
    }

    async fn columns_of(&self, table: &str) -> Result<Schema> {
        let params = [Some(self.namespace.clone()), Some(table.to_string())];
        let rows = self.executor.query(sql::TABLE_COLUMNS, &params).await?;

        let mut schema = Schema::new();
        for row in &rows {
            if let (Some(name), Some(type_name)) = (text_at(row, 0), text_at(row, 1)) {
                schema.insert(name, type_name);
            }
        }

        if schema.is_empty() {
            let exists = self.executor.query(sql::TABLE_EXISTS, &params).await?;
            if exists.is_empty() {
                return Err(Error::UnknownTable(table.to_string()));
            }
            tracing::debug!(table, "table has no visible columns");
        }
        Ok(schema)
    }
}

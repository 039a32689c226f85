//! PostgreSQL access.
//!
//! Every statement the crate issues goes through [`SqlExecutor`]: parameters
//! are passed as text (or NULL) and every returned column is read back as
//! text. Type conversion happens on the server through explicit casts, so
//! the executor never needs to know the shape of a table.

pub mod sql;

#[cfg(test)]
pub(crate) mod scripted;

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls};

/// One result row: column names paired with their text rendering.
pub type TextRow = Vec<(String, Option<String>)>;

#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a statement that returns rows.
    async fn query(&self, sql: &str, params: &[Option<String>]) -> Result<Vec<TextRow>>;

    /// Runs a statement and returns the number of rows it affected.
    async fn execute(&self, sql: &str, params: &[Option<String>]) -> Result<u64>;
}

#[derive(Debug)]
pub struct DatabaseConnection {
    pub client: Client,
    timeout: Option<Duration>,
}

impl DatabaseConnection {
    pub async fn connect(
        host: &str,
        port: u16,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<DatabaseConnection> {
        let mut config = Config::new();
        config
            .host(host)
            .port(port)
            .dbname(database)
            .user(username)
            .password(password);

        match config.connect(NoTls).await {
            Ok((client, connection)) => {
                // The connection object performs the actual communication with the database,
                // so spawn it off to run on its own.
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(error = %e, "database connection closed with error");
                    }
                });

                tracing::info!(host, port, database, "connected");
                Ok(DatabaseConnection {
                    client,
                    timeout: None,
                })
            }
            Err(e) => {
                tracing::warn!(host, port, database, error = %e, "connection failed");
                Err(Error::Connection(e.to_string()))
            }
        }
    }

    /// Bounds every statement issued through this connection.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> DatabaseConnection {
        self.timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, tokio_postgres::Error>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::Timeout(limit))?
                .map_err(Error::from),
            None => fut.await.map_err(Error::from),
        }
    }
}

fn as_params(params: &[Option<String>]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

#[async_trait]
impl SqlExecutor for DatabaseConnection {
    async fn query(&self, sql: &str, params: &[Option<String>]) -> Result<Vec<TextRow>> {
        tracing::debug!(sql, params = params.len(), "query");
        let rows = self.bounded(self.client.query(sql, &as_params(params))).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut text_row = Vec::with_capacity(row.len());
            for (i, column) in row.columns().iter().enumerate() {
                let value: Option<String> = row.try_get(i)?;
                text_row.push((column.name().to_string(), value));
            }
            out.push(text_row);
        }
        Ok(out)
    }

    async fn execute(&self, sql: &str, params: &[Option<String>]) -> Result<u64> {
        tracing::debug!(sql, params = params.len(), "execute");
        self.bounded(self.client.execute(sql, &as_params(params))).await
    }
}

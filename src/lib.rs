//! # Schemata CLI
//!
//! Schemata CLI connects to a PostgreSQL database, discovers its tables and
//! their column types at runtime, and lets you browse and edit rows from a
//! terminal UI without any compile-time knowledge of the schema.
//!
//! ## How it fits together
//!
//! - [`catalog`] reads table names and column types from `information_schema`
//! - [`registry`] keeps one template [`Record`] per table, loaded at startup
//! - [`store`] reads, creates, updates and deletes rows of any table by name
//! - [`record`] is the schema-tagged row every table shares
//!
//! ```ignore
//! let conn = DatabaseConnection::connect("localhost", 5432, "blog", "ada", "pw").await?;
//! let mut registry = TableRegistry::new();
//! registry.load(&InformationSchemaCatalog::new(&conn, "public")).await?;
//!
//! let store = GenericStore::new(&conn, &registry, "public");
//! let mut user = registry.get("users").unwrap().clone();
//! user.set("name", "ada")?;
//! let created = store.create("users", &user).await?;
//! store.delete("users", created.identity().unwrap()).await?;
//! ```
//!
//! ## Modules
//!
//! - `config`: saved connections and layered settings
//! - `db`: PostgreSQL connection and statement text
//! - `logging`: file-backed tracing subscriber
//! - `tui`: table browser

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod record;
pub mod registry;
pub mod store;
pub mod tui;

pub use catalog::{InformationSchemaCatalog, SchemaCatalog};
pub use db::{DatabaseConnection, SqlExecutor};
pub use error::{Error, Result};
pub use record::{Record, RowLike, Value};
pub use registry::TableRegistry;
pub use store::GenericStore;

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the catalog, registry and record store.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The database could not be reached
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    /// A metadata or DML statement was rejected by the server
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("No row with id {id} in table {table}")]
    NotFound { table: String, id: String },

    /// More than one row carries the same identity
    #[error("Identity {id} is not unique in table {table}")]
    DuplicateIdentity { table: String, id: String },

    /// The caller supplied a record or filter that does not fit the table
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Failed to list tables: {0}")]
    CatalogListing(#[source] Box<Error>),

    #[error("Failed to load schema for table {table}: {source}")]
    Catalog {
        table: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// True for "this does not exist" outcomes, as opposed to system failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::UnknownTable(_))
    }
}

impl From<tokio_postgres::Error> for Error {
    fn from(e: tokio_postgres::Error) -> Self {
        // The server message lives on the DbError, Display alone only says "db error"
        match e.as_db_error() {
            Some(db) => Error::Query(format!("{} ({})", db.message(), db.code().code())),
            None => Error::Query(e.to_string()),
        }
    }
}

//! Statement text for the catalog and the record store.
//!
//! Identifiers are always double-quoted. Values are bound as text parameters
//! and cast on the server (`$1::text::integer`), which lets one code path
//! write to columns of any type, including ones with no Rust counterpart.

use crate::record::{Fields, IDENTITY_COLUMN, Schema, Value};

pub const LIST_TABLES: &str = "SELECT table_name::text AS table_name \
     FROM information_schema.tables \
     WHERE table_schema = $1::text";

// USER-DEFINED and ARRAY are not castable names. The underlying type is
// spelled "schema"."name" so it resolves whatever the search_path is.
pub const TABLE_COLUMNS: &str = "SELECT column_name::text AS column_name, \
            CASE WHEN data_type IN ('USER-DEFINED', 'ARRAY') \
                 THEN '\"' || replace(udt_schema::text, '\"', '\"\"') || '\".\"' \
                      || replace(udt_name::text, '\"', '\"\"') || '\"' \
                 ELSE data_type::text \
            END AS column_type \
     FROM information_schema.columns \
     WHERE table_schema = $1::text AND table_name = $2::text \
     ORDER BY ordinal_position";

pub const TABLE_EXISTS: &str = "SELECT table_name::text AS table_name \
     FROM information_schema.tables \
     WHERE table_schema = $1::text AND table_name = $2::text";

/// A statement with its text parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Option<String>>,
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// True for one or more double-quoted identifiers joined by dots, such as
/// `"app"."level"`.
fn is_quoted_path(name: &str) -> bool {
    let mut chars = name.chars().peekable();
    loop {
        if chars.next() != Some('"') {
            return false;
        }
        let mut empty = true;
        loop {
            match chars.next() {
                None => return false,
                Some('"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    empty = false;
                }
                Some('"') => break,
                Some(_) => empty = false,
            }
        }
        if empty {
            return false;
        }
        match chars.next() {
            None => return true,
            Some('.') => continue,
            Some(_) => return false,
        }
    }
}

/// Spells a catalog type name so it can follow `::`.
///
/// Built-in names such as `character varying` are keywords and must stay
/// unquoted, and schema-qualified names from the catalog are already quoted.
/// Anything else is quoted like an identifier.
pub fn cast_target(type_name: &str) -> String {
    if is_quoted_path(type_name) {
        return type_name.to_string();
    }
    let plain = type_name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && type_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == ' ');
    if plain {
        type_name.to_string()
    } else {
        quote_ident(type_name)
    }
}

fn qualified(namespace: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(namespace), quote_ident(table))
}

fn select_list(schema: &Schema) -> String {
    if schema.is_empty() {
        // Still need a row per match to count it
        return "NULL::text AS \"?column?\"".to_string();
    }
    schema
        .keys()
        .map(|column| {
            let quoted = quote_ident(column);
            format!("{}::text AS {}", quoted, quoted)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

struct Binder<'a> {
    schema: &'a Schema,
    params: Vec<Option<String>>,
}

impl<'a> Binder<'a> {
    fn new(schema: &'a Schema) -> Self {
        Binder {
            schema,
            params: Vec::new(),
        }
    }

    /// Adds a parameter and returns its placeholder cast to the column type.
    fn bind(&mut self, column: &str, value: &Value) -> String {
        self.params.push(value.to_sql_text());
        let type_name = self.schema.get(column).map(String::as_str).unwrap_or("text");
        format!("${}::text::{}", self.params.len(), cast_target(type_name))
    }

    fn predicate(&mut self, column: &str, value: &Value) -> String {
        if value.is_null() {
            format!("{} IS NULL", quote_ident(column))
        } else {
            let placeholder = self.bind(column, value);
            format!("{} = {}", quote_ident(column), placeholder)
        }
    }

    fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            params: self.params,
        }
    }
}

pub fn select(namespace: &str, table: &str, schema: &Schema, filter: &Fields) -> Statement {
    let mut binder = Binder::new(schema);
    let mut sql = format!(
        "SELECT {} FROM {}",
        select_list(schema),
        qualified(namespace, table)
    );
    if !filter.is_empty() {
        let predicates: Vec<String> = filter
            .iter()
            .map(|(column, value)| binder.predicate(column, value))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    binder.finish(sql)
}

/// Fetches at most two rows so a duplicated identity can be told apart.
pub fn select_by_id(namespace: &str, table: &str, schema: &Schema, id: &Value) -> Statement {
    let mut binder = Binder::new(schema);
    let placeholder = binder.bind(IDENTITY_COLUMN, id);
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = {} LIMIT 2",
        select_list(schema),
        qualified(namespace, table),
        quote_ident(IDENTITY_COLUMN),
        placeholder
    );
    binder.finish(sql)
}

pub fn insert(namespace: &str, table: &str, schema: &Schema, fields: &Fields) -> Statement {
    let mut binder = Binder::new(schema);
    let target = qualified(namespace, table);
    let sql = if fields.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            target,
            select_list(schema)
        )
    } else {
        let columns: Vec<String> = fields.keys().map(|c| quote_ident(c)).collect();
        let values: Vec<String> = fields.iter().map(|(c, v)| binder.bind(c, v)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            target,
            columns.join(", "),
            values.join(", "),
            select_list(schema)
        )
    };
    binder.finish(sql)
}

/// Sets every non-identity field on the row with the given identity.
pub fn update(
    namespace: &str,
    table: &str,
    schema: &Schema,
    fields: &Fields,
    id: &Value,
) -> Statement {
    let mut binder = Binder::new(schema);
    let id_column = quote_ident(IDENTITY_COLUMN);
    let mut assignments: Vec<String> = fields
        .iter()
        .filter(|(column, _)| column.as_str() != IDENTITY_COLUMN)
        .map(|(column, value)| format!("{} = {}", quote_ident(column), binder.bind(column, value)))
        .collect();
    if assignments.is_empty() {
        // Nothing to change, but the statement still has to report whether the row exists
        assignments.push(format!("{} = {}", id_column, id_column));
    }
    let placeholder = binder.bind(IDENTITY_COLUMN, id);
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified(namespace, table),
        assignments.join(", "),
        id_column,
        placeholder,
        select_list(schema)
    );
    binder.finish(sql)
}

pub fn delete(namespace: &str, table: &str, schema: &Schema, id: &Value) -> Statement {
    let mut binder = Binder::new(schema);
    let placeholder = binder.bind(IDENTITY_COLUMN, id);
    let sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified(namespace, table),
        quote_ident(IDENTITY_COLUMN),
        placeholder
    );
    binder.finish(sql)
}

//! Plumbing shared by the per-entity modules: constraint mapping, existence
//! checks, the delete policy, partial updates, and row collection.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, OptionalExtension, Params, Row};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Coerce SQLite constraint errors into [`Error::Integrity`] with a message
/// describing the rule that was broken. Every other error passes through.
pub(crate) fn map_constraint(err: rusqlite::Error, describe: impl FnOnce() -> String) -> Error {
    if matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
        Error::Integrity(describe())
    } else {
        err.into()
    }
}

pub(crate) fn exists(conn: &Connection, table: &'static str, id: i64) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
    Ok(conn.query_row(&sql, [id], |row| row.get(0))?)
}

/// Fail with [`Error::NotFound`] unless `table` has a row with `id`.
pub(crate) fn ensure_exists(conn: &Connection, table: &'static str, id: i64) -> Result<()> {
    if exists(conn, table, id)? {
        Ok(())
    } else {
        Err(Error::not_found(table, id))
    }
}

/// Fail with [`Error::Integrity`] unless `field` points at an existing row of
/// `table`. This stands in for the foreign keys the schema does not declare.
pub(crate) fn ensure_reference(
    conn: &Connection,
    field: &'static str,
    table: &'static str,
    id: i64,
) -> Result<()> {
    if exists(conn, table, id)? {
        Ok(())
    } else {
        Err(Error::Integrity(format!(
            "{field} {id} does not reference an existing {table}"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnDelete {
    /// Refuse to delete the parent while this dependent has rows.
    Reject,
    /// Remove the dependent rows together with the parent.
    Cascade,
}

/// A table whose `column` stores the id of the row being deleted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dependent {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

impl Dependent {
    pub(crate) const fn reject(table: &'static str, column: &'static str) -> Self {
        Self {
            table,
            column,
            on_delete: OnDelete::Reject,
        }
    }

    pub(crate) const fn cascade(table: &'static str, column: &'static str) -> Self {
        Self {
            table,
            column,
            on_delete: OnDelete::Cascade,
        }
    }
}

/// Delete one row after applying the delete policy of its dependents, all in
/// a single transaction.
pub(crate) fn delete_row(
    conn: &Connection,
    table: &'static str,
    id: i64,
    dependents: &[Dependent],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_exists(&tx, table, id)?;

    for dependent in dependents.iter().filter(|d| d.on_delete == OnDelete::Reject) {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            dependent.table, dependent.column
        );
        let count: i64 = tx.query_row(&sql, [id], |row| row.get(0))?;
        if count > 0 {
            warn!(
                "refusing to delete {table} {id}: {count} row(s) in {} reference it",
                dependent.table
            );
            return Err(Error::Conflict {
                entity: table,
                id,
                dependent: dependent.table,
            });
        }
    }

    for dependent in dependents.iter().filter(|d| d.on_delete == OnDelete::Cascade) {
        let sql = format!("DELETE FROM {} WHERE {} = ?1", dependent.table, dependent.column);
        let removed = tx.execute(&sql, [id])?;
        if removed > 0 {
            debug!("cascaded delete of {table} {id} to {removed} {} row(s)", dependent.table);
        }
    }

    tx.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
    tx.commit()?;
    Ok(())
}

/// Column assignments collected from a patch.
#[derive(Debug, Default)]
pub(crate) struct Changes {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Changes {
    pub(crate) fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Apply `changes` to the row `id` of `table` and stamp `updated_at`. An empty
/// change set only checks that the row exists.
pub(crate) fn update_row(
    conn: &Connection,
    table: &'static str,
    id: i64,
    changes: Changes,
    describe_conflict: impl FnOnce() -> String,
) -> Result<()> {
    if changes.is_empty() {
        return ensure_exists(conn, table, id);
    }

    let mut assignments: Vec<String> = changes
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| format!("{column} = ?{}", idx + 1))
        .collect();
    assignments.push("updated_at = CURRENT_TIMESTAMP".to_string());
    let sql = format!(
        "UPDATE {table} SET {} WHERE id = ?{}",
        assignments.join(", "),
        changes.columns.len() + 1
    );

    let mut values = changes.values;
    values.push(Value::Integer(id));
    let updated = conn
        .execute(&sql, params_from_iter(values))
        .map_err(|err| map_constraint(err, describe_conflict))?;

    if updated == 0 {
        Err(Error::not_found(table, id))
    } else {
        Ok(())
    }
}

/// `WHERE` clause assembled from optional filter predicates.
#[derive(Debug, Default)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    /// Add a predicate with a single `?` placeholder.
    pub(crate) fn push(&mut self, clause: &str, value: impl Into<Value>) {
        self.values.push(value.into());
        self.clauses
            .push(clause.replacen('?', &format!("?{}", self.values.len()), 1));
    }

    pub(crate) fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Pattern for a case-insensitive substring match with `LIKE`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    format!("%{}%", needle.trim().to_lowercase())
}

/// Fetch a single row by id, mapping a miss to [`Error::NotFound`].
pub(crate) fn fetch_by_id<T>(
    conn: &Connection,
    table: &'static str,
    columns: &str,
    id: i64,
    map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<T> {
    let sql = format!("SELECT {columns} FROM {table} WHERE id = ?1");
    conn.query_row(&sql, [id], map)
        .optional()?
        .ok_or_else(|| Error::not_found(table, id))
}

/// Run a query and collect every mapped row.
pub(crate) fn collect_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

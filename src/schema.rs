use crate::error::EaseError;
use crate::ident;
use crate::model::{ColumnDescriptor, TableDescriptor, Value};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// Lists user tables in the order the engine returns them. Internal
/// `sqlite_*` tables are excluded; the order is implementation-defined and
/// deliberately not re-sorted.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>, EaseError> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Describes a table via `PRAGMA table_info`. PRAGMA arguments cannot be
/// bound, so the table name goes through the identifier gate before being
/// interpolated. The result is never cached; callers re-describe after any
/// structural mutation.
pub fn describe(conn: &Connection, table: &str) -> Result<TableDescriptor, EaseError> {
    let table = ident::validate(table)?;
    let sql = format!("PRAGMA table_info({table})");
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| {
            let default_value = match row.get_ref(4)? {
                ValueRef::Null => None,
                other => Some(Value::from(other).to_string()),
            };
            Ok(ColumnDescriptor {
                ordinal: row.get::<_, i64>(0)? as usize,
                name: row.get(1)?,
                decl_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value,
                // pk is the column's 1-based position within the primary
                // key, 0 when not part of it.
                primary_key: row.get::<_, i64>(5)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(EaseError::Schema(format!("no such table: {table}")));
    }
    Ok(TableDescriptor {
        name: table.as_str().to_string(),
        columns,
    })
}

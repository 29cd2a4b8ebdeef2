use crate::error::EaseError;
use crate::exec::{self, ExecOutput};
use crate::ident;
use crate::identity;
use crate::model::{MutationIntent, MutationOutcome, Value};
use crate::schema;
use rusqlite::{Connection, ToSql};
use tracing::debug;

/// Fixed message for the one structural operation SQLite cannot express.
/// No SQL is ever issued for a drop-column intent.
pub const DROP_COLUMN_UNSUPPORTED: &str = "SQLite cannot drop a column in place; \
reconstruct the table manually (CREATE a temporary table, copy the rows, DROP \
the old table, RENAME the new one)";

/// Plans and applies one mutation. Identifiers are validated before any SQL
/// text exists, the table is re-described fresh (never cached), values are
/// bound, and the single generated statement runs inside its own
/// transaction: commit on success, rollback on any failure.
pub fn apply(conn: &Connection, intent: MutationIntent) -> Result<MutationOutcome, EaseError> {
    match intent {
        MutationIntent::RenameTable { old, new } => rename_table(conn, &old, &new),
        MutationIntent::AddColumn {
            table,
            column,
            decl_type,
        } => add_column(conn, &table, &column, &decl_type),
        MutationIntent::RenameColumn { table, old, new } => {
            rename_column(conn, &table, &old, &new)
        }
        MutationIntent::ModifyColumn {
            table,
            old,
            new,
            decl_type,
        } => modify_column(conn, &table, &old, &new, decl_type.as_deref()),
        MutationIntent::DropColumn { .. } => {
            Err(EaseError::NotSupported(DROP_COLUMN_UNSUPPORTED.to_string()))
        }
        MutationIntent::CreateTable { table } => create_table(conn, &table),
        MutationIntent::InsertRow { table } => insert_row(conn, &table),
        MutationIntent::UpdateCell {
            table,
            column,
            pk,
            value,
        } => update_cell(conn, &table, &column, &pk, &value),
        MutationIntent::DeleteRow { table, pk } => delete_row(conn, &table, &pk),
    }
}

fn rename_table(conn: &Connection, old: &str, new: &str) -> Result<MutationOutcome, EaseError> {
    let old = ident::validate(old)?;
    let new = ident::validate(new)?;
    if old == new {
        return Ok(MutationOutcome::NoChange(format!(
            "table {old} already has that name; nothing executed"
        )));
    }
    schema::describe(conn, old.as_str())?;

    let sql = format!("ALTER TABLE {old} RENAME TO {new}");
    run_in_tx(conn, &sql, &[])?;
    // DDL leaves sqlite3_changes untouched, so the count run_in_tx hands
    // back after a structural statement is whatever the previous DML
    // reported. Structural mutations report zero rows instead.
    Ok(applied(0, true, None))
}

fn add_column(
    conn: &Connection,
    table: &str,
    column: &str,
    decl_type: &str,
) -> Result<MutationOutcome, EaseError> {
    let table = ident::validate(table)?;
    let column = ident::validate(column)?;
    let decl_type = ident::validate_decl_type(decl_type)?.to_string();

    let descriptor = schema::describe(conn, table.as_str())?;
    if descriptor.column(column.as_str()).is_some() {
        return Err(EaseError::Schema(format!(
            "table {table} already has a column named {column}"
        )));
    }

    let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {decl_type}");
    run_in_tx(conn, &sql, &[])?;
    Ok(applied(0, true, None))
}

fn rename_column(
    conn: &Connection,
    table: &str,
    old: &str,
    new: &str,
) -> Result<MutationOutcome, EaseError> {
    let table = ident::validate(table)?;
    let old = ident::validate(old)?;
    let new = ident::validate(new)?;

    let descriptor = schema::describe(conn, table.as_str())?;
    if descriptor.column(old.as_str()).is_none() {
        return Err(EaseError::Schema(format!(
            "table {table} has no column named {old}"
        )));
    }
    if old == new {
        return Ok(MutationOutcome::NoChange(format!(
            "column {old} already has that name; nothing executed"
        )));
    }

    // Older SQLite versions lack RENAME COLUMN; that surfaces as a plain
    // query error from the engine, not a special case here.
    let sql = format!("ALTER TABLE {table} RENAME COLUMN {old} TO {new}");
    run_in_tx(conn, &sql, &[])?;
    Ok(applied(0, true, None))
}

fn modify_column(
    conn: &Connection,
    table: &str,
    old: &str,
    new: &str,
    decl_type: Option<&str>,
) -> Result<MutationOutcome, EaseError> {
    let note = match decl_type {
        Some(ty) => {
            let ty = ident::validate_decl_type(ty)?;
            Some(format!(
                "column {new} noted as {ty}; SQLite does not enforce a changed \
declared type on existing data, so this is recorded but not applied"
            ))
        }
        None => None,
    };

    // The rename commits on its own; the type note is informational and
    // cannot fail, so the pair is non-transactional by design.
    let renamed = match rename_column(conn, table, old, new)? {
        MutationOutcome::Applied { .. } => true,
        MutationOutcome::NoChange(_) => false,
    };

    if !renamed && note.is_none() {
        return Ok(MutationOutcome::NoChange(format!(
            "column {old} unchanged; no rename and no type note requested"
        )));
    }
    Ok(applied(0, renamed, note))
}

fn create_table(conn: &Connection, table: &str) -> Result<MutationOutcome, EaseError> {
    let table = ident::validate(table)?;
    let sql = format!("CREATE TABLE {table} (id INTEGER PRIMARY KEY, name TEXT)");
    run_in_tx(conn, &sql, &[])?;
    Ok(applied(0, true, None))
}

fn insert_row(conn: &Connection, table: &str) -> Result<MutationOutcome, EaseError> {
    let table = ident::validate(table)?;
    let descriptor = schema::describe(conn, table.as_str())?;

    // One NULL per column in ordinal order; defaults and INTEGER PRIMARY
    // KEY auto-generation fill in what they can. A NOT NULL column without
    // a default surfaces as a constraint error from the engine.
    let placeholders = vec!["NULL"; descriptor.columns.len()].join(", ");
    let sql = format!("INSERT INTO {table} VALUES ({placeholders})");
    let affected = run_in_tx(conn, &sql, &[])?;
    Ok(applied(affected, false, None))
}

fn update_cell(
    conn: &Connection,
    table: &str,
    column: &str,
    pk: &Value,
    value: &Value,
) -> Result<MutationOutcome, EaseError> {
    let table = ident::validate(table)?;
    let column = ident::validate(column)?;

    let descriptor = schema::describe(conn, table.as_str())?;
    if descriptor.column(column.as_str()).is_none() {
        return Err(EaseError::Schema(format!(
            "table {table} has no column named {column}"
        )));
    }
    let pk_column = identity::primary_key_column(&descriptor)?;
    let pk_name = ident::validate(&pk_column.name)?;

    let sql = format!("UPDATE {table} SET {column} = ?1 WHERE {pk_name} = ?2");
    let affected = run_in_tx(conn, &sql, &[value as &dyn ToSql, pk])?;
    Ok(applied(affected, false, None))
}

fn delete_row(
    conn: &Connection,
    table: &str,
    pk: &Value,
) -> Result<MutationOutcome, EaseError> {
    let table = ident::validate(table)?;

    let descriptor = schema::describe(conn, table.as_str())?;
    let pk_column = identity::primary_key_column(&descriptor)?;
    let pk_name = ident::validate(&pk_column.name)?;

    let sql = format!("DELETE FROM {table} WHERE {pk_name} = ?1");
    let affected = run_in_tx(conn, &sql, &[pk as &dyn ToSql])?;
    Ok(applied(affected, false, None))
}

/// Runs one planned statement inside its own transaction. The transaction
/// rolls back on drop if commit is never reached, so no failure path leaves
/// a half-applied mutation.
fn run_in_tx(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<u64, EaseError> {
    debug!(sql, "applying planned mutation");
    let tx = conn.unchecked_transaction()?;
    let out = exec::execute_bound(&tx, sql, params)?;
    tx.commit()?;
    match out {
        ExecOutput::Done { affected, .. } => Ok(affected),
        // Planned statements are never SELECTs.
        ExecOutput::ResultSet { .. } => Ok(0),
    }
}

fn applied(affected: u64, schema_changed: bool, note: Option<String>) -> MutationOutcome {
    MutationOutcome::Applied {
        affected,
        schema_changed,
        note,
    }
}

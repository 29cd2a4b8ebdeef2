use crate::error::EaseError;
use crate::model::{Row, Value};
use rusqlite::{Connection, ToSql};
use tracing::debug;

/// What running one statement produced: either a full result set or an
/// affected-row count. `schema_changed` tells the caller its table list is
/// stale and must be refreshed.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutput {
    ResultSet {
        columns: Vec<String>,
        rows: Vec<Row>,
    },
    Done {
        affected: u64,
        schema_changed: bool,
    },
}

/// Runs one statement with no bound values. This is the entry point for
/// free-form SQL typed by a user; planner-generated SQL takes the same
/// path, with no trust distinction between the two.
pub fn execute(conn: &Connection, sql: &str) -> Result<ExecOutput, EaseError> {
    execute_bound(conn, sql, &[])
}

/// Runs one statement with bound parameters. A statement whose leading
/// keyword is SELECT (case-insensitive, after stripping whitespace and
/// block comments) is a read; everything else is a write, committed
/// immediately under SQLite's per-statement autocommit.
pub fn execute_bound(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<ExecOutput, EaseError> {
    let keyword = leading_keyword(sql);
    debug!(keyword, "executing statement");

    if keyword.eq_ignore_ascii_case("SELECT") {
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let column_count = columns.len();
        let mut raw_rows = stmt.query(params)?;
        let mut rows = Vec::new();
        while let Some(raw) = raw_rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(Value::from(raw.get_ref(i)?));
            }
            rows.push(Row { values });
        }
        Ok(ExecOutput::ResultSet { columns, rows })
    } else {
        let mut stmt = conn.prepare(sql)?;
        let affected = if stmt.column_count() > 0 {
            // Not every row-returning statement leads with SELECT: PRAGMA,
            // WITH ... SELECT, and RETURNING clauses all produce rows while
            // classifying as writes. Drain the rows so the statement runs
            // to completion instead of tripping the binding layer.
            let read_only = stmt.readonly();
            let mut raw_rows = stmt.query(params)?;
            while raw_rows.next()?.is_some() {}
            if read_only {
                0
            } else {
                conn.changes()
            }
        } else {
            stmt.execute(params)? as u64
        };
        let schema_changed = matches!(
            keyword.to_ascii_uppercase().as_str(),
            "CREATE" | "DROP" | "ALTER"
        );
        Ok(ExecOutput::Done {
            affected,
            schema_changed,
        })
    }
}

/// First word of the statement, after leading whitespace and `/* ... */`
/// prefix comments.
fn leading_keyword(sql: &str) -> &str {
    let stripped = strip_leading_comments(sql);
    let end = stripped
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(stripped.len());
    &stripped[..end]
}

fn strip_leading_comments(mut s: &str) -> &str {
    loop {
        let t = s.trim_start();
        if let Some(rest) = t.strip_prefix("/*") {
            if let Some(end) = rest.find("*/") {
                s = &rest[end + 2..];
                continue;
            }
        }
        return t;
    }
}

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell as read out of the engine. Owned so snapshots can outlive the
/// statement they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

impl Value {
    /// Renders the value as a SQL literal for dump output. Everywhere else
    /// values travel as bound parameters; this is for reconstructive dumps
    /// only, where the output is a text file rather than a statement.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => real_literal(*r),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(b) => {
                let mut out = String::with_capacity(3 + b.len() * 2);
                out.push_str("X'");
                for byte in b {
                    out.push_str(&format!("{byte:02X}"));
                }
                out.push('\'');
                out
            }
        }
    }
}

/// REAL literals the way SQLite's own dump writes them: a guaranteed
/// decimal point so the storage class survives a round trip through a
/// no-affinity column, `1e999` for infinities (which SQLite parses back as
/// Inf), and NULL for NaN (which SQLite cannot store as a REAL anyway).
fn real_literal(r: f64) -> String {
    if r.is_nan() {
        return "NULL".to_string();
    }
    if r.is_infinite() {
        return if r > 0.0 { "1e999" } else { "-1e999" }.to_string();
    }
    let s = r.to_string();
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{s}.0")
    }
}

/// One column as reported by `PRAGMA table_info`. `ordinal` is the engine's
/// `cid` and is the index that aligns this column with positional row values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub ordinal: usize,
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Fresh result of describing a table. Never cached: schema may change
/// between any two calls, so callers re-describe instead of reusing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

/// Values aligned 1:1 with a descriptor's columns, as currently rendered.
/// Rebuilt on every query; a changed cell means a re-query, not an in-place
/// edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

/// What the presentation layer asked for. Consumed once by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MutationIntent {
    RenameTable {
        old: String,
        new: String,
    },
    AddColumn {
        table: String,
        column: String,
        decl_type: String,
    },
    RenameColumn {
        table: String,
        old: String,
        new: String,
    },
    /// Rename plus an advisory type note, as one user-facing operation.
    /// The two effects are non-transactional: the rename commits on its
    /// own and the note is informational.
    ModifyColumn {
        table: String,
        old: String,
        new: String,
        decl_type: Option<String>,
    },
    DropColumn {
        table: String,
        column: String,
    },
    CreateTable {
        table: String,
    },
    InsertRow {
        table: String,
    },
    UpdateCell {
        table: String,
        column: String,
        pk: Value,
        value: Value,
    },
    DeleteRow {
        table: String,
        pk: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MutationOutcome {
    Applied {
        affected: u64,
        schema_changed: bool,
        /// Set when part of the intent was recorded but not enforced,
        /// e.g. a declared-type change SQLite will not apply to existing
        /// data.
        note: Option<String>,
    },
    /// The intent was recognized but required no statement (rename to the
    /// same name). Nothing was sent to the engine.
    NoChange(String),
}

use crate::error::EaseError;
use crate::exec::{self, ExecOutput};
use crate::ident;
use crate::model::{MutationIntent, MutationOutcome, Row, TableDescriptor, Value};
use crate::planner;
use crate::schema;
use rusqlite::{Connection, OpenFlags};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Owns the one live connection plus the small amount of state the
/// presentation layer needs mirrored back: which table is selected and what
/// ran last. Opening a new database drops the previous connection first;
/// the handle is released on every exit path, including failed opens.
#[derive(Default)]
pub struct Session {
    conn: Option<Connection>,
    path: Option<PathBuf>,
    current_table: Option<String>,
    last_sql: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an existing database file. Missing files are not created here;
    /// that is what `create` is for.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), EaseError> {
        self.open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    /// Opens a database file, creating it if it does not exist.
    pub fn create(&mut self, path: impl AsRef<Path>) -> Result<(), EaseError> {
        self.open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
    }

    fn open_with_flags(&mut self, path: &Path, flags: OpenFlags) -> Result<(), EaseError> {
        // Exactly one connection per session.
        self.close();
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| classify_open(path, e))?;
        // A corrupt or non-database file only fails on first access, so
        // touch the schema now to surface NotADatabase at open time.
        conn.query_row("PRAGMA schema_version", [], |_| Ok(()))
            .map_err(|e| classify_open(path, e))?;

        info!(path = %path.display(), "opened database");
        self.conn = Some(conn);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn);
            debug!("closed previous connection");
        }
        self.path = None;
        self.current_table = None;
        self.last_sql = None;
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    pub fn last_statement(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    pub fn connection(&self) -> Result<&Connection, EaseError> {
        self.conn
            .as_ref()
            .ok_or_else(|| EaseError::Open("no database is open".into()))
    }

    pub fn tables(&self) -> Result<Vec<String>, EaseError> {
        schema::list_tables(self.connection()?)
    }

    pub fn describe(&self, table: &str) -> Result<TableDescriptor, EaseError> {
        schema::describe(self.connection()?, table)
    }

    /// Selects a table and returns a fresh snapshot of all of its rows.
    pub fn select_table(&mut self, table: &str) -> Result<(Vec<String>, Vec<Row>), EaseError> {
        let table = ident::validate(table)?;
        let sql = format!("SELECT * FROM {table}");
        let out = self.run_sql(&sql)?;
        self.current_table = Some(table.as_str().to_string());
        match out {
            ExecOutput::ResultSet { columns, rows } => Ok((columns, rows)),
            // SELECT always classifies as a read.
            ExecOutput::Done { .. } => unreachable!("SELECT classified as a write"),
        }
    }

    /// Runs free-form SQL, recording it as the last executed statement. The
    /// returned output carries the schema-changed signal; the caller
    /// refreshes its table list when it is set.
    pub fn run_sql(&mut self, sql: &str) -> Result<ExecOutput, EaseError> {
        let conn = self.connection()?;
        let out = exec::execute(conn, sql)?;
        self.last_sql = Some(sql.to_string());
        Ok(out)
    }

    /// Plans and applies one mutation. Keeps the current-table selection in
    /// step when the selected table itself is renamed.
    pub fn apply(&mut self, intent: MutationIntent) -> Result<MutationOutcome, EaseError> {
        let follow_rename = match &intent {
            MutationIntent::RenameTable { old, new } if self.current_table.as_deref() == Some(old) => {
                Some(new.clone())
            }
            _ => None,
        };
        let outcome = planner::apply(self.connection()?, intent)?;
        if let (Some(new), MutationOutcome::Applied { .. }) = (follow_rename, &outcome) {
            self.current_table = Some(new);
        }
        Ok(outcome)
    }

    /// Serializes the whole database as reconstructive SQL, one statement
    /// per line: schema first, then data, then the remaining objects, the
    /// way the engine's own dump facility orders them.
    pub fn dump(&self, out: &mut dyn Write) -> Result<(), EaseError> {
        let conn = self.connection()?;
        writeln!(out, "BEGIN TRANSACTION;")?;

        let mut stmt = conn.prepare(
            "SELECT name, sql FROM sqlite_master \
             WHERE type='table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL",
        )?;
        let tables = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (name, create_sql) in &tables {
            writeln!(out, "{create_sql};")?;
            // Dumped names come from sqlite_master, not user input, and may
            // be arbitrary; quote them instead of running the bare-identifier
            // gate.
            let quoted = quote_name(name);
            let mut row_stmt = conn.prepare(&format!("SELECT * FROM {quoted}"))?;
            let column_count = row_stmt.column_count();
            let mut rows = row_stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut literals = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    literals.push(Value::from(row.get_ref(i)?).to_sql_literal());
                }
                writeln!(out, "INSERT INTO {quoted} VALUES ({});", literals.join(", "))?;
            }
        }

        let mut stmt = conn
            .prepare("SELECT sql FROM sqlite_master WHERE type != 'table' AND sql IS NOT NULL")?;
        let others = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for sql in others {
            writeln!(out, "{sql};")?;
        }

        writeln!(out, "COMMIT;")?;
        Ok(())
    }
}

fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn classify_open(path: &Path, err: rusqlite::Error) -> EaseError {
    let shown = path.display();
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) => {
            let detail = msg.clone().unwrap_or_else(|| e.to_string());
            match e.code {
                rusqlite::ErrorCode::CannotOpen => {
                    EaseError::Open(format!("{shown}: file not found or cannot be opened ({detail})"))
                }
                rusqlite::ErrorCode::NotADatabase => {
                    EaseError::Open(format!("{shown}: not a valid SQLite database ({detail})"))
                }
                rusqlite::ErrorCode::PermissionDenied | rusqlite::ErrorCode::ReadOnly => {
                    EaseError::Open(format!("{shown}: permission denied ({detail})"))
                }
                _ => EaseError::Open(format!("{shown}: {detail}")),
            }
        }
        other => EaseError::Open(format!("{shown}: {other}")),
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use easedb::{ExecOutput, MutationIntent, MutationOutcome, Row, Session, Value};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "easedb", about = "Lightweight SQLite inspector and editor")]
struct Cli {
    /// Path to the database file
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database file (and optionally a starter table)
    Create {
        /// Also create a default table named NewTable
        #[arg(long)]
        with_table: bool,
    },
    /// List user tables
    Tables,
    /// Show a table's columns
    Describe { table: String },
    /// Print every row of a table
    Select { table: String },
    /// Run a free-form SQL statement
    Exec { sql: String },
    /// Write a reconstructive SQL dump
    Dump {
        /// Output file; stdout when omitted
        out: Option<PathBuf>,
    },
    /// Rename a table
    RenameTable { old: String, new: String },
    /// Add a column to a table
    AddColumn {
        table: String,
        column: String,
        decl_type: String,
    },
    /// Rename a column
    RenameColumn {
        table: String,
        old: String,
        new: String,
    },
    /// Rename a column and note a new declared type
    ModifyColumn {
        table: String,
        old: String,
        new: String,
        #[arg(long)]
        decl_type: Option<String>,
    },
    /// Drop a column (reports why SQLite cannot)
    DropColumn { table: String, column: String },
    /// Create a new table with the default id/name shape
    AddTable { table: String },
    /// Insert an all-NULL row
    AddRow { table: String },
    /// Set one cell, addressed by primary-key value
    SetCell {
        table: String,
        column: String,
        pk: String,
        value: String,
    },
    /// Delete the row with the given primary-key value
    DeleteRow { table: String, pk: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut session = Session::new();

    if let Command::Create { with_table } = &cli.command {
        session.create(&cli.db)?;
        println!("created database: {}", cli.db.display());
        if *with_table {
            session.apply(MutationIntent::CreateTable {
                table: "NewTable".into(),
            })?;
            println!("created table NewTable (id INTEGER PRIMARY KEY, name TEXT)");
        }
        return Ok(());
    }
    session.open(&cli.db)?;

    match cli.command {
        Command::Create { .. } => unreachable!(),
        Command::Tables => {
            for table in session.tables()? {
                println!("{table}");
            }
        }
        Command::Describe { table } => {
            let descriptor = session.describe(&table)?;
            for col in &descriptor.columns {
                println!(
                    "{}\t{}\t{}{}{}",
                    col.ordinal,
                    col.name,
                    col.decl_type,
                    if col.primary_key { "\tPRIMARY KEY" } else { "" },
                    if col.not_null { "\tNOT NULL" } else { "" },
                );
            }
        }
        Command::Select { table } => {
            let (columns, rows) = session.select_table(&table)?;
            println!("{}", columns.join("\t"));
            print_rows(&rows);
        }
        Command::Exec { sql } => match session.run_sql(&sql)? {
            ExecOutput::ResultSet { columns, rows } => {
                println!("{}", columns.join("\t"));
                print_rows(&rows);
            }
            ExecOutput::Done {
                affected,
                schema_changed,
            } => {
                println!("ok, {affected} row(s) affected");
                if schema_changed {
                    println!("schema changed; tables: {}", session.tables()?.join(", "));
                }
            }
        },
        Command::Dump { out } => match out {
            Some(path) => {
                let mut file = File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                session.dump(&mut file)?;
                println!("dumped to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                session.dump(&mut stdout.lock())?;
            }
        },
        Command::RenameTable { old, new } => {
            report(session.apply(MutationIntent::RenameTable { old, new })?);
        }
        Command::AddColumn {
            table,
            column,
            decl_type,
        } => {
            report(session.apply(MutationIntent::AddColumn {
                table,
                column,
                decl_type,
            })?);
        }
        Command::RenameColumn { table, old, new } => {
            report(session.apply(MutationIntent::RenameColumn { table, old, new })?);
        }
        Command::ModifyColumn {
            table,
            old,
            new,
            decl_type,
        } => {
            report(session.apply(MutationIntent::ModifyColumn {
                table,
                old,
                new,
                decl_type,
            })?);
        }
        Command::DropColumn { table, column } => {
            report(session.apply(MutationIntent::DropColumn { table, column })?);
        }
        Command::AddTable { table } => {
            report(session.apply(MutationIntent::CreateTable { table })?);
        }
        Command::AddRow { table } => {
            report(session.apply(MutationIntent::InsertRow { table })?);
        }
        Command::SetCell {
            table,
            column,
            pk,
            value,
        } => {
            report(session.apply(MutationIntent::UpdateCell {
                table,
                column,
                pk: parse_value(&pk),
                value: parse_value(&value),
            })?);
        }
        Command::DeleteRow { table, pk } => {
            report(session.apply(MutationIntent::DeleteRow {
                table,
                pk: parse_value(&pk),
            })?);
        }
    }

    Ok(())
}

fn print_rows(rows: &[Row]) {
    let mut stdout = io::stdout().lock();
    for row in rows {
        let cells: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
        let _ = writeln!(stdout, "{}", cells.join("\t"));
    }
}

fn report(outcome: MutationOutcome) {
    match outcome {
        MutationOutcome::Applied {
            affected,
            schema_changed,
            note,
        } => {
            println!("ok, {affected} row(s) affected");
            if schema_changed {
                println!("schema changed");
            }
            if let Some(note) = note {
                println!("note: {note}");
            }
        }
        MutationOutcome::NoChange(msg) => println!("no change: {msg}"),
    }
}

/// Command-line cell values: NULL, then integer, then real, then text.
fn parse_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Real(f);
    }
    Value::Text(raw.to_string())
}

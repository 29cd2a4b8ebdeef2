mod common;

use easedb::{EaseError, MutationIntent, Session};
use std::fs;

#[test]
fn describe_tracks_structure_and_add_column_ordinal() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;

    let before = session.describe("t1")?;
    assert_eq!(before.columns.len(), 3);
    assert!(before.columns[0].primary_key);

    session.apply(MutationIntent::AddColumn {
        table: "t1".into(),
        column: "score".into(),
        decl_type: "INTEGER".into(),
    })?;

    // Always re-describe after a structural mutation; the new column lands
    // at the previous column count.
    let after = session.describe("t1")?;
    let score = after.column("score").expect("score column present");
    assert_eq!(score.ordinal, before.columns.len());
    assert_eq!(score.decl_type, "INTEGER");
    Ok(())
}

#[test]
fn tables_lists_user_tables_only() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;
    session.run_sql("CREATE TABLE counted (id INTEGER PRIMARY KEY AUTOINCREMENT, v TEXT)")?;
    session.run_sql("INSERT INTO counted (v) VALUES ('x')")?;

    let tables = session.tables()?;
    assert!(tables.contains(&"t1".to_string()));
    assert!(tables.contains(&"bare".to_string()));
    assert!(tables.contains(&"counted".to_string()));
    assert!(!tables.iter().any(|t| t.starts_with("sqlite_")));
    Ok(())
}

#[test]
fn open_missing_file_is_a_classified_open_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut session = Session::new();
    let err = session
        .open(common::db_path(&dir, "does_not_exist.db"))
        .unwrap_err();
    match err {
        EaseError::Open(msg) => assert!(msg.contains("cannot be opened"), "{msg}"),
        other => panic!("expected open error, got {other:?}"),
    }
    assert!(!session.is_open());
    Ok(())
}

#[test]
fn open_non_database_file_is_a_classified_open_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = common::db_path(&dir, "notes.txt");
    fs::write(&path, "this is definitely not a database file, not even close")?;

    let mut session = Session::new();
    let err = session.open(&path).unwrap_err();
    match err {
        EaseError::Open(msg) => assert!(msg.contains("not a valid SQLite database"), "{msg}"),
        other => panic!("expected open error, got {other:?}"),
    }
    assert!(!session.is_open());
    Ok(())
}

#[test]
fn opening_a_second_database_replaces_the_first() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let first = common::db_path(&dir, "first.db");
    let second = common::db_path(&dir, "second.db");

    let mut session = Session::new();
    session.create(&first)?;
    session.run_sql("CREATE TABLE only_in_first (a TEXT)")?;
    session.create(&second)?;

    assert_eq!(session.path(), Some(second.as_path()));
    assert!(session.tables()?.is_empty());
    assert_eq!(session.last_statement(), None);
    Ok(())
}

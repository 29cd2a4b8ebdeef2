mod common;

use easedb::identity::resolve_identity;
use easedb::{EaseError, MutationIntent, MutationOutcome, Value};

#[test]
fn insert_row_produces_an_all_null_row_with_generated_pk() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;

    let out = session.apply(MutationIntent::InsertRow { table: "t1".into() })?;
    assert!(matches!(out, MutationOutcome::Applied { affected: 1, .. }));

    let (_, rows) = session.select_table("t1")?;
    assert_eq!(rows.len(), 4);
    let new_row = rows.last().unwrap();
    // INTEGER PRIMARY KEY turns the NULL into a fresh rowid.
    assert!(matches!(new_row.values[0], Value::Integer(_)));
    assert_eq!(new_row.values[1], Value::Null);
    assert_eq!(new_row.values[2], Value::Null);
    Ok(())
}

#[test]
fn resolved_identity_round_trips_through_delete() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;

    session.apply(MutationIntent::InsertRow { table: "t1".into() })?;
    let descriptor = session.describe("t1")?;
    let (_, rows) = session.select_table("t1")?;
    let inserted = rows.last().unwrap();

    let (pk_name, pk_value) = resolve_identity(&descriptor, inserted)?;
    assert_eq!(pk_name, "id");

    let out = session.apply(MutationIntent::DeleteRow {
        table: "t1".into(),
        pk: pk_value,
    })?;
    assert!(matches!(out, MutationOutcome::Applied { affected: 1, .. }));

    let (_, rows_after) = session.select_table("t1")?;
    assert_eq!(rows_after.len(), 3);
    Ok(())
}

#[test]
fn deleting_every_row_empties_only_that_table() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;

    let descriptor = session.describe("t1")?;
    let (_, rows) = session.select_table("t1")?;
    for row in &rows {
        let (_, pk_value) = resolve_identity(&descriptor, row)?;
        session.apply(MutationIntent::DeleteRow {
            table: "t1".into(),
            pk: pk_value,
        })?;
    }

    let (_, remaining) = session.select_table("t1")?;
    assert!(remaining.is_empty());
    let (_, other) = session.select_table("bare")?;
    assert_eq!(other.len(), 1);
    Ok(())
}

#[test]
fn update_cell_binds_values_instead_of_interpolating() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;

    // Text that would break out of naive string interpolation is stored
    // verbatim because it travels as a bound parameter.
    let hostile = "O'Brien'); DROP TABLE t1; --";
    session.apply(MutationIntent::UpdateCell {
        table: "t1".into(),
        column: "name".into(),
        pk: Value::Integer(2),
        value: Value::Text(hostile.into()),
    })?;

    let (_, rows) = session.select_table("t1")?;
    let updated = rows.iter().find(|r| r.values[0] == Value::Integer(2)).unwrap();
    assert_eq!(updated.values[1], Value::Text(hostile.into()));
    assert_eq!(rows.len(), 3);
    Ok(())
}

#[test]
fn row_edits_are_refused_without_a_single_column_pk() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;
    session.run_sql("CREATE TABLE pair_pk (a INTEGER, b INTEGER, PRIMARY KEY (a, b))")?;

    for table in ["bare", "pair_pk"] {
        let update = session
            .apply(MutationIntent::UpdateCell {
                table: table.into(),
                column: if table == "bare" { "x" } else { "a" }.into(),
                pk: Value::Integer(1),
                value: Value::Integer(9),
            })
            .unwrap_err();
        assert!(matches!(update, EaseError::NoPrimaryKey(_)), "{table}");

        let delete = session
            .apply(MutationIntent::DeleteRow {
                table: table.into(),
                pk: Value::Integer(1),
            })
            .unwrap_err();
        assert!(matches!(delete, EaseError::NoPrimaryKey(_)), "{table}");
    }
    Ok(())
}

#[test]
fn constraint_violations_surface_as_query_errors() -> anyhow::Result<()> {
    let (_dir, mut session) = common::sample_session()?;
    session.run_sql("CREATE TABLE strict_t (id INTEGER PRIMARY KEY, label TEXT NOT NULL)")?;

    let err = session
        .apply(MutationIntent::InsertRow {
            table: "strict_t".into(),
        })
        .unwrap_err();
    match err {
        EaseError::Query(msg) => assert!(msg.to_lowercase().contains("not null"), "{msg}"),
        other => panic!("expected query error, got {other:?}"),
    }
    let (_, rows) = session.select_table("strict_t")?;
    assert!(rows.is_empty());
    Ok(())
}

use easedb::Session;
use std::path::PathBuf;
use tempfile::TempDir;

/// Fresh database with a small fixture: `t1` has a single-column primary
/// key, `bare` has none.
pub fn sample_session() -> anyhow::Result<(TempDir, Session)> {
    let dir = tempfile::tempdir()?;
    let mut session = Session::new();
    session.create(dir.path().join("sample.db"))?;
    session.run_sql("CREATE TABLE t1 (id INTEGER PRIMARY KEY, name TEXT, qty INTEGER)")?;
    session.run_sql("INSERT INTO t1 (id, name, qty) VALUES (1, 'ada', 10), (2, 'bo', 20), (3, 'cy', 30)")?;
    session.run_sql("CREATE TABLE bare (x TEXT, y TEXT)")?;
    session.run_sql("INSERT INTO bare (x, y) VALUES ('left', 'right')")?;
    Ok((dir, session))
}

#[allow(dead_code)]
pub fn db_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

use crate::error::EaseError;
use crate::model::{ColumnDescriptor, Row, TableDescriptor, Value};

/// Returns the table's single primary-key column, or refuses. Tables with
/// no primary key or a composite one are read-only for row operations: a
/// non-unique WHERE clause could hit the wrong row, so the operation is
/// rejected before any SQL exists.
pub fn primary_key_column(descriptor: &TableDescriptor) -> Result<&ColumnDescriptor, EaseError> {
    let pk_columns = descriptor.primary_key_columns();
    match pk_columns.as_slice() {
        [single] => Ok(*single),
        [] => Err(EaseError::NoPrimaryKey(format!(
            "table {} has no primary key; row-level edits need a single-column primary key",
            descriptor.name
        ))),
        _ => Err(EaseError::NoPrimaryKey(format!(
            "table {} has a composite primary key; row-level edits need a single-column primary key",
            descriptor.name
        ))),
    }
}

/// Resolves which stored row a displayed snapshot corresponds to: the
/// primary-key column's name plus the value at that column's ordinal. The
/// value is data, not an identifier, and is always bound as a parameter in
/// any DML built from it.
pub fn resolve_identity(
    descriptor: &TableDescriptor,
    row: &Row,
) -> Result<(String, Value), EaseError> {
    let pk = primary_key_column(descriptor)?;
    let value = row.values.get(pk.ordinal).cloned().ok_or_else(|| {
        EaseError::Schema(format!(
            "row snapshot has {} values but column {} sits at ordinal {}",
            row.values.len(),
            pk.name,
            pk.ordinal
        ))
    })?;
    Ok((pk.name.clone(), value))
}

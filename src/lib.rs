//! Schema-aware mutation core for SQLite: introspects table structure,
//! addresses rows by primary key, and plans safe DDL/DML from user intent.
//! The presentation layer sits outside this crate and talks to [`Session`].

pub mod error;
pub mod exec;
pub mod ident;
pub mod identity;
pub mod model;
pub mod planner;
pub mod schema;
pub mod session;

pub use error::EaseError;
pub use exec::ExecOutput;
pub use model::{
    ColumnDescriptor, MutationIntent, MutationOutcome, Row, TableDescriptor, Value,
};
pub use session::Session;

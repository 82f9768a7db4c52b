//! In-memory relational engine: a SQL front-end, a typed table catalog,
//! a statement executor (including a programmatic two-table JOIN), and a
//! whole-database snapshot codec. See the crate's accompanying design
//! notes for the full component breakdown.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod join;
pub mod schema;
pub mod snapshot;
pub mod sql;
pub mod value;
mod where_eval;

use std::path::Path;

pub use catalog::{Catalog, Column, Row, Table};
pub use error::{DbError, EngineError, ParseError, SnapshotError};
pub use executor::ExecResult;
pub use join::JoinKind;
pub use schema::Schema;
pub use value::{DataType, Value};

/// A single database: a name plus the catalog of tables it owns. Owns no
/// background threads or global state — callers hold it with whatever
/// lifetime and sharing discipline fits their process (§5, §9).
pub struct Database {
    catalog: Catalog,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Database {
            catalog: Catalog::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.catalog.name
    }

    /// Parses and executes one SQL statement.
    pub fn execute(&mut self, sql: &str) -> Result<ExecResult, DbError> {
        let statement = sql::parse(sql)?;
        tracing::debug!(%sql, "executing statement");
        let result = executor::execute(&mut self.catalog, statement)?;
        Ok(result)
    }

    /// Programmatic two-table join (§4.5); not reachable via SQL text.
    pub fn join(&self, left: &str, right: &str, on: &str, kind: JoinKind) -> Result<Vec<Row>, DbError> {
        let left_table = self.catalog.table(left)?;
        let right_table = self.catalog.table(right)?;
        let rows = join::join(left_table, left, right_table, right, on, kind)?;
        Ok(rows)
    }

    pub fn schema(&self) -> Schema {
        schema::describe(&self.catalog)
    }

    pub fn save(&self, path: &Path) -> Result<(), DbError> {
        tracing::info!(path = %path.display(), "saving snapshot");
        snapshot::save_to_path(&self.catalog, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Database, DbError> {
        tracing::info!(path = %path.display(), "loading snapshot");
        let catalog = snapshot::load_from_path(path)?;
        Ok(Database { catalog })
    }
}

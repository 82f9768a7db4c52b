//! System catalog: the in-memory set of tables and their metadata (§4.2).

mod column;
mod index;
mod row;
mod table;

pub use column::Column;
pub use index::Index;
pub use row::Row;
pub use table::Table;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A named, ordered collection of tables (§3 "Database").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    tables: IndexMap<String, Table>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Catalog {
            name: name.into(),
            tables: IndexMap::new(),
        }
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table(&self, name: &str) -> Result<&Table, EngineError> {
        self.tables
            .get(name)
            .ok_or_else(|| EngineError::UnknownTable(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table, EngineError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownTable(name.to_string()))
    }

    pub fn create_table(&mut self, table: Table) -> Result<(), EngineError> {
        if self.tables.contains_key(&table.name) {
            return Err(EngineError::AlreadyExists(table.name.clone()));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Removes the table if present; a no-op otherwise (§4.4 DROP TABLE,
    /// §7 "IF EXISTS" semantics).
    pub fn drop_table(&mut self, name: &str) {
        self.tables.shift_remove(name);
    }

    pub fn rename_table(&mut self, from: &str, to: &str) -> Result<(), EngineError> {
        if !self.tables.contains_key(from) {
            return Err(EngineError::UnknownTable(from.to_string()));
        }
        if self.tables.contains_key(to) {
            return Err(EngineError::AlreadyExists(to.to_string()));
        }
        let (_, mut table) = self.tables.shift_remove_entry(from).expect("checked above");
        table.rename(to);
        self.tables.insert(to.to_string(), table);
        Ok(())
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestResult;
    use crate::value::DataType;

    #[test]
    fn test_create_table_rejects_duplicate_name() -> TestResult {
        let mut catalog = Catalog::new("db");
        catalog.create_table(Table::new("users"))?;
        let err = catalog.create_table(Table::new("users")).unwrap_err();
        assert_eq!(err, EngineError::AlreadyExists("users".into()), "re-declaring a table must be AlreadyExists");
        Ok(())
    }

    #[test]
    fn test_drop_table_is_silent_on_absent_table() -> TestResult {
        let mut catalog = Catalog::new("db");
        catalog.drop_table("ghost");
        assert!(!catalog.has_table("ghost"), "dropping an absent table must stay a no-op");
        Ok(())
    }

    #[test]
    fn test_rename_table_moves_metadata_without_touching_rows() -> TestResult {
        let mut catalog = Catalog::new("db");
        let mut users = Table::new("users_new");
        users.add_column(Column::new("id", DataType::Integer).primary());
        catalog.create_table(users)?;
        catalog.rename_table("users_new", "users")?;
        assert!(catalog.has_table("users"), "table must be reachable under its new name");
        assert!(!catalog.has_table("users_new"), "table must no longer be reachable under its old name");
        Ok(())
    }
}

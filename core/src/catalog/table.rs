use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::column::Column;
use crate::catalog::index::Index;
use crate::catalog::row::Row;
use crate::error::EngineError;
use crate::value::Value;
use crate::where_eval::WhereClause;

/// An in-memory table: ordered columns, ordered row storage, per-column
/// unique-value sets, and per-column secondary indexes (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    unique_values: HashMap<String, HashSet<String>>,
    indexes: HashMap<String, Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            unique_values: HashMap::new(),
            indexes: HashMap::new(),
        }
    }

    pub fn rename(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    /// Matches a column name case-insensitively, as SQL lookups must (§9
    /// open question i).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Appends a column, initializing its unique set and index if needed
    /// (§4.2). Existing rows receive `Null` in the new slot implicitly —
    /// `Row::get` returns `Null` for any declared column absent from a
    /// row's map, so no rewrite of existing rows is required.
    pub fn add_column(&mut self, column: Column) {
        if column.needs_unique_tracking() {
            self.unique_values.entry(column.name.clone()).or_default();
            self.indexes.entry(column.name.clone()).or_default();
        }
        self.columns.push(column);
    }

    /// Idempotently creates (or no-ops on) a secondary index, populated
    /// from the table's current rows (§4.2).
    pub fn create_index(&mut self, column_name: &str) {
        if self.indexes.contains_key(column_name) {
            return;
        }
        let index = self.build_index(column_name);
        self.indexes.insert(column_name.to_string(), index);
    }

    fn build_index(&self, column_name: &str) -> Index {
        Index::rebuild(
            self.rows
                .iter()
                .enumerate()
                .filter_map(|(i, row)| row.get(column_name).map(|v| (i + 1, v))),
        )
    }

    /// Validates and appends one row, maintaining unique sets and indexes.
    /// Fails atomically: nothing is mutated unless the whole row is valid
    /// (§4.2, §7 "validate then commit").
    pub fn insert(&mut self, supplied: &Row) -> Result<usize, EngineError> {
        let next_id = self.row_count + 1;
        let mut resolved = Row::new();

        for column in &self.columns {
            let value = match supplied.get(&column.name) {
                Some(v) if !v.is_null() => {
                    if !column.data_type.validate(v) {
                        return Err(EngineError::TypeMismatch {
                            column: column.name.clone(),
                            expected: column.data_type,
                            found: tag_of(v),
                        });
                    }
                    v.clone()
                }
                _ => {
                    if column.is_primary && matches!(column.data_type, crate::value::DataType::Integer) {
                        Value::Int64(next_id as i64)
                    } else if !column.nullable {
                        return Err(EngineError::NullViolation(column.name.clone()));
                    } else {
                        Value::Null
                    }
                }
            };
            resolved.set(&column.name, value);
        }

        for column in &self.columns {
            if column.needs_unique_tracking() {
                let value = resolved.get(&column.name).expect("resolved has every column");
                if !value.is_null() {
                    let key = value.to_string();
                    let set = self.unique_values.get(&column.name).expect("initialized in add_column");
                    if set.contains(&key) {
                        return Err(EngineError::UniqueViolation(column.name.clone()));
                    }
                }
            }
        }

        for column in &self.columns {
            if column.needs_unique_tracking() {
                let value = resolved.get(&column.name).expect("resolved has every column");
                if !value.is_null() {
                    self.unique_values
                        .get_mut(&column.name)
                        .expect("initialized in add_column")
                        .insert(value.to_string());
                }
            }
        }

        self.rows.push(resolved);
        self.row_count = self.rows.len();
        let row_id = self.row_count;
        for column in &self.columns {
            if let Some(index) = self.indexes.get_mut(&column.name) {
                let value = self.rows[row_id - 1].get(&column.name).expect("just inserted");
                index.insert(value, row_id);
            }
        }

        Ok(row_id)
    }

    /// Returns matching rows in row order, each augmented with `_id` (§4.2).
    pub fn select(&self, predicate: Option<&WhereClause>) -> Vec<Row> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate.map(|p| p.matches(row)).unwrap_or(true))
            .map(|(i, row)| {
                let mut out = row.clone();
                out.set("_id", Value::Int64((i + 1) as i64));
                out
            })
            .collect()
    }

    fn matching_indices(&self, predicate: Option<&WhereClause>) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate.map(|p| p.matches(row)).unwrap_or(true))
            .map(|(i, _)| i)
            .collect()
    }

    /// Applies `set` assignments to every row matched by `predicate`,
    /// validating unique constraints against non-matched rows before
    /// mutating anything (§4.2).
    pub fn update(
        &mut self,
        assignments: &[(String, Value)],
        predicate: Option<&WhereClause>,
    ) -> Result<usize, EngineError> {
        let matched = self.matching_indices(predicate);

        for (name, value) in assignments {
            let Some(col_idx) = self.column_index(name) else {
                return Err(EngineError::UnknownColumn(name.clone()));
            };
            let column = &self.columns[col_idx];
            if !value.is_null() && !column.data_type.validate(value) {
                return Err(EngineError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type,
                    found: tag_of(value),
                });
            }
            if value.is_null() && !column.nullable {
                return Err(EngineError::NullViolation(column.name.clone()));
            }
            if column.needs_unique_tracking() && !value.is_null() {
                let key = value.to_string();
                for &row_idx in &matched {
                    let current = self.rows[row_idx].get(&column.name).expect("every column present");
                    if current.to_string() == key {
                        continue;
                    }
                    for (other_idx, other_row) in self.rows.iter().enumerate() {
                        if matched.contains(&other_idx) {
                            continue;
                        }
                        let other_value = other_row.get(&column.name).expect("every column present");
                        if !other_value.is_null() && other_value.to_string() == key {
                            return Err(EngineError::UniqueViolation(column.name.clone()));
                        }
                    }
                }
            }
        }

        for (name, value) in assignments {
            let col_idx = self.column_index(name).expect("checked above");
            let column_name = self.columns[col_idx].name.clone();
            let needs_tracking = self.columns[col_idx].needs_unique_tracking();
            let has_index = self.indexes.contains_key(&column_name);

            for &row_idx in &matched {
                let row_id = row_idx + 1;
                let old = self.rows[row_idx].get(&column_name).cloned().unwrap_or(Value::Null);
                if needs_tracking && !old.is_null() {
                    if let Some(set) = self.unique_values.get_mut(&column_name) {
                        set.remove(&old.to_string());
                    }
                }
                if has_index {
                    if let Some(index) = self.indexes.get_mut(&column_name) {
                        index.remove(&old, row_id);
                    }
                }

                self.rows[row_idx].set(&column_name, value.clone());

                if needs_tracking && !value.is_null() {
                    if let Some(set) = self.unique_values.get_mut(&column_name) {
                        set.insert(value.to_string());
                    }
                }
                if has_index {
                    if let Some(index) = self.indexes.get_mut(&column_name) {
                        index.insert(value, row_id);
                    }
                }
            }
        }

        Ok(matched.len())
    }

    /// Removes matching rows and repairs unique sets and indexes by
    /// rebuilding them from the surviving rows (§4.2).
    pub fn delete(&mut self, predicate: Option<&WhereClause>) -> usize {
        let matched: HashSet<usize> = self.matching_indices(predicate).into_iter().collect();
        let removed = matched.len();
        if removed == 0 {
            return 0;
        }

        let mut keep = Vec::with_capacity(self.rows.len() - removed);
        for (i, row) in self.rows.drain(..).enumerate() {
            if !matched.contains(&i) {
                keep.push(row);
            }
        }
        self.rows = keep;
        self.row_count = self.rows.len();

        for column in &self.columns {
            if column.needs_unique_tracking() {
                let set: HashSet<String> = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(&column.name))
                    .filter(|v| !v.is_null())
                    .map(|v| v.to_string())
                    .collect();
                self.unique_values.insert(column.name.clone(), set);
            }
            if self.indexes.contains_key(&column.name) {
                let index = self.build_index(&column.name);
                self.indexes.insert(column.name.clone(), index);
            }
        }

        removed
    }
}

fn tag_of(value: &Value) -> crate::value::DataType {
    use crate::value::DataType;
    match value {
        Value::Null => DataType::Text,
        Value::Int64(_) => DataType::Integer,
        Value::Float64(_) => DataType::Real,
        Value::Bool(_) => DataType::Boolean,
        Value::Text(_) => DataType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestResult;
    use crate::value::DataType;

    fn users_table() -> Table {
        let mut table = Table::new("users");
        table.add_column(Column::new("id", DataType::Integer).primary());
        table.add_column(Column::new("name", DataType::Text).not_null());
        table.add_column(Column::new("email", DataType::Text).unique());
        table.add_column(Column::new("age", DataType::Integer));
        table
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        let mut row = Row::new();
        for (k, v) in pairs {
            row.set(k, v.clone());
        }
        row
    }

    #[test]
    fn test_insert_autogenerates_primary_key() -> TestResult {
        let mut table = users_table();
        let id1 = table.insert(&row(&[("name", Value::Text("Alice".into())), ("email", Value::Text("a@x".into()))]))?;
        let id2 = table.insert(&row(&[("name", Value::Text("Bob".into())), ("email", Value::Text("b@x".into()))]))?;
        assert_eq!(id1, 1, "first auto-assigned primary key must be 1");
        assert_eq!(id2, 2, "second auto-assigned primary key must be 2");
        assert_eq!(table.row_count, 2, "row_count must track the number of inserted rows");
        Ok(())
    }

    #[test]
    fn test_insert_rejects_duplicate_unique_value() -> TestResult {
        let mut table = users_table();
        table.insert(&row(&[("name", Value::Text("Alice".into())), ("email", Value::Text("a@x".into()))]))?;
        let err = table
            .insert(&row(&[("name", Value::Text("Carol".into())), ("email", Value::Text("a@x".into()))]))
            .unwrap_err();
        assert_eq!(err, EngineError::UniqueViolation("email".into()), "duplicate unique value must be UniqueViolation");
        assert_eq!(table.row_count, 1, "failed insert must not mutate the table");
        Ok(())
    }

    #[test]
    fn test_insert_null_into_not_null_column_fails() -> TestResult {
        let mut table = users_table();
        let err = table.insert(&row(&[("email", Value::Text("a@x".into()))])).unwrap_err();
        assert_eq!(err, EngineError::NullViolation("name".into()), "omitting a NOT NULL column must be NullViolation");
        Ok(())
    }

    #[test]
    fn test_select_includes_synthetic_id() -> TestResult {
        let mut table = users_table();
        table.insert(&row(&[("name", Value::Text("Alice".into())), ("email", Value::Text("a@x".into()))]))?;
        let rows = table.select(None);
        assert_eq!(rows[0].get("_id"), Some(&Value::Int64(1)), "selected row must carry its 1-based _id");
        Ok(())
    }

    #[test]
    fn test_delete_then_select_same_predicate_is_empty() -> TestResult {
        let mut table = users_table();
        table.insert(&row(&[("name", Value::Text("Alice".into())), ("email", Value::Text("a@x".into()))]))?;
        let where_clause = WhereClause::parse("name = 'Alice'").ok_or("failed to parse WHERE clause")?;
        let removed = table.delete(Some(&where_clause));
        assert_eq!(removed, 1, "exactly one row must match the predicate");
        assert!(table.select(Some(&where_clause)).is_empty(), "deleted rows must not reappear under the same predicate");
        Ok(())
    }

    #[test]
    fn test_create_index_is_idempotent_and_populated() -> TestResult {
        let mut table = users_table();
        table.insert(&row(&[("name", Value::Text("Bob".into())), ("age", Value::Int64(25))]))?;
        table.create_index("age");
        table.create_index("age");
        assert_eq!(
            table.indexes.get("age").ok_or("age index missing")?.lookup(&Value::Int64(25)),
            &[1],
            "index must map age=25 to row id 1 after two idempotent creations"
        );
        Ok(())
    }
}

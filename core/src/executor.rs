//! Statement executor (§4.2 via §2 "Executor"): resolves the target table
//! in the catalog, mutates storage, and returns a row list, affected-row
//! count, or generated row id.

use crate::catalog::{Catalog, Column, Row, Table};
use crate::error::EngineError;
use crate::sql::{ColumnDef, OrderBy, Projection, Statement};
use crate::value::Value;

/// The result shape a statement produces, matching §2's three outcomes.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecResult {
    Rows(Vec<Row>),
    Affected(usize),
    RowId(usize),
    Ack,
}

pub fn execute(catalog: &mut Catalog, statement: Statement) -> Result<ExecResult, EngineError> {
    match statement {
        Statement::CreateTable {
            table,
            if_not_exists,
            columns,
        } => {
            if if_not_exists && catalog.has_table(&table) {
                return Ok(ExecResult::Ack);
            }
            let mut new_table = Table::new(&table);
            for def in columns {
                new_table.add_column(column_from_def(def));
            }
            catalog.create_table(new_table)?;
            Ok(ExecResult::Ack)
        }
        Statement::AlterTableAddColumn { table, column } => {
            let t = catalog.table_mut(&table)?;
            if t.has_column(&column.name) {
                return Err(EngineError::AlreadyExists(column.name));
            }
            t.add_column(column_from_def(column));
            Ok(ExecResult::Ack)
        }
        Statement::AlterTableRename { table, new_name } => {
            catalog.rename_table(&table, &new_name)?;
            Ok(ExecResult::Ack)
        }
        Statement::DropTable { table } => {
            catalog.drop_table(&table);
            Ok(ExecResult::Ack)
        }
        Statement::Insert {
            table,
            columns,
            values,
        } => {
            if columns.len() != values.len() {
                return Err(EngineError::Arity {
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            let t = catalog.table_mut(&table)?;
            let mut supplied = Row::new();
            for (name, value) in columns.iter().zip(values.into_iter()) {
                let resolved_name = t
                    .column(name)
                    .map(|c| c.name.clone())
                    .ok_or_else(|| EngineError::UnknownColumn(name.clone()))?;
                supplied.set(&resolved_name, value);
            }
            let row_id = t.insert(&supplied)?;
            Ok(ExecResult::RowId(row_id))
        }
        Statement::Select {
            projection,
            table,
            where_clause,
            order_by,
            limit,
        } => {
            let t = catalog.table(&table)?;
            let include_id = matches!(projection, Projection::Star);
            let mut rows = t.select(where_clause.as_ref());

            if let Some(OrderBy { column, descending }) = &order_by {
                sort_rows(&mut rows, column, *descending);
            }
            if let Some(n) = limit {
                rows.truncate(n);
            }

            let rows = project(rows, &projection, include_id);
            Ok(ExecResult::Rows(rows))
        }
        Statement::SelectMax {
            column,
            table,
            where_clause,
        } => {
            let t = catalog.table(&table)?;
            let resolved = t
                .column(&column)
                .map(|c| c.name.clone())
                .ok_or_else(|| EngineError::UnknownColumn(column.clone()))?;
            let rows = t.select(where_clause.as_ref());
            let max = rows
                .iter()
                .filter_map(|r| r.get(&resolved))
                .filter(|v| !v.is_null())
                .fold(None::<Value>, |best, candidate| match &best {
                    None => Some(candidate.clone()),
                    Some(current) => {
                        if matches!(candidate.partial_compare(current), Some(std::cmp::Ordering::Greater)) {
                            Some(candidate.clone())
                        } else {
                            best
                        }
                    }
                })
                .unwrap_or(Value::Null);
            let mut out = Row::new();
            out.set(&format!("max_{resolved}"), max);
            Ok(ExecResult::Rows(vec![out]))
        }
        Statement::Update {
            table,
            assignments,
            where_clause,
        } => {
            let t = catalog.table_mut(&table)?;
            let resolved: Result<Vec<(String, Value)>, EngineError> = assignments
                .into_iter()
                .map(|(name, value)| {
                    t.column(&name)
                        .map(|c| (c.name.clone(), value.clone()))
                        .ok_or_else(|| EngineError::UnknownColumn(name.clone()))
                })
                .collect();
            let count = t.update(&resolved?, where_clause.as_ref())?;
            Ok(ExecResult::Affected(count))
        }
        Statement::Delete { table, where_clause } => {
            let t = catalog.table_mut(&table)?;
            let count = t.delete(where_clause.as_ref());
            Ok(ExecResult::Affected(count))
        }
        Statement::CreateIndex {
            index_name: _,
            table,
            column,
        } => {
            let t = catalog.table_mut(&table)?;
            if !t.has_column(&column) {
                return Err(EngineError::UnknownColumn(column));
            }
            t.create_index(&column);
            Ok(ExecResult::Ack)
        }
    }
}

fn column_from_def(def: ColumnDef) -> Column {
    let mut column = Column::new(def.name, def.data_type);
    if def.is_primary {
        column = column.primary();
    }
    if def.is_unique {
        column = column.unique();
    }
    if !def.nullable {
        column = column.not_null();
    }
    column
}

/// ORDER BY sorts by the clause column's stringified value; Nulls sort as
/// empty ascending, or as the sentinel `"ZZZZZZ"` descending (§4.4).
fn sort_rows(rows: &mut [Row], column: &str, descending: bool) {
    rows.sort_by(|a, b| {
        let key = |row: &Row| -> String {
            match row.get_ci(column) {
                None | Some(Value::Null) => {
                    if descending {
                        "ZZZZZZ".to_string()
                    } else {
                        String::new()
                    }
                }
                Some(v) => v.sort_key(),
            }
        };
        let ordering = key(a).cmp(&key(b));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Keeps only the listed columns (Null when absent from a row); `_id` is
/// carried through only for the star projection (§4.4, §9 open question ii).
fn project(rows: Vec<Row>, projection: &Projection, include_id: bool) -> Vec<Row> {
    match projection {
        Projection::Star => rows,
        Projection::Columns(names) => rows
            .into_iter()
            .map(|row| {
                let mut out = Row::new();
                for name in names {
                    let value = row.get_ci(name).cloned().unwrap_or(Value::Null);
                    out.set(name, value);
                }
                if include_id {
                    if let Some(id) = row.get("_id") {
                        out.set("_id", id.clone());
                    }
                }
                out
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestResult;
    use crate::sql::parse;

    fn exec(catalog: &mut Catalog, sql: &str) -> Result<ExecResult, EngineError> {
        execute(catalog, parse(sql).expect("test SQL must parse"))
    }

    #[test]
    fn test_scenario_a_basic_insert_select_order_by() -> TestResult {
        let mut catalog = Catalog::new("db");
        exec(
            &mut catalog,
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE, age INTEGER)",
        )?;
        exec(&mut catalog, "INSERT INTO users (name, email, age) VALUES ('Alice','a@x',30)")?;
        exec(&mut catalog, "INSERT INTO users (name, email, age) VALUES ('Bob','b@x',25)")?;

        let ExecResult::Rows(rows) = exec(&mut catalog, "SELECT * FROM users ORDER BY age")? else {
            return Err("expected rows".into());
        };
        assert_eq!(rows.len(), 2, "both inserted rows must be returned");
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Bob".into())), "ORDER BY age must sort Bob (25) first");
        assert_eq!(rows[0].get("_id"), Some(&Value::Int64(2)), "Bob was the second row inserted");
        assert_eq!(rows[1].get("_id"), Some(&Value::Int64(1)), "Alice was the first row inserted");
        Ok(())
    }

    #[test]
    fn test_scenario_b_unique_violation_leaves_table_unchanged() -> TestResult {
        let mut catalog = Catalog::new("db");
        exec(
            &mut catalog,
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE, age INTEGER)",
        )?;
        exec(&mut catalog, "INSERT INTO users (name, email, age) VALUES ('Alice','a@x',30)")?;
        exec(&mut catalog, "INSERT INTO users (name, email, age) VALUES ('Bob','b@x',25)")?;

        let err = exec(&mut catalog, "INSERT INTO users (name, email) VALUES ('Carol','a@x')").unwrap_err();
        assert_eq!(err, EngineError::UniqueViolation("email".into()), "duplicate email must be UniqueViolation");

        let ExecResult::Rows(rows) = exec(&mut catalog, "SELECT * FROM users")? else {
            return Err("expected rows".into());
        };
        assert_eq!(rows.len(), 2, "the failed insert must not have added a third row");
        Ok(())
    }

    #[test]
    fn test_scenario_c_alter_table_null_fills_existing_rows() -> TestResult {
        let mut catalog = Catalog::new("db");
        exec(&mut catalog, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")?;
        exec(&mut catalog, "INSERT INTO users (name) VALUES ('Alice')")?;
        exec(&mut catalog, "ALTER TABLE users ADD COLUMN city TEXT")?;

        let ExecResult::Rows(rows) = exec(&mut catalog, "SELECT * FROM users")? else {
            return Err("expected rows".into());
        };
        assert_eq!(rows[0].get("city"), Some(&Value::Null), "pre-existing rows must receive Null in the new column");
        Ok(())
    }

    #[test]
    fn test_scenario_d_where_update_and_index_integrity() -> TestResult {
        let mut catalog = Catalog::new("db");
        exec(
            &mut catalog,
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER)",
        )?;
        exec(&mut catalog, "INSERT INTO users (name, age) VALUES ('Bob', 25)")?;
        exec(&mut catalog, "CREATE INDEX ix ON users(age)")?;
        exec(&mut catalog, "UPDATE users SET age = 26 WHERE name = 'Bob'")?;

        let ExecResult::Rows(rows) = exec(&mut catalog, "SELECT * FROM users WHERE age = 26")? else {
            return Err("expected rows".into());
        };
        assert_eq!(rows.len(), 1, "exactly Bob's row must match age = 26 after the update");
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Bob".into())), "the matched row must be Bob's");
        Ok(())
    }

    #[test]
    fn test_select_max_returns_single_scalar_row() -> TestResult {
        let mut catalog = Catalog::new("db");
        exec(&mut catalog, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
        exec(&mut catalog, "INSERT INTO users (name) VALUES ('Alice')")?;
        exec(&mut catalog, "INSERT INTO users (name) VALUES ('Bob')")?;

        let ExecResult::Rows(rows) = exec(&mut catalog, "SELECT MAX(id) FROM users")? else {
            return Err("expected rows".into());
        };
        assert_eq!(rows.len(), 1, "MAX(...) must produce exactly one scalar row");
        assert_eq!(rows[0].get("max_id"), Some(&Value::Int64(2)), "MAX(id) over {1,2} must be 2");
        Ok(())
    }

    #[test]
    fn test_insert_with_mismatched_arity_fails() -> TestResult {
        let mut catalog = Catalog::new("db");
        exec(&mut catalog, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT)")?;
        let err = exec(&mut catalog, "INSERT INTO users (name, email) VALUES ('A')").unwrap_err();
        assert_eq!(err, EngineError::Arity { expected: 2, found: 1 }, "column/value count mismatch must be Arity");
        Ok(())
    }

    #[test]
    fn test_drop_table_if_absent_is_a_silent_no_op() -> TestResult {
        let mut catalog = Catalog::new("db");
        let result = exec(&mut catalog, "DROP TABLE ghost")?;
        assert_eq!(result, ExecResult::Ack, "DROP TABLE on an absent table must succeed silently");
        Ok(())
    }
}

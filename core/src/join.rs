//! Programmatic two-table JOIN (§4.5). Not part of the SQL grammar — the
//! Non-goals exclude multi-table FROM lists, so this is exposed only as
//! [`crate::Database::join`], the same way the source exposes `join()` as
//! a plain method rather than through its SQL dispatch.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::{Row, Table};
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn from_str(s: &str) -> Option<JoinKind> {
        match s.to_ascii_uppercase().as_str() {
            "INNER" => Some(JoinKind::Inner),
            "LEFT" => Some(JoinKind::Left),
            "RIGHT" => Some(JoinKind::Right),
            "FULL" => Some(JoinKind::Full),
            "CROSS" => Some(JoinKind::Cross),
            _ => None,
        }
    }
}

static ON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(\w+)\.(\w+)\s*=\s*(\w+)\.(\w+)\s*$").unwrap());

struct OnClause {
    left_table: String,
    left_col: String,
    right_table: String,
    right_col: String,
}

fn parse_on(on: &str, left_name: &str, right_name: &str) -> Result<OnClause, EngineError> {
    let caps = ON_RE
        .captures(on)
        .ok_or_else(|| EngineError::UnknownColumn(format!("malformed ON clause `{on}`")))?;
    let (t1, c1, t2, c2) = (&caps[1], &caps[2], &caps[3], &caps[4]);
    if t1.eq_ignore_ascii_case(left_name) && t2.eq_ignore_ascii_case(right_name) {
        Ok(OnClause {
            left_table: t1.to_string(),
            left_col: c1.to_string(),
            right_table: t2.to_string(),
            right_col: c2.to_string(),
        })
    } else if t1.eq_ignore_ascii_case(right_name) && t2.eq_ignore_ascii_case(left_name) {
        Ok(OnClause {
            left_table: t2.to_string(),
            left_col: c2.to_string(),
            right_table: t1.to_string(),
            right_col: c1.to_string(),
        })
    } else {
        Err(EngineError::UnknownColumn(format!(
            "ON clause `{on}` does not reference both `{left_name}` and `{right_name}`"
        )))
    }
}

fn prefix_row(row: Option<&Row>, table: &str, out: &mut Row) {
    if let Some(row) = row {
        for (col, value) in row.iter() {
            if col == "_id" {
                continue;
            }
            out.set(&format!("{table}.{col}"), value.clone());
        }
    }
}

fn merge(left: Option<&Row>, left_name: &str, right: Option<&Row>, right_name: &str) -> Row {
    let mut out = Row::new();
    prefix_row(left, left_name, &mut out);
    prefix_row(right, right_name, &mut out);
    out
}

/// Joins `left`/`right` per §4.5. `on` is ignored for `Cross`.
pub fn join(
    left: &Table,
    left_name: &str,
    right: &Table,
    right_name: &str,
    on: &str,
    kind: JoinKind,
) -> Result<Vec<Row>, EngineError> {
    if kind == JoinKind::Cross {
        let mut out = Vec::with_capacity(left.rows.len() * right.rows.len());
        for l in &left.rows {
            for r in &right.rows {
                out.push(merge(Some(l), left_name, Some(r), right_name));
            }
        }
        return Ok(out);
    }

    let on_clause = parse_on(on, left_name, right_name)?;
    let mut out = Vec::new();
    let mut right_matched = vec![false; right.rows.len()];

    for l in &left.rows {
        let Some(lv) = l.get(&on_clause.left_col) else {
            continue;
        };
        let mut any_match = false;
        for (ri, r) in right.rows.iter().enumerate() {
            let Some(rv) = r.get(&on_clause.right_col) else {
                continue;
            };
            if lv.eq_sql(rv) {
                any_match = true;
                right_matched[ri] = true;
                out.push(merge(Some(l), left_name, Some(r), right_name));
            }
        }
        if !any_match && matches!(kind, JoinKind::Left | JoinKind::Full) {
            out.push(merge(Some(l), left_name, None, right_name));
        }
    }

    if matches!(kind, JoinKind::Right | JoinKind::Full) {
        for (ri, r) in right.rows.iter().enumerate() {
            if !right_matched[ri] {
                out.push(merge(None, left_name, Some(r), right_name));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;
    use crate::error::TestResult;
    use crate::value::{DataType, Value};

    fn build(name: &str, col: &str, rows: &[(i64, i64)]) -> Table {
        let mut table = Table::new(name);
        table.add_column(Column::new("id", DataType::Integer));
        table.add_column(Column::new(col, DataType::Integer));
        for (id, v) in rows {
            let mut row = Row::new();
            row.set("id", Value::Int64(*id));
            row.set(col, Value::Int64(*v));
            table.insert(&row).unwrap();
        }
        table
    }

    #[test]
    fn test_left_join_emits_unmatched_left_row() -> TestResult {
        let users = build("users", "name_id", &[(1, 1), (2, 2)]);
        let orders = build("orders", "user_id", &[(10, 1), (11, 1), (12, 3)]);
        let rows = join(&users, "users", &orders, "orders", "users.id = orders.user_id", JoinKind::Left)?;
        assert_eq!(rows.len(), 3, "LEFT JOIN must keep user 2, which has no matching order");
        assert!(rows.iter().any(|r| r.get("orders.id").is_none()), "the unmatched user row must have no orders.* columns");
        Ok(())
    }

    #[test]
    fn test_right_join_emits_unmatched_right_row() -> TestResult {
        let users = build("users", "name_id", &[(1, 1), (2, 2)]);
        let orders = build("orders", "user_id", &[(10, 1), (11, 1), (12, 3)]);
        let rows = join(&users, "users", &orders, "orders", "users.id = orders.user_id", JoinKind::Right)?;
        assert_eq!(rows.len(), 3, "RIGHT JOIN must keep order 12, which has no matching user");
        assert!(rows.iter().any(|r| r.get("users.id").is_none()), "the unmatched order row must have no users.* columns");
        Ok(())
    }

    #[test]
    fn test_inner_join_excludes_unmatched_rows() -> TestResult {
        let users = build("users", "name_id", &[(1, 1), (2, 2)]);
        let orders = build("orders", "user_id", &[(10, 1), (11, 1), (12, 3)]);
        let rows = join(&users, "users", &orders, "orders", "users.id = orders.user_id", JoinKind::Inner)?;
        assert_eq!(rows.len(), 2, "INNER JOIN must drop both unmatched user 2 and unmatched order 12");
        Ok(())
    }

    #[test]
    fn test_full_join_includes_both_unmatched_sides() -> TestResult {
        let users = build("users", "name_id", &[(1, 1), (2, 2)]);
        let orders = build("orders", "user_id", &[(10, 1), (11, 1), (12, 3)]);
        let rows = join(&users, "users", &orders, "orders", "users.id = orders.user_id", JoinKind::Full)?;
        assert_eq!(rows.len(), 4, "FULL JOIN must keep both the unmatched user and the unmatched order");
        Ok(())
    }

    #[test]
    fn test_cross_join_is_cartesian_product() -> TestResult {
        let users = build("users", "name_id", &[(1, 1), (2, 2)]);
        let orders = build("orders", "user_id", &[(10, 1), (11, 1), (12, 3)]);
        let rows = join(&users, "users", &orders, "orders", "", JoinKind::Cross)?;
        assert_eq!(rows.len(), 6, "CROSS JOIN of 2 users and 3 orders must produce 2*3 = 6 rows");
        Ok(())
    }
}

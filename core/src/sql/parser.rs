//! Tokenizer-free, regex-dispatched statement parser (§4.4).
//!
//! Each statement kind is recognized by a leading-keyword regex and then
//! parsed with its own small regex/split routine — there is no general
//! SQL tokenizer or grammar here, matching the source's approach but
//! replacing its ad-hoc string slicing with named capture groups.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::{ColumnDef, OrderBy, Projection, Statement};
use crate::error::ParseError;
use crate::value::{DataType, Value};
use crate::where_eval::WhereClause;

// Identifiers per §6: `[A-Za-z0-9_]+`, with no constraint on the leading
// character — `\w+` in the original `rdbms_core.py` dispatch regexes
// likewise allows a leading digit.
const IDENT: &str = "[A-Za-z0-9_]+";

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^CREATE\s+TABLE\s+(IF\s+NOT\s+EXISTS\s+)?({IDENT})\s*\((.*)\)\s*$")).unwrap()
});
static ALTER_ADD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^ALTER\s+TABLE\s+({IDENT})\s+ADD\s+COLUMN\s+(.+)$")).unwrap());
static ALTER_RENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^ALTER\s+TABLE\s+({IDENT})\s+RENAME\s+TO\s+({IDENT})\s*$")).unwrap()
});
static DROP_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^DROP\s+TABLE\s+({IDENT})\s*$")).unwrap());
static INSERT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^INSERT\s+INTO\s+({IDENT})\s*\(([^)]*)\)\s*VALUES\s*\((.*)\)\s*$")).unwrap()
});
static SELECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^SELECT\s+(.+?)\s+FROM\s+({IDENT})(\s+WHERE\s+.+?)?(\s+ORDER\s+BY\s+{IDENT}(?:\s+DESC|\s+ASC)?)?(\s+LIMIT\s+\d+)?\s*$"
    ))
    .unwrap()
});
static SELECT_MAX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^MAX\s*\(\s*({IDENT})\s*\)\s*$")).unwrap());
static UPDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^UPDATE\s+({IDENT})\s+SET\s+(.+?)(\s+WHERE\s+.+)?$")).unwrap());
static DELETE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)^DELETE\s+FROM\s+({IDENT})(\s+WHERE\s+.+)?$")).unwrap());
static CREATE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^CREATE\s+INDEX\s+({IDENT})\s+ON\s+({IDENT})\s*\(\s*({IDENT})\s*\)\s*$"
    ))
    .unwrap()
});
static LEADING_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)^([A-Za-z]+)").unwrap());

/// Collapses whitespace runs (including newlines) to single spaces and
/// trims the ends, the "cleaning" pass required before dispatch (§4.4).
pub fn clean(sql: &str) -> String {
    let collapsed: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim().to_string()
}

/// Parses one cleaned SQL statement into a [`Statement`].
pub fn parse(sql: &str) -> Result<Statement, ParseError> {
    let sql = clean(sql);
    if sql.is_empty() {
        return Err(ParseError::Syntax("empty statement".to_string()));
    }

    if let Some(caps) = CREATE_TABLE_RE.captures(&sql) {
        return parse_create_table(&caps);
    }
    if let Some(caps) = ALTER_RENAME_RE.captures(&sql) {
        return Ok(Statement::AlterTableRename {
            table: caps[1].to_string(),
            new_name: caps[2].to_string(),
        });
    }
    if let Some(caps) = ALTER_ADD_RE.captures(&sql) {
        return parse_alter_add(&caps);
    }
    if let Some(caps) = DROP_TABLE_RE.captures(&sql) {
        return Ok(Statement::DropTable {
            table: caps[1].to_string(),
        });
    }
    if let Some(caps) = INSERT_RE.captures(&sql) {
        return parse_insert(&caps);
    }
    if let Some(caps) = SELECT_RE.captures(&sql) {
        return parse_select(&caps);
    }
    if let Some(caps) = UPDATE_RE.captures(&sql) {
        return parse_update(&caps);
    }
    if let Some(caps) = DELETE_RE.captures(&sql) {
        let where_clause = parse_optional_where(caps.get(2).map(|m| m.as_str()))?;
        return Ok(Statement::Delete {
            table: caps[1].to_string(),
            where_clause,
        });
    }
    if let Some(caps) = CREATE_INDEX_RE.captures(&sql) {
        return Ok(Statement::CreateIndex {
            index_name: caps[1].to_string(),
            table: caps[2].to_string(),
            column: caps[3].to_string(),
        });
    }

    let keyword = LEADING_WORD_RE
        .captures(&sql)
        .map(|c| c[1].to_uppercase())
        .unwrap_or_else(|| sql.clone());
    Err(ParseError::Unsupported(keyword))
}

fn parse_create_table(caps: &regex::Captures) -> Result<Statement, ParseError> {
    let if_not_exists = caps.get(1).is_some();
    let table = caps[2].to_string();
    let body = &caps[3];
    let mut columns = Vec::new();
    for def in split_top_level(body, ',') {
        columns.push(parse_column_def(&def)?);
    }
    if columns.is_empty() {
        return Err(ParseError::Syntax(format!("CREATE TABLE {table} has no columns")));
    }
    Ok(Statement::CreateTable {
        table,
        if_not_exists,
        columns,
    })
}

fn parse_alter_add(caps: &regex::Captures) -> Result<Statement, ParseError> {
    let table = caps[1].to_string();
    let column = parse_column_def(&caps[2])?;
    Ok(Statement::AlterTableAddColumn { table, column })
}

fn parse_column_def(def: &str) -> Result<ColumnDef, ParseError> {
    let tokens = tokenize_column_def(def.trim());
    let mut iter = tokens.into_iter();
    let name = iter
        .next()
        .ok_or_else(|| ParseError::Syntax(format!("missing column name in `{def}`")))?;
    let type_token = iter
        .next()
        .ok_or_else(|| ParseError::Syntax(format!("missing column type in `{def}`")))?;
    let data_type = DataType::from_token(&type_token)
        .ok_or_else(|| ParseError::Syntax(format!("unknown column type `{type_token}` in `{def}`")))?;

    let rest: Vec<String> = iter.collect_vec();
    let upper = rest.iter().join(" ").to_ascii_uppercase();
    let is_primary = upper.contains("PRIMARY KEY");
    let is_unique = upper.contains("UNIQUE");
    let not_null = upper.contains("NOT NULL");

    Ok(ColumnDef {
        name,
        data_type,
        is_primary,
        is_unique,
        nullable: !(is_primary || not_null),
    })
}

/// Tokenizes a single column definition on whitespace, keeping a
/// single-quoted name intact and a parenthesized type modifier (e.g.
/// `VARCHAR(255)`) attached to the preceding token.
fn tokenize_column_def(def: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_quote = false;
    for c in def.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            '(' if !in_quote => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quote => {
                depth -= 1;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quote && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
        .into_iter()
        .map(|t| t.trim_matches('\'').to_string())
        .collect_vec()
}

/// Splits `s` on top-level occurrences of `delim`, respecting
/// parenthesis depth and single-quoted strings (§4.4).
pub fn split_top_level(s: &str, delim: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_quote = false;
    for c in s.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            '(' if !in_quote => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quote => {
                depth -= 1;
                current.push(c);
            }
            c if c == delim && !in_quote && depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            c => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_insert(caps: &regex::Captures) -> Result<Statement, ParseError> {
    let table = caps[1].to_string();
    let columns: Vec<String> = split_top_level(&caps[2], ',')
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect_vec();
    let values: Vec<Value> = split_top_level(&caps[3], ',')
        .into_iter()
        .map(|v| Value::parse_literal(&v))
        .collect_vec();
    Ok(Statement::Insert {
        table,
        columns,
        values,
    })
}

fn parse_optional_where(raw: Option<&str>) -> Result<Option<WhereClause>, ParseError> {
    match raw {
        None => Ok(None),
        Some(clause) => {
            let body = strip_leading_keyword(clause.trim(), "WHERE");
            Ok(WhereClause::parse(body.trim()))
        }
    }
}

fn strip_leading_keyword<'a>(s: &'a str, keyword: &str) -> &'a str {
    let s = s.trim_start();
    if s.len() >= keyword.len() && s[..keyword.len()].eq_ignore_ascii_case(keyword) {
        s[keyword.len()..].trim_start()
    } else {
        s
    }
}

fn parse_select(caps: &regex::Captures) -> Result<Statement, ParseError> {
    let projection_text = caps[1].trim();
    let table = caps[2].to_string();
    let where_clause = parse_optional_where(caps.get(3).map(|m| m.as_str()))?;

    if let Some(max_caps) = SELECT_MAX_RE.captures(projection_text) {
        if caps.get(4).is_some() || caps.get(5).is_some() {
            return Err(ParseError::Syntax(
                "ORDER BY / LIMIT are not supported with MAX(...)".to_string(),
            ));
        }
        return Ok(Statement::SelectMax {
            column: max_caps[1].to_string(),
            table,
            where_clause,
        });
    }

    let projection = if projection_text == "*" {
        Projection::Star
    } else {
        Projection::Columns(
            split_top_level(projection_text, ',')
                .into_iter()
                .map(|c| c.trim().to_string())
                .collect_vec(),
        )
    };

    let order_by = match caps.get(4) {
        Some(m) => {
            let body = strip_leading_keyword(m.as_str().trim(), "ORDER BY");
            let descending = body.to_ascii_uppercase().ends_with("DESC");
            let column = body
                .split_whitespace()
                .next()
                .ok_or_else(|| ParseError::Syntax("ORDER BY missing column".to_string()))?
                .to_string();
            Some(OrderBy { column, descending })
        }
        None => None,
    };

    let limit = match caps.get(5) {
        Some(m) => {
            let body = strip_leading_keyword(m.as_str().trim(), "LIMIT");
            Some(
                body.trim()
                    .parse::<usize>()
                    .map_err(|_| ParseError::Syntax(format!("invalid LIMIT `{body}`")))?,
            )
        }
        None => None,
    };

    Ok(Statement::Select {
        projection,
        table,
        where_clause,
        order_by,
        limit,
    })
}

fn parse_update(caps: &regex::Captures) -> Result<Statement, ParseError> {
    let table = caps[1].to_string();
    let set_clause = &caps[2];
    let where_clause = parse_optional_where(caps.get(3).map(|m| m.as_str()))?;

    let mut assignments = Vec::new();
    for part in split_top_level(set_clause, ',') {
        let (name, value) = part
            .split_once('=')
            .ok_or_else(|| ParseError::Syntax(format!("invalid SET clause `{part}`")))?;
        assignments.push((name.trim().to_string(), Value::parse_literal(value.trim())));
    }
    Ok(Statement::Update {
        table,
        assignments,
        where_clause,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TestResult;

    #[test]
    fn test_clean_collapses_whitespace() -> TestResult {
        assert_eq!(clean("  SELECT  *\nFROM   t  "), "SELECT * FROM t", "internal whitespace runs must collapse to one space");
        Ok(())
    }

    #[test]
    fn test_parses_create_table_with_constraints() -> TestResult {
        let stmt = parse("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE)")?;
        match stmt {
            Statement::CreateTable { table, columns, if_not_exists } => {
                assert_eq!(table, "users", "table name must be `users`");
                assert!(!if_not_exists, "no IF NOT EXISTS was given");
                assert_eq!(columns.len(), 3, "three columns were declared");
                assert!(columns[0].is_primary, "id must be marked primary");
                assert!(!columns[1].nullable, "NOT NULL must make name non-nullable");
                assert!(columns[2].is_unique, "email must be marked unique");
            }
            other => return Err(format!("unexpected statement: {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn test_parses_create_table_if_not_exists() -> TestResult {
        let stmt = parse("CREATE TABLE IF NOT EXISTS users (id INTEGER)")?;
        assert!(
            matches!(stmt, Statement::CreateTable { if_not_exists: true, .. }),
            "IF NOT EXISTS must be reflected in the parsed statement"
        );
        Ok(())
    }

    #[test]
    fn test_parses_alter_table_rename() -> TestResult {
        let stmt = parse("ALTER TABLE users_new RENAME TO users")?;
        assert_eq!(
            stmt,
            Statement::AlterTableRename {
                table: "users_new".to_string(),
                new_name: "users".to_string(),
            },
            "ALTER TABLE ... RENAME TO must capture both the old and new names"
        );
        Ok(())
    }

    #[test]
    fn test_parses_select_with_order_and_limit() -> TestResult {
        let stmt = parse("SELECT * FROM users WHERE age > 18 ORDER BY age DESC LIMIT 5")?;
        match stmt {
            Statement::Select { order_by, limit, where_clause, .. } => {
                assert!(where_clause.is_some(), "the WHERE clause must be parsed");
                assert_eq!(limit, Some(5), "LIMIT 5 must be captured");
                assert!(order_by.ok_or("missing ORDER BY")?.descending, "DESC must be captured");
            }
            other => return Err(format!("unexpected statement: {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn test_parses_select_max_as_scalar() -> TestResult {
        let stmt = parse("SELECT MAX(id) FROM users")?;
        assert_eq!(
            stmt,
            Statement::SelectMax {
                column: "id".to_string(),
                table: "users".to_string(),
                where_clause: None,
            },
            "SELECT MAX(id) FROM users must parse to a SelectMax statement"
        );
        Ok(())
    }

    #[test]
    fn test_insert_with_mismatched_arity_still_parses() -> TestResult {
        // §4.4: arity is an executor-level `Arity` error, not a parse failure.
        let stmt = parse("INSERT INTO users (name, email) VALUES ('A')")?;
        match stmt {
            Statement::Insert { columns, values, .. } => {
                assert_eq!(columns.len(), 2, "two columns were named");
                assert_eq!(values.len(), 1, "only one value was supplied");
            }
            other => return Err(format!("unexpected statement: {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn test_unknown_leading_keyword_is_unsupported() -> TestResult {
        let err = parse("MERGE users USING t").unwrap_err();
        assert_eq!(err, ParseError::Unsupported("MERGE".to_string()), "an unrecognized keyword must be Unsupported");
        Ok(())
    }
}

//! Safe WHERE-clause evaluation (§4.3, §9).
//!
//! The source implementation substitutes column values into the clause
//! text and hands the result to a general expression evaluator. This is
//! the explicitly called-out redesign: a small recursive-descent parser
//! and evaluator over the restricted grammar
//! `{literal | column op literal | expr AND expr | expr OR expr | (expr)}`
//! with operators `{=, <>, <, <=, >, >=}`. Nothing here ever runs a
//! general-purpose expression evaluator over untrusted text.

use crate::catalog::Row;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Comparison {
        column: String,
        op: CmpOp,
        literal: Value,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// A parsed WHERE clause, ready to be matched against rows.
#[derive(Clone, Debug, PartialEq)]
pub struct WhereClause {
    expr: Expr,
}

impl WhereClause {
    /// Parses a WHERE clause body (the text following the `WHERE` keyword,
    /// not including it). Returns `None` if the text does not conform to
    /// the restricted grammar — per §4.3, such a clause excludes every row
    /// rather than erroring.
    pub fn parse(text: &str) -> Option<WhereClause> {
        let mut tokens = tokenize(text)?;
        let expr = parse_or(&mut tokens)?;
        if tokens.is_empty() {
            Some(WhereClause { expr })
        } else {
            None
        }
    }

    /// Evaluates the clause against a row. Any structural mismatch (column
    /// entirely absent from the row, incomparable types) is a `false`
    /// match rather than an error, per §4.3.
    pub fn matches(&self, row: &Row) -> bool {
        eval(&self.expr, row)
    }
}

fn eval(expr: &Expr, row: &Row) -> bool {
    match expr {
        Expr::Comparison { column, op, literal } => {
            let Some(current) = row.get_ci(column) else {
                return false;
            };
            compare(current, op, literal)
        }
        Expr::And(lhs, rhs) => eval(lhs, row) && eval(rhs, row),
        Expr::Or(lhs, rhs) => eval(lhs, row) || eval(rhs, row),
    }
}

fn compare(left: &Value, op: &CmpOp, right: &Value) -> bool {
    match op {
        CmpOp::Eq => left.eq_sql(right),
        CmpOp::Ne => !left.eq_sql(right),
        CmpOp::Lt => matches!(left.partial_compare(right), Some(std::cmp::Ordering::Less)),
        CmpOp::Le => matches!(
            left.partial_compare(right),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
        CmpOp::Gt => matches!(left.partial_compare(right), Some(std::cmp::Ordering::Greater)),
        CmpOp::Ge => matches!(
            left.partial_compare(right),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Literal(Value),
    Op(CmpOp),
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut tokens = Vec::new();
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i] != '\'' {
                    i += 1;
                }
                if i >= chars.len() {
                    return None;
                }
                i += 1;
                let lexeme: String = chars[start..i].iter().collect();
                tokens.push(Token::Literal(Value::parse_literal(&lexeme)));
            }
            '=' => {
                tokens.push(Token::Op(CmpOp::Eq));
                i += 1;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'>') {
                    tokens.push(Token::Op(CmpOp::Ne));
                    i += 2;
                } else if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CmpOp::Le));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CmpOp::Lt));
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CmpOp::Ge));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CmpOp::Gt));
                    i += 1;
                }
            }
            _ if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' || c == '+' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                if i == start {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.to_ascii_uppercase().as_str() {
                    "AND" => tokens.push(Token::And),
                    "OR" => tokens.push(Token::Or),
                    "TRUE" | "FALSE" | "NULL" => tokens.push(Token::Literal(Value::parse_literal(&word))),
                    _ if word.parse::<i64>().is_ok() || word.parse::<f64>().is_ok() => {
                        tokens.push(Token::Literal(Value::parse_literal(&word)))
                    }
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            _ => return None,
        }
    }
    Some(tokens)
}

fn parse_or(tokens: &mut Vec<Token>) -> Option<Expr> {
    let mut lhs = parse_and(tokens)?;
    while matches!(tokens.first(), Some(Token::Or)) {
        tokens.remove(0);
        let rhs = parse_and(tokens)?;
        lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
    }
    Some(lhs)
}

fn parse_and(tokens: &mut Vec<Token>) -> Option<Expr> {
    let mut lhs = parse_atom(tokens)?;
    while matches!(tokens.first(), Some(Token::And)) {
        tokens.remove(0);
        let rhs = parse_atom(tokens)?;
        lhs = Expr::And(Box::new(lhs), Box::new(rhs));
    }
    Some(lhs)
}

fn parse_atom(tokens: &mut Vec<Token>) -> Option<Expr> {
    match tokens.first()?.clone() {
        Token::LParen => {
            tokens.remove(0);
            let inner = parse_or(tokens)?;
            match tokens.first() {
                Some(Token::RParen) => {
                    tokens.remove(0);
                    Some(inner)
                }
                _ => None,
            }
        }
        Token::Ident(column) => {
            tokens.remove(0);
            let op = match tokens.first()? {
                Token::Op(op) => op.clone(),
                _ => return None,
            };
            tokens.remove(0);
            let literal = match tokens.first()? {
                Token::Literal(v) => v.clone(),
                Token::Ident(word) => Value::parse_literal(word),
                _ => return None,
            };
            tokens.remove(0);
            Some(Expr::Comparison { column, op, literal })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Row;
    use crate::error::TestResult;

    fn row(pairs: &[(&str, Value)]) -> Row {
        let mut row = Row::new();
        for (k, v) in pairs {
            row.set(k, v.clone());
        }
        row
    }

    #[test]
    fn test_simple_equality() -> TestResult {
        let clause = WhereClause::parse("name = 'Bob'").ok_or("failed to parse WHERE clause")?;
        assert!(clause.matches(&row(&[("name", Value::Text("Bob".into()))])), "Bob must match name = 'Bob'");
        assert!(!clause.matches(&row(&[("name", Value::Text("Alice".into()))])), "Alice must not match name = 'Bob'");
        Ok(())
    }

    #[test]
    fn test_and_or_precedence_and_parens() -> TestResult {
        let clause = WhereClause::parse("(age < 18 OR age > 65) AND active = TRUE")
            .ok_or("failed to parse WHERE clause")?;
        let matching = row(&[("age", Value::Int64(70)), ("active", Value::Bool(true))]);
        let not_matching = row(&[("age", Value::Int64(30)), ("active", Value::Bool(true))]);
        assert!(clause.matches(&matching), "age 70 with active=true must satisfy the parenthesized OR plus AND");
        assert!(!clause.matches(&not_matching), "age 30 falls outside both OR branches");
        Ok(())
    }

    #[test]
    fn test_null_never_equals_anything() -> TestResult {
        let clause = WhereClause::parse("email = NULL").ok_or("failed to parse WHERE clause")?;
        assert!(!clause.matches(&row(&[("email", Value::Null)])), "Null must not equal Null under SQL semantics");
        Ok(())
    }

    #[test]
    fn test_unparseable_clause_returns_none() -> TestResult {
        assert!(WhereClause::parse("name = ").is_none(), "a dangling comparison must fail to parse");
        Ok(())
    }
}

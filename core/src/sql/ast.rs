//! Parsed statement shapes produced by [`crate::sql::parse`] (§4.4).

use crate::value::{DataType, Value};
use crate::where_eval::WhereClause;

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub is_primary: bool,
    pub is_unique: bool,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    Star,
    Columns(Vec<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    CreateTable {
        table: String,
        if_not_exists: bool,
        columns: Vec<ColumnDef>,
    },
    AlterTableAddColumn {
        table: String,
        column: ColumnDef,
    },
    AlterTableRename {
        table: String,
        new_name: String,
    },
    DropTable {
        table: String,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Value>,
    },
    Select {
        projection: Projection,
        table: String,
        where_clause: Option<WhereClause>,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
    },
    /// The single aggregate carved out of the Non-goals (§4.4 [ADDED]).
    SelectMax {
        column: String,
        table: String,
        where_clause: Option<WhereClause>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Value)>,
        where_clause: Option<WhereClause>,
    },
    Delete {
        table: String,
        where_clause: Option<WhereClause>,
    },
    CreateIndex {
        index_name: String,
        table: String,
        column: String,
    },
}

//! Structured schema introspection (§6 "Schema introspection").

use indexmap::IndexMap;

use crate::catalog::Catalog;
use crate::value::DataType;

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
    pub primary: bool,
    pub unique: bool,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableInfo {
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub name: String,
    pub tables: IndexMap<String, TableInfo>,
}

pub fn describe(catalog: &Catalog) -> Schema {
    let tables = catalog
        .tables()
        .map(|(name, table)| {
            let columns = table
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    data_type: c.data_type,
                    primary: c.is_primary,
                    unique: c.is_unique,
                    nullable: c.nullable,
                })
                .collect();
            (
                name.clone(),
                TableInfo {
                    columns,
                    row_count: table.row_count,
                },
            )
        })
        .collect();
    Schema {
        name: catalog.name.clone(),
        tables,
    }
}

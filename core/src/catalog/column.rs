use serde::{Deserialize, Serialize};

use crate::value::DataType;

/// Immutable-after-creation column metadata (§3).
///
/// Names are stored case-sensitively; SQL-facing lookups match them
/// case-insensitively (see `Table::column_index`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub is_primary: bool,
    pub is_unique: bool,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
            is_primary: false,
            is_unique: false,
            nullable: true,
        }
    }

    /// Primary implies unique and not-nullable, per the §3 invariant.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_unique = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Whether the catalog must maintain a unique-value set and index for
    /// this column.
    pub fn needs_unique_tracking(&self) -> bool {
        self.is_primary || self.is_unique
    }
}

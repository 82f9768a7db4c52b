use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A per-column secondary index: value → 1-based row positions holding it
/// (§3, invariant 2). Values are keyed by their display form since `Value`
/// carries floats and is not `Hash`/`Eq`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Index {
    entries: HashMap<String, Vec<usize>>,
}

fn index_key(value: &Value) -> Option<String> {
    if value.is_null() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Index {
    pub fn new() -> Self {
        Index::default()
    }

    pub fn insert(&mut self, value: &Value, row_id: usize) {
        if let Some(key) = index_key(value) {
            let positions = self.entries.entry(key).or_default();
            if !positions.contains(&row_id) {
                positions.push(row_id);
                positions.sort_unstable();
            }
        }
    }

    pub fn remove(&mut self, value: &Value, row_id: usize) {
        if let Some(key) = index_key(value) {
            if let Some(positions) = self.entries.get_mut(&key) {
                positions.retain(|&id| id != row_id);
                if positions.is_empty() {
                    self.entries.remove(&key);
                }
            }
        }
    }

    pub fn lookup(&self, value: &Value) -> &[usize] {
        index_key(value)
            .and_then(|key| self.entries.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rebuilds the index from scratch against the given rows' current
    /// positions (1-based). Used after `delete` renumbers rows, and when
    /// loading a snapshot.
    pub fn rebuild<'a>(rows: impl Iterator<Item = (usize, &'a Value)>) -> Self {
        let mut index = Index::new();
        for (row_id, value) in rows {
            index.insert(value, row_id);
        }
        index
    }
}

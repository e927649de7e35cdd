//! The library card catalog: family on one axis, format+weight+style on the other
//!
//! Built once from the discovered records and never touched again, so any
//! number of request handlers can read it at the same time without locks.
//!
//! Made at FontLab https://www.fontlab.com/

use std::collections::HashMap;
use std::sync::Arc;

use crate::font::FontRecord;
use crate::query::LookupKey;

/// Two-level map `family -> column key -> record`.
#[derive(Debug, Default, Clone)]
pub struct FontIndex {
    rows: HashMap<String, HashMap<String, Arc<FontRecord>>>,
}

impl FontIndex {
    /// Index every record; later duplicates replace earlier ones.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = FontRecord>,
    {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, record: FontRecord) {
        let column = record.column_key();
        self.rows
            .entry(record.family.clone())
            .or_default()
            .insert(column, Arc::new(record));
    }

    pub fn lookup(&self, key: &LookupKey) -> Option<&Arc<FontRecord>> {
        self.rows.get(&key.family)?.get(&key.column_key)
    }

    /// Number of distinct `(family, column key)` entries.
    pub fn len(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

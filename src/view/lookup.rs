use anyhow::Result;
use std::collections::HashMap;

use crate::logging::log_fetch_failed;
use crate::model::Reference;

/// What a foreign key shows when the reference row is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The literal `N/A`.
    NotAvailable,
    /// The identifier itself.
    RawId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

/// A reference collection indexed by key, built once per fetch.
///
/// Joins are best effort: an unloaded or failed collection labels every key
/// with the fallback and offers only the placeholder option.
#[derive(Debug, Clone)]
pub struct Lookup<R> {
    rows: Vec<R>,
    index: HashMap<i64, usize>,
    placeholder: &'static str,
    fallback: Fallback,
    loaded: bool,
}

impl<R: Reference> Lookup<R> {
    pub fn new(placeholder: &'static str, fallback: Fallback) -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
            placeholder,
            fallback,
            loaded: false,
        }
    }

    pub fn load(&mut self, res: Result<Vec<R>>) {
        match res {
            Ok(rows) => {
                let mut index = HashMap::with_capacity(rows.len());
                for (i, r) in rows.iter().enumerate() {
                    // first row wins on duplicate keys
                    index.entry(r.key()).or_insert(i);
                }
                self.rows = rows;
                self.index = index;
                self.loaded = true;
            }
            Err(e) => log_fetch_failed(R::PATH, &e),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn get(&self, key: i64) -> Option<&R> {
        self.index.get(&key).and_then(|&i| self.rows.get(i))
    }

    /// Label of the referenced row. A blank label counts as a miss when the
    /// fallback is the raw identifier.
    pub fn label(&self, key: i64) -> String {
        let found = self.get(key).map(|r| r.label());
        match (found, self.fallback) {
            (Some(l), Fallback::RawId) if l.trim().is_empty() => key.to_string(),
            (Some(l), _) => l,
            (None, Fallback::NotAvailable) => "N/A".to_string(),
            (None, Fallback::RawId) => key.to_string(),
        }
    }

    /// Placeholder first, then every row in fetch order.
    pub fn options(&self) -> Vec<SelectOption> {
        let mut out = vec![SelectOption { value: 0, label: self.placeholder.to_string() }];
        out.extend(self.rows.iter().map(|r| SelectOption { value: r.key(), label: r.label() }));
        out
    }
}

//! Entity schemas exchanged with the planning API.
//!
//! Each mutable entity has a matching draft: the edit-buffer payload that is
//! sent on create/update. Drafts never carry the identifier; identifiers are
//! assigned by the server and only ever read locally.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::Hash;

mod progress;
mod reference;
mod task;
mod task_detail;
mod work_program;

pub use progress::{DailyProgress, DailyProgressDraft};
pub use reference::{Boq, Project};
pub use task::{Task, TaskDraft};
pub use task_detail::{TaskDetail, TaskDetailDraft};
pub use work_program::{WorkProgram, WorkProgramDraft};

pub trait Draft: Clone + Default + PartialEq + fmt::Debug + Serialize + Send + Sync {
    /// Fields the form marks as required.
    const REQUIRED: &'static [&'static str];
    /// Foreign-key fields, where 0 means nothing was selected.
    const FOREIGN_KEYS: &'static [&'static str] = &[];

    /// Assign one form field from its text value.
    fn set(&mut self, field: &str, value: &str) -> Result<()>;

    /// Current text value of a field, `None` for unknown names.
    fn get(&self, field: &str) -> Option<String>;

    fn missing_required(&self) -> Vec<&'static str> {
        Self::REQUIRED
            .iter()
            .copied()
            .filter(|f| match self.get(f) {
                Some(v) if Self::FOREIGN_KEYS.contains(f) => is_unselected(&v),
                Some(v) => v.trim().is_empty(),
                None => true,
            })
            .collect()
    }
}

pub trait Entity:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: Copy + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;
    type Draft: Draft;

    /// Collection path below the schema prefix.
    const PATH: &'static str;
    /// Human name used in alerts and logs.
    const LABEL: &'static str;
    const CONFIRM_DELETE: bool = false;
    const MESSAGES: Messages = Messages::DEFAULT;

    fn id(&self) -> Self::Id;

    /// Copy of the editable fields, for filling the edit buffer.
    fn draft(&self) -> Self::Draft;

    /// Merge submitted fields into this record. The identifier is untouched.
    fn apply(&mut self, draft: &Self::Draft);
}

/// Alert texts for the outcome of each mutation. Failure texts are prefixes
/// followed by the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub inserted: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub insert_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Messages {
    pub const DEFAULT: Messages = Messages {
        inserted: "Data Successfully Inserted!",
        updated: "Data Successfully Updated!",
        deleted: "Data Successfully Deleted!",
        insert_failed: "Insert failed",
        update_failed: "Update failed",
        delete_failed: "Delete failed",
    };
}

/// Read-only collection used to label foreign keys.
pub trait Reference: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    const PATH: &'static str;

    fn key(&self) -> i64;
    fn label(&self) -> String;
}

/// Empty or zero foreign-key value.
pub fn is_unselected(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == "0"
}

pub(crate) fn parse_fk(field: &str, value: &str) -> Result<i64> {
    let v = value.trim();
    if v.is_empty() {
        return Ok(0);
    }
    v.parse::<i64>()
        .map_err(|_| anyhow!("invalid {}: {:?} is not an identifier", field, value))
}

pub(crate) fn unknown_field(entity: &str, field: &str) -> anyhow::Error {
    anyhow!("unknown field {} for {}", field, entity)
}

/// Accepts a string, a number or null and keeps it as text.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_text(deserializer)?.unwrap_or_default())
}

pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}

/// Accepts an integer or its string form; null reads as 0.
pub(crate) fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected integer, got {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected integer, got {:?}", s))),
        other => Err(serde::de::Error::custom(format!("expected integer, got {}", other))),
    }
}

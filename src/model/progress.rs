use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{int, parse_fk, text, unknown_field, Draft, Entity, Messages};

/// Daily progress monitoring entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyProgress {
    #[serde(deserialize_with = "int")]
    pub progress_id: i64,
    #[serde(deserialize_with = "int")]
    pub task_id: i64,
    #[serde(deserialize_with = "text")]
    pub quantity: String,
    #[serde(deserialize_with = "text")]
    pub date: String,
    #[serde(deserialize_with = "text")]
    pub remark: String,
    #[serde(deserialize_with = "text")]
    pub created_at: String,
    #[serde(deserialize_with = "text")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyProgressDraft {
    pub task_id: i64,
    pub quantity: String,
    pub date: String,
    pub remark: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Draft for DailyProgressDraft {
    const REQUIRED: &'static [&'static str] =
        &["task_id", "quantity", "date", "created_at", "updated_at"];
    const FOREIGN_KEYS: &'static [&'static str] = &["task_id"];

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "task_id" => self.task_id = parse_fk(field, value)?,
            "quantity" => self.quantity = value.to_string(),
            "date" => self.date = value.to_string(),
            "remark" => self.remark = value.to_string(),
            "created_at" => self.created_at = value.to_string(),
            "updated_at" => self.updated_at = value.to_string(),
            _ => return Err(unknown_field(DailyProgress::LABEL, field)),
        }
        Ok(())
    }

    fn get(&self, field: &str) -> Option<String> {
        Some(match field {
            "task_id" => self.task_id.to_string(),
            "quantity" => self.quantity.clone(),
            "date" => self.date.clone(),
            "remark" => self.remark.clone(),
            "created_at" => self.created_at.clone(),
            "updated_at" => self.updated_at.clone(),
            _ => return None,
        })
    }
}

impl Entity for DailyProgress {
    type Id = i64;
    type Draft = DailyProgressDraft;

    const PATH: &'static str = "daily_progress_monitoring";
    const LABEL: &'static str = "progress entry";
    const CONFIRM_DELETE: bool = true;
    const MESSAGES: Messages = Messages {
        inserted: "Progress Added!",
        updated: "Progress Updated!",
        deleted: "Progress Deleted!",
        ..Messages::DEFAULT
    };

    fn id(&self) -> i64 {
        self.progress_id
    }

    fn draft(&self) -> DailyProgressDraft {
        DailyProgressDraft {
            task_id: self.task_id,
            quantity: self.quantity.clone(),
            date: self.date.clone(),
            remark: self.remark.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn apply(&mut self, d: &DailyProgressDraft) {
        self.task_id = d.task_id;
        self.quantity = d.quantity.clone();
        self.date = d.date.clone();
        self.remark = d.remark.clone();
        self.created_at = d.created_at.clone();
        self.updated_at = d.updated_at.clone();
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{int, parse_fk, text, unknown_field, Draft, Entity};

/// Completion percentage recorded against a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDetail {
    #[serde(deserialize_with = "int")]
    pub task_detail_id: i64,
    #[serde(deserialize_with = "int")]
    pub task_id: i64,
    #[serde(deserialize_with = "text")]
    pub percentage: String,
    #[serde(deserialize_with = "text")]
    pub created_at: String,
    #[serde(deserialize_with = "text")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskDetailDraft {
    pub task_id: i64,
    pub percentage: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Draft for TaskDetailDraft {
    const REQUIRED: &'static [&'static str] = &["task_id", "percentage", "created_at", "updated_at"];
    const FOREIGN_KEYS: &'static [&'static str] = &["task_id"];

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "task_id" => self.task_id = parse_fk(field, value)?,
            "percentage" => self.percentage = value.to_string(),
            "created_at" => self.created_at = value.to_string(),
            "updated_at" => self.updated_at = value.to_string(),
            _ => return Err(unknown_field(TaskDetail::LABEL, field)),
        }
        Ok(())
    }

    fn get(&self, field: &str) -> Option<String> {
        Some(match field {
            "task_id" => self.task_id.to_string(),
            "percentage" => self.percentage.clone(),
            "created_at" => self.created_at.clone(),
            "updated_at" => self.updated_at.clone(),
            _ => return None,
        })
    }
}

impl Entity for TaskDetail {
    type Id = i64;
    type Draft = TaskDetailDraft;

    const PATH: &'static str = "task_details";
    const LABEL: &'static str = "task detail";

    fn id(&self) -> i64 {
        self.task_detail_id
    }

    fn draft(&self) -> TaskDetailDraft {
        TaskDetailDraft {
            task_id: self.task_id,
            percentage: self.percentage.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn apply(&mut self, d: &TaskDetailDraft) {
        self.task_id = d.task_id;
        self.percentage = d.percentage.clone();
        self.created_at = d.created_at.clone();
        self.updated_at = d.updated_at.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_percentage_is_kept_as_text() {
        let td: TaskDetail =
            serde_json::from_str(r#"{"task_detail_id": 1, "task_id": 2, "percentage": 40}"#).unwrap();
        assert_eq!(td.percentage, "40");
    }

    #[test]
    fn zero_percentage_is_present() {
        let d = TaskDetailDraft {
            task_id: 2,
            percentage: "0".into(),
            created_at: "2025-01-01T09:00".into(),
            updated_at: "2025-01-01T09:00".into(),
        };
        assert!(d.missing_required().is_empty());
    }
}

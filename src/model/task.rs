use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{int, parse_fk, text, unknown_field, Draft, Entity, Messages, Reference};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "int")]
    pub task_id: i64,
    #[serde(deserialize_with = "int")]
    pub work_program_id: i64,
    #[serde(deserialize_with = "text")]
    pub task_name: String,
    #[serde(deserialize_with = "text")]
    pub start_date: String,
    #[serde(deserialize_with = "text")]
    pub end_date: String,
    #[serde(deserialize_with = "text")]
    pub remark: String,
    #[serde(deserialize_with = "text")]
    pub created_at: String,
    #[serde(deserialize_with = "text")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskDraft {
    pub work_program_id: i64,
    pub task_name: String,
    pub start_date: String,
    pub end_date: String,
    pub remark: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Draft for TaskDraft {
    const REQUIRED: &'static [&'static str] = &[
        "work_program_id",
        "task_name",
        "start_date",
        "end_date",
        "created_at",
        "updated_at",
    ];
    const FOREIGN_KEYS: &'static [&'static str] = &["work_program_id"];

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "work_program_id" => self.work_program_id = parse_fk(field, value)?,
            "task_name" => self.task_name = value.to_string(),
            "start_date" => self.start_date = value.to_string(),
            "end_date" => self.end_date = value.to_string(),
            "remark" => self.remark = value.to_string(),
            "created_at" => self.created_at = value.to_string(),
            "updated_at" => self.updated_at = value.to_string(),
            _ => return Err(unknown_field(Task::LABEL, field)),
        }
        Ok(())
    }

    fn get(&self, field: &str) -> Option<String> {
        Some(match field {
            "work_program_id" => self.work_program_id.to_string(),
            "task_name" => self.task_name.clone(),
            "start_date" => self.start_date.clone(),
            "end_date" => self.end_date.clone(),
            "remark" => self.remark.clone(),
            "created_at" => self.created_at.clone(),
            "updated_at" => self.updated_at.clone(),
            _ => return None,
        })
    }
}

impl Entity for Task {
    type Id = i64;
    type Draft = TaskDraft;

    const MESSAGES: Messages = Messages {
        inserted: "Task added successfully",
        updated: "Task updated successfully",
        deleted: "Task deleted successfully",
        insert_failed: "Add failed",
        ..Messages::DEFAULT
    };

    const PATH: &'static str = "task";
    const LABEL: &'static str = "task";

    fn id(&self) -> i64 {
        self.task_id
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft {
            work_program_id: self.work_program_id,
            task_name: self.task_name.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            remark: self.remark.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn apply(&mut self, d: &TaskDraft) {
        self.work_program_id = d.work_program_id;
        self.task_name = d.task_name.clone();
        self.start_date = d.start_date.clone();
        self.end_date = d.end_date.clone();
        self.remark = d.remark.clone();
        self.created_at = d.created_at.clone();
        self.updated_at = d.updated_at.clone();
    }
}

impl Reference for Task {
    const PATH: &'static str = "task";

    fn key(&self) -> i64 {
        self.task_id
    }

    fn label(&self) -> String {
        self.task_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_foreign_key() {
        let mut d = TaskDraft::default();
        d.set("work_program_id", "3").unwrap();
        assert_eq!(d.work_program_id, 3);
        assert!(d.set("work_program_id", "x").is_err());
        assert_eq!(d.work_program_id, 3);
    }

    #[test]
    fn remark_is_optional() {
        let d = TaskDraft {
            work_program_id: 1,
            task_name: "Excavate footing".into(),
            start_date: "2025-01-02".into(),
            end_date: "2025-01-09".into(),
            remark: String::new(),
            created_at: "2025-01-01T09:00".into(),
            updated_at: "2025-01-01T09:00".into(),
        };
        assert!(d.missing_required().is_empty());
    }
}

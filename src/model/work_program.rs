use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{int, parse_fk, text, unknown_field, Draft, Entity, Reference};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkProgram {
    #[serde(deserialize_with = "int")]
    pub work_program_id: i64,
    #[serde(deserialize_with = "int")]
    pub project_id: i64,
    #[serde(deserialize_with = "int")]
    pub boq_id: i64,
    #[serde(deserialize_with = "text")]
    pub work_name: String,
    #[serde(deserialize_with = "text")]
    pub start_date: String,
    #[serde(deserialize_with = "text")]
    pub end_date: String,
    #[serde(deserialize_with = "text")]
    pub remarks: String,
    #[serde(deserialize_with = "text")]
    pub created_at: String,
    #[serde(deserialize_with = "text")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkProgramDraft {
    pub project_id: i64,
    pub boq_id: i64,
    pub work_name: String,
    pub start_date: String,
    pub end_date: String,
    pub remarks: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Draft for WorkProgramDraft {
    const REQUIRED: &'static [&'static str] = &[
        "project_id",
        "boq_id",
        "work_name",
        "start_date",
        "end_date",
        "created_at",
        "updated_at",
    ];
    const FOREIGN_KEYS: &'static [&'static str] = &["project_id", "boq_id"];

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "project_id" => self.project_id = parse_fk(field, value)?,
            "boq_id" => self.boq_id = parse_fk(field, value)?,
            "work_name" => self.work_name = value.to_string(),
            "start_date" => self.start_date = value.to_string(),
            "end_date" => self.end_date = value.to_string(),
            "remarks" => self.remarks = value.to_string(),
            "created_at" => self.created_at = value.to_string(),
            "updated_at" => self.updated_at = value.to_string(),
            _ => return Err(unknown_field(WorkProgram::LABEL, field)),
        }
        Ok(())
    }

    fn get(&self, field: &str) -> Option<String> {
        Some(match field {
            "project_id" => self.project_id.to_string(),
            "boq_id" => self.boq_id.to_string(),
            "work_name" => self.work_name.clone(),
            "start_date" => self.start_date.clone(),
            "end_date" => self.end_date.clone(),
            "remarks" => self.remarks.clone(),
            "created_at" => self.created_at.clone(),
            "updated_at" => self.updated_at.clone(),
            _ => return None,
        })
    }
}

impl Entity for WorkProgram {
    type Id = i64;
    type Draft = WorkProgramDraft;

    const PATH: &'static str = "work_program";
    const LABEL: &'static str = "work program";

    fn id(&self) -> i64 {
        self.work_program_id
    }

    fn draft(&self) -> WorkProgramDraft {
        WorkProgramDraft {
            project_id: self.project_id,
            boq_id: self.boq_id,
            work_name: self.work_name.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            remarks: self.remarks.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn apply(&mut self, d: &WorkProgramDraft) {
        self.project_id = d.project_id;
        self.boq_id = d.boq_id;
        self.work_name = d.work_name.clone();
        self.start_date = d.start_date.clone();
        self.end_date = d.end_date.clone();
        self.remarks = d.remarks.clone();
        self.created_at = d.created_at.clone();
        self.updated_at = d.updated_at.clone();
    }
}

// Tasks label their parent by work name.
impl Reference for WorkProgram {
    const PATH: &'static str = "work_program";

    fn key(&self) -> i64 {
        self.work_program_id
    }

    fn label(&self) -> String {
        self.work_name.clone()
    }
}

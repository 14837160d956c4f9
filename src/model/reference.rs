use serde::{Deserialize, Serialize};

use super::{int, text, Reference};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "int")]
    pub project_id: i64,
    #[serde(deserialize_with = "text")]
    pub project_name: String,
    #[serde(deserialize_with = "text")]
    pub start_date: String,
    #[serde(deserialize_with = "text")]
    pub end_date: String,
}

/// Bill of quantities. Opaque beyond its title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boq {
    #[serde(deserialize_with = "int")]
    pub boq_id: i64,
    #[serde(deserialize_with = "text")]
    pub title: String,
}

impl Reference for Project {
    const PATH: &'static str = "projects";

    fn key(&self) -> i64 {
        self.project_id
    }

    fn label(&self) -> String {
        self.project_name.clone()
    }
}

impl Reference for Boq {
    const PATH: &'static str = "boqs";

    fn key(&self) -> i64 {
        self.boq_id
    }

    fn label(&self) -> String {
        self.title.clone()
    }
}

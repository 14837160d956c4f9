use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join3;

use crate::api::{ReferenceClient, SharedBackend};
use crate::model::{parse_fk, Boq, Project, WorkProgram};
use crate::view::{Fallback, Lookup, Page, ResourceView, SelectOption, Table};

pub struct WorkProgramPage {
    view: ResourceView<WorkProgram>,
    projects_client: ReferenceClient<Project>,
    boqs_client: ReferenceClient<Boq>,
    projects: Lookup<Project>,
    boqs: Lookup<Boq>,
}

impl WorkProgramPage {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            view: ResourceView::new(backend.clone()),
            projects_client: ReferenceClient::new(backend.clone()),
            boqs_client: ReferenceClient::new(backend),
            projects: Lookup::new("Select Project", Fallback::RawId),
            boqs: Lookup::new("Select BOQ", Fallback::RawId),
        }
    }

    pub fn projects(&self) -> &Lookup<Project> {
        &self.projects
    }

    pub fn boqs(&self) -> &Lookup<Boq> {
        &self.boqs
    }

    /// Choosing a project copies its schedule into the form dates. The dates
    /// stay editable and are only overwritten by the next project choice.
    pub fn select_project(&mut self, project_id: i64) {
        let (start, end) = match self.projects.get(project_id) {
            Some(p) => (p.start_date.clone(), p.end_date.clone()),
            None => (String::new(), String::new()),
        };
        let buf = self.view.buffer_mut();
        buf.project_id = project_id;
        buf.start_date = start;
        buf.end_date = end;
    }
}

#[async_trait]
impl Page for WorkProgramPage {
    type Entity = WorkProgram;

    const TITLE: &'static str = "Work Programs";

    async fn mount(&mut self) {
        self.view.begin_load();
        let (programs, projects, boqs) = join3(
            self.view.client().list(),
            self.projects_client.list(),
            self.boqs_client.list(),
        )
        .await;
        self.view.load(programs);
        self.projects.load(projects);
        self.boqs.load(boqs);
    }

    fn view(&self) -> &ResourceView<WorkProgram> {
        &self.view
    }

    fn view_mut(&mut self) -> &mut ResourceView<WorkProgram> {
        &mut self.view
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        if field == "project_id" {
            let id = parse_fk(field, value)?;
            self.select_project(id);
            return Ok(());
        }
        self.view.set_field(field, value)
    }

    fn table(&self) -> Table {
        let mut t = Table::new(&[
            "Work ID",
            "Project Name",
            "Title",
            "Work Name",
            "Start Date",
            "End Date",
            "Remarks",
            "Created At",
            "Updated At",
        ]);
        for wp in self.view.items() {
            t.push(vec![
                wp.work_program_id.to_string(),
                self.projects.label(wp.project_id),
                self.boqs.label(wp.boq_id),
                wp.work_name.clone(),
                wp.start_date.clone(),
                wp.end_date.clone(),
                wp.remarks.clone(),
                wp.created_at.clone(),
                wp.updated_at.clone(),
            ]);
        }
        t
    }

    fn options(&self) -> Vec<(&'static str, Vec<SelectOption>)> {
        vec![("project_id", self.projects.options()), ("boq_id", self.boqs.options())]
    }
}

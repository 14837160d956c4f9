use async_trait::async_trait;
use futures_util::future::join;

use crate::api::{ReferenceClient, SharedBackend};
use crate::model::{Task, WorkProgram};
use crate::view::{Fallback, Lookup, Page, ResourceView, SelectOption, Table};

pub struct TaskPage {
    view: ResourceView<Task>,
    programs_client: ReferenceClient<WorkProgram>,
    programs: Lookup<WorkProgram>,
}

impl TaskPage {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            view: ResourceView::new(backend.clone()),
            programs_client: ReferenceClient::new(backend),
            programs: Lookup::new("Select Work Program", Fallback::NotAvailable),
        }
    }
}

#[async_trait]
impl Page for TaskPage {
    type Entity = Task;

    const TITLE: &'static str = "Tasks";

    async fn mount(&mut self) {
        self.view.begin_load();
        let (tasks, programs) = join(self.view.client().list(), self.programs_client.list()).await;
        self.view.load(tasks);
        self.programs.load(programs);
    }

    fn view(&self) -> &ResourceView<Task> {
        &self.view
    }

    fn view_mut(&mut self) -> &mut ResourceView<Task> {
        &mut self.view
    }

    fn table(&self) -> Table {
        let mut t = Table::new(&[
            "Task ID",
            "Work Program",
            "Task Name",
            "Start Date",
            "End Date",
            "Remark",
            "Created At",
            "Updated At",
        ]);
        for task in self.view.items() {
            t.push(vec![
                task.task_id.to_string(),
                self.programs.label(task.work_program_id),
                task.task_name.clone(),
                task.start_date.clone(),
                task.end_date.clone(),
                task.remark.clone(),
                task.created_at.clone(),
                task.updated_at.clone(),
            ]);
        }
        t
    }

    fn options(&self) -> Vec<(&'static str, Vec<SelectOption>)> {
        vec![("work_program_id", self.programs.options())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn orphan_task_shows_not_available() {
        let mem = Arc::new(
            MemoryBackend::new()
                .with_collection(
                    "task",
                    "task_id",
                    vec![
                        json!({"task_id": 1, "work_program_id": 1, "task_name": "Excavate footing"}),
                        json!({"task_id": 2, "work_program_id": 9, "task_name": "Pour slab"}),
                    ],
                )
                .with_collection(
                    "work_program",
                    "work_program_id",
                    vec![json!({"work_program_id": 1, "work_name": "Substructure"})],
                ),
        );
        let mut page = TaskPage::new(mem);
        page.mount().await;
        let t = page.table();
        assert_eq!(t.rows[0][1], "Substructure");
        assert_eq!(t.rows[1][1], "N/A");
        let opts = &page.options()[0].1;
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[1].label, "Substructure");
    }
}

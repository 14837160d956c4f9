use async_trait::async_trait;
use futures_util::future::join;

use crate::api::{ReferenceClient, SharedBackend};
use crate::model::{Task, TaskDetail};
use crate::view::{Fallback, Lookup, Page, ResourceView, SelectOption, Table};

pub struct TaskDetailPage {
    view: ResourceView<TaskDetail>,
    tasks_client: ReferenceClient<Task>,
    tasks: Lookup<Task>,
}

impl TaskDetailPage {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            view: ResourceView::new(backend.clone()),
            tasks_client: ReferenceClient::new(backend),
            tasks: Lookup::new("Select Task", Fallback::NotAvailable),
        }
    }

    pub fn tasks(&self) -> &Lookup<Task> {
        &self.tasks
    }
}

#[async_trait]
impl Page for TaskDetailPage {
    type Entity = TaskDetail;

    const TITLE: &'static str = "Task Details";

    async fn mount(&mut self) {
        self.view.begin_load();
        let (details, tasks) = join(self.view.client().list(), self.tasks_client.list()).await;
        self.view.load(details);
        self.tasks.load(tasks);
    }

    fn view(&self) -> &ResourceView<TaskDetail> {
        &self.view
    }

    fn view_mut(&mut self) -> &mut ResourceView<TaskDetail> {
        &mut self.view
    }

    fn table(&self) -> Table {
        let mut t = Table::new(&["Task Detail ID", "Task Name", "Percentage", "Created At", "Updated At"]);
        for td in self.view.items() {
            t.push(vec![
                td.task_detail_id.to_string(),
                self.tasks.label(td.task_id),
                td.percentage.clone(),
                td.created_at.clone(),
                td.updated_at.clone(),
            ]);
        }
        t
    }

    fn options(&self) -> Vec<(&'static str, Vec<SelectOption>)> {
        vec![("task_id", self.tasks.options())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn unloaded_tasks_offer_only_placeholder() {
        let mem = Arc::new(
            MemoryBackend::new()
                .with_collection(
                    "task_details",
                    "task_detail_id",
                    vec![json!({"task_detail_id": 1, "task_id": 3, "percentage": 40})],
                )
                .with_collection("task", "task_id", vec![json!({"task_id": 3, "task_name": "Formwork"})]),
        );
        mem.fail_next("GET", "task", "Network Error");
        let mut page = TaskDetailPage::new(mem);
        page.mount().await;
        assert_eq!(page.options()[0].1.len(), 1);
        assert_eq!(page.table().rows[0], vec!["1", "N/A", "40", "", ""]);
        assert!(!page.tasks().is_loaded());
    }
}

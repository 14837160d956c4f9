use async_trait::async_trait;
use futures_util::future::join;

use crate::api::{ReferenceClient, SharedBackend};
use crate::model::{DailyProgress, Task};
use crate::view::{Fallback, Lookup, Page, ResourceView, SelectOption, Table};

/// Daily progress entries. Deleting one asks for confirmation first.
pub struct ProgressPage {
    view: ResourceView<DailyProgress>,
    tasks_client: ReferenceClient<Task>,
    tasks: Lookup<Task>,
}

impl ProgressPage {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            view: ResourceView::new(backend.clone()),
            tasks_client: ReferenceClient::new(backend),
            tasks: Lookup::new("Select Task", Fallback::NotAvailable),
        }
    }
}

#[async_trait]
impl Page for ProgressPage {
    type Entity = DailyProgress;

    const TITLE: &'static str = "Daily Progress";

    async fn mount(&mut self) {
        self.view.begin_load();
        let (entries, tasks) = join(self.view.client().list(), self.tasks_client.list()).await;
        self.view.load(entries);
        self.tasks.load(tasks);
    }

    fn view(&self) -> &ResourceView<DailyProgress> {
        &self.view
    }

    fn view_mut(&mut self) -> &mut ResourceView<DailyProgress> {
        &mut self.view
    }

    fn table(&self) -> Table {
        let mut t = Table::new(&[
            "Progress ID",
            "Task Name",
            "Quantity",
            "Date",
            "Remark",
            "Created At",
            "Updated At",
        ]);
        for entry in self.view.items() {
            t.push(vec![
                entry.progress_id.to_string(),
                self.tasks.label(entry.task_id),
                entry.quantity.clone(),
                entry.date.clone(),
                entry.remark.clone(),
                entry.created_at.clone(),
                entry.updated_at.clone(),
            ]);
        }
        t
    }

    fn options(&self) -> Vec<(&'static str, Vec<SelectOption>)> {
        vec![("task_id", self.tasks.options())]
    }
}

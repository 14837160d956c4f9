//! End-to-end behaviour of the resource pages against an in-memory backend.
//!
//! Each test mounts a page the way the console does, drives the form, and
//! checks the local collection against what the backend ended up holding.

use std::sync::Arc;

use serde_json::json;

use cerp_console::api::MemoryBackend;
use cerp_console::view::{Mode, Page, ProgressPage, TaskPage, WorkProgramPage};

fn task_backend() -> Arc<MemoryBackend> {
    Arc::new(
        MemoryBackend::new()
            .with_collection(
                "task",
                "task_id",
                vec![
                    json!({"task_id": 1, "work_program_id": 1, "task_name": "Excavate footing",
                           "start_date": "2025-01-01", "end_date": "2025-01-15", "remark": "grid A",
                           "created_at": "2025-01-01T08:00", "updated_at": "2025-01-01T08:00"}),
                    json!({"task_id": 2, "work_program_id": 2, "task_name": "Pour slab",
                           "start_date": "2025-02-01", "end_date": "2025-02-10", "remark": "",
                           "created_at": "2025-01-02T08:00", "updated_at": "2025-01-02T08:00"}),
                ],
            )
            .with_collection(
                "work_program",
                "work_program_id",
                vec![
                    json!({"work_program_id": 1, "work_name": "Substructure"}),
                    json!({"work_program_id": 2, "work_name": "Superstructure"}),
                ],
            ),
    )
}

fn fill_task(page: &mut TaskPage, name: &str) {
    for (k, v) in [
        ("work_program_id", "2"),
        ("task_name", name),
        ("start_date", "2025-03-01"),
        ("end_date", "2025-03-05"),
        ("created_at", "2025-02-20T09:00"),
        ("updated_at", "2025-02-20T09:00"),
    ] {
        page.set_field(k, v).unwrap();
    }
}

#[tokio::test]
async fn create_appends_once_with_server_identifier() {
    let mem = task_backend();
    let mut page = TaskPage::new(mem.clone());
    page.mount().await;
    let before: Vec<_> = page.view().items().to_vec();

    page.view_mut().add();
    fill_task(&mut page, "Formwork");
    assert!(page.view_mut().submit().await);

    let items = page.view().items();
    assert_eq!(items.len(), before.len() + 1);
    assert_eq!(&items[..before.len()], &before[..]);
    let created = items.last().unwrap();
    assert_eq!(created.task_id, 3);
    assert_eq!(created.task_name, "Formwork");
    assert_eq!(mem.rows("task").len(), 3);

    assert_eq!(page.view().mode(), Mode::Idle);
    assert!(!page.view().form_visible());
    let alerts = page.view_mut().take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, "Task added successfully");
    assert_eq!(page.table().rows[2][1], "Superstructure");
}

#[tokio::test]
async fn update_merges_only_submitted_record() {
    let mut page = TaskPage::new(task_backend());
    page.mount().await;
    let untouched = page.view().find(2).cloned().unwrap();

    assert!(page.view_mut().edit(1));
    assert_eq!(page.view().buffer().task_name, "Excavate footing");
    page.set_field("task_name", "Excavate footing grid B").unwrap();
    page.set_field("remark", "").unwrap();
    assert!(page.view_mut().submit().await);

    let items = page.view().items();
    assert_eq!(items.len(), 2);
    let edited = page.view().find(1).unwrap();
    assert_eq!(edited.task_name, "Excavate footing grid B");
    assert_eq!(edited.remark, "");
    assert_eq!(edited.start_date, "2025-01-01");
    assert_eq!(page.view().find(2).unwrap(), &untouched);
    assert_eq!(page.view().editing(), None);
}

#[tokio::test]
async fn delete_removes_exactly_one() {
    let mem = task_backend();
    let mut page = TaskPage::new(mem.clone());
    page.mount().await;

    let mut never = |_: &str| -> bool { panic!("tasks delete without confirmation") };
    assert!(page.view_mut().delete(1, &mut never).await);
    assert_eq!(page.view().items().len(), 1);
    assert!(page.view().find(1).is_none());
    assert_eq!(mem.rows("task").len(), 1);
    assert_eq!(page.view().alerts()[0].message, "Task deleted successfully");
}

#[tokio::test]
async fn failed_delete_leaves_collection_unchanged() {
    let mem = task_backend();
    let mut page = TaskPage::new(mem.clone());
    page.mount().await;
    let digest = page.view().digest();

    mem.fail_next("DELETE", "task/2", "500 - constraint violation");
    let mut yes = |_: &str| true;
    assert!(!page.view_mut().delete(2, &mut yes).await);

    assert_eq!(page.view().digest(), digest);
    let alerts = page.view().alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].is_failure());
    assert!(alerts[0].message.starts_with("Delete failed:"));
    assert!(alerts[0].message.contains("constraint violation"));
}

#[tokio::test]
async fn rejected_update_keeps_buffer_and_collection() {
    let mem = task_backend();
    let mut page = TaskPage::new(mem.clone());
    page.mount().await;
    let digest = page.view().digest();

    page.view_mut().edit(2);
    page.set_field("task_name", "Pour slab level 2").unwrap();
    let buffer = page.view().buffer().clone();
    mem.fail_next("PUT", "task/2", "400 - end_date before start_date");
    assert!(!page.view_mut().submit().await);

    assert_eq!(page.view().buffer(), &buffer);
    assert_eq!(page.view().mode(), Mode::Editing);
    assert_eq!(page.view().editing(), Some(2));
    assert_eq!(page.view().digest(), digest);
    let alerts = page.view().alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message.starts_with("Update failed:"));

    // A retry from the kept buffer goes through.
    assert!(page.view_mut().submit().await);
    assert_eq!(page.view().find(2).unwrap().task_name, "Pour slab level 2");
}

#[tokio::test]
async fn rejected_create_keeps_buffer_and_collection() {
    let mem = task_backend();
    let mut page = TaskPage::new(mem.clone());
    page.mount().await;
    let digest = page.view().digest();

    page.view_mut().add();
    fill_task(&mut page, "Formwork");
    let buffer = page.view().buffer().clone();
    mem.fail_next("POST", "task", "Network Error");
    assert!(!page.view_mut().submit().await);

    assert_eq!(page.view().buffer(), &buffer);
    assert_eq!(page.view().mode(), Mode::Editing);
    assert!(page.view().form_visible());
    assert_eq!(page.view().editing(), None);
    assert_eq!(page.view().digest(), digest);
    assert_eq!(mem.rows("task").len(), 2);
    let alerts = page.view().alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].is_failure());
    assert!(alerts[0].message.starts_with("Add failed:"));
    assert!(alerts[0].message.contains("Network Error"));
}

#[tokio::test]
async fn incomplete_form_never_reaches_backend() {
    let mem = task_backend();
    let mut page = TaskPage::new(mem.clone());
    page.mount().await;
    let requests = mem.requests().len();

    page.view_mut().add();
    page.set_field("task_name", "Backfill").unwrap();
    assert!(!page.view_mut().submit().await);

    assert_eq!(mem.requests().len(), requests);
    assert_eq!(page.view().items().len(), 2);
    let alerts = page.view().alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message.contains("work_program_id"));
    assert_eq!(page.view().buffer().task_name, "Backfill");
}

fn program_backend() -> Arc<MemoryBackend> {
    Arc::new(
        MemoryBackend::new()
            .with_collection("work_program", "work_program_id", vec![])
            .with_collection(
                "projects",
                "project_id",
                vec![
                    json!({"project_id": 7, "project_name": "Depot", "start_date": "2025-01-01", "end_date": "2025-06-30"}),
                    json!({"project_id": 8, "project_name": "Annex", "start_date": "2025-03-01", "end_date": "2025-09-30"}),
                ],
            )
            .with_collection("boqs", "boq_id", vec![json!({"boq_id": 3, "title": "Civil works"})]),
    )
}

#[tokio::test]
async fn project_selection_fills_dates_until_next_selection() {
    let mut page = WorkProgramPage::new(program_backend());
    page.mount().await;
    assert_eq!(page.projects().rows().len(), 2);
    assert!(page.boqs().is_loaded());
    page.view_mut().add();

    page.set_field("project_id", "7").unwrap();
    assert_eq!(page.view().buffer().start_date, "2025-01-01");
    assert_eq!(page.view().buffer().end_date, "2025-06-30");

    page.set_field("end_date", "2025-05-31").unwrap();
    page.set_field("work_name", "Substructure").unwrap();
    assert_eq!(page.view().buffer().end_date, "2025-05-31");

    page.set_field("project_id", "8").unwrap();
    assert_eq!(page.view().buffer().start_date, "2025-03-01");
    assert_eq!(page.view().buffer().end_date, "2025-09-30");
    assert_eq!(page.view().buffer().work_name, "Substructure");

    page.set_field("project_id", "99").unwrap();
    assert_eq!(page.view().buffer().start_date, "");
    assert_eq!(page.view().buffer().end_date, "");
}

#[tokio::test]
async fn created_program_labels_its_references() {
    let mut page = WorkProgramPage::new(program_backend());
    page.mount().await;
    page.view_mut().add();
    for (k, v) in [
        ("project_id", "7"),
        ("boq_id", "3"),
        ("work_name", "Substructure"),
        ("created_at", "2025-01-01T08:00"),
        ("updated_at", "2025-01-01T08:00"),
    ] {
        page.set_field(k, v).unwrap();
    }
    assert!(page.view_mut().submit().await);
    let row = &page.table().rows[0];
    assert_eq!(row[0], "1");
    assert_eq!(row[1], "Depot");
    assert_eq!(row[2], "Civil works");
}

#[tokio::test]
async fn progress_delete_needs_confirmation() {
    let mem = Arc::new(
        MemoryBackend::new()
            .with_collection(
                "daily_progress_monitoring",
                "progress_id",
                vec![json!({"progress_id": 4, "task_id": 1, "quantity": "3", "date": "2025-01-10"})],
            )
            .with_collection("task", "task_id", vec![]),
    );
    let mut page = ProgressPage::new(mem.clone());
    page.mount().await;

    let mut no = |_: &str| false;
    assert!(!page.view_mut().delete(4, &mut no).await);
    assert_eq!(mem.rows("daily_progress_monitoring").len(), 1);

    let mut yes = |_: &str| true;
    assert!(page.view_mut().delete(4, &mut yes).await);
    assert!(mem.rows("daily_progress_monitoring").is_empty());
    assert!(page.view().items().is_empty());
    assert_eq!(page.view().alerts()[0].message, "Progress Deleted!");
}

#[tokio::test]
async fn blank_reference_names_show_identifiers() {
    let mem = Arc::new(
        MemoryBackend::new()
            .with_collection(
                "work_program",
                "work_program_id",
                vec![json!({"work_program_id": 1, "project_id": 7, "boq_id": 3, "work_name": "Substructure"})],
            )
            .with_collection("projects", "project_id", vec![json!({"project_id": 7, "project_name": ""})])
            .with_collection("boqs", "boq_id", vec![json!({"boq_id": 3, "title": null})]),
    );
    let mut page = WorkProgramPage::new(mem);
    page.mount().await;
    let row = &page.table().rows[0];
    assert_eq!(row[1], "7");
    assert_eq!(row[2], "3");
}

//! Resource views: one entity collection, its edit buffer and the
//! reconciliation of local state after each remote mutation.
//!
//! A view owns a snapshot of the remote collection taken at mount time and
//! keeps it in step with its own successful mutations only. Nothing is
//! shared between views; reloading a page re-fetches from the server.
//!
//! State machine:
//!
//! ```text
//!   Idle --add/edit--> Editing --submit--> Submitting --ok--> Idle
//!     ^                  |  ^                  |
//!     +-----cancel-------+  +------failure-----+
//! ```

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::api::{ResourceClient, SharedBackend};
use crate::logging::{log_alert, log_fetch_failed, log_mutation, log_view_state};
use crate::model::{Draft, Entity};

mod lookup;
mod progress;
mod table;
mod task;
mod task_detail;
mod work_program;

pub use lookup::{Fallback, Lookup, SelectOption};
pub use progress::ProgressPage;
pub use table::Table;
pub use task::TaskPage;
pub use task_detail::TaskDetailPage;
pub use work_program::WorkProgramPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Editing,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Failure,
}

/// Operator-facing notice raised by a mutation or a rejected form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn is_failure(&self) -> bool {
        self.kind == AlertKind::Failure
    }
}

/// Interactive yes/no question asked before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this entry?";

pub struct ResourceView<E: Entity> {
    client: ResourceClient<E>,
    items: Vec<E>,
    buffer: E::Draft,
    editing: Option<E::Id>,
    mode: Mode,
    alerts: Vec<Alert>,
    loading: bool,
}

impl<E: Entity> ResourceView<E> {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            client: ResourceClient::new(backend),
            items: Vec::new(),
            buffer: E::Draft::default(),
            editing: None,
            mode: Mode::Idle,
            alerts: Vec::new(),
            loading: false,
        }
    }

    pub fn client(&self) -> &ResourceClient<E> {
        &self.client
    }

    /// Fetch the collection. A failed fetch is logged and leaves it empty.
    pub async fn mount(&mut self) {
        self.loading = true;
        let res = self.client.list().await;
        self.load(res);
    }

    /// Install the result of a list fetch issued elsewhere.
    pub fn load(&mut self, res: Result<Vec<E>>) {
        self.loading = false;
        match res {
            Ok(items) => self.items = items,
            Err(e) => log_fetch_failed(E::PATH, &e),
        }
        self.trace_state();
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Text shown in place of an empty table.
    pub fn empty_message(&self) -> &'static str {
        if self.loading {
            "Loading..."
        } else {
            "(no entries)"
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn find(&self, id: E::Id) -> Option<&E> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn buffer(&self) -> &E::Draft {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut E::Draft {
        &mut self.buffer
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.buffer.set(field, value)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn editing(&self) -> Option<E::Id> {
        self.editing
    }

    pub fn form_visible(&self) -> bool {
        self.mode != Mode::Idle
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    /// Blank form in create mode.
    pub fn add(&mut self) {
        self.buffer = E::Draft::default();
        self.editing = None;
        self.mode = Mode::Editing;
    }

    /// Copy the record into the form. Unknown ids change nothing.
    pub fn edit(&mut self, id: E::Id) -> bool {
        let Some(draft) = self.find(id).map(|e| e.draft()) else {
            return false;
        };
        self.buffer = draft;
        self.editing = Some(id);
        self.mode = Mode::Editing;
        true
    }

    pub fn cancel(&mut self) {
        self.buffer = E::Draft::default();
        self.editing = None;
        self.mode = Mode::Idle;
    }

    /// Send the form. On success the local collection is reconciled and the
    /// form closes; on failure the form stays open with the buffer intact.
    pub async fn submit(&mut self) -> bool {
        if self.mode == Mode::Idle {
            return false;
        }
        let missing = self.buffer.missing_required();
        if !missing.is_empty() {
            self.alert(AlertKind::Failure, format!("Please fill out: {}", missing.join(", ")));
            return false;
        }

        self.mode = Mode::Submitting;
        let ok = match self.editing {
            Some(id) => self.submit_update(id).await,
            None => self.submit_create().await,
        };
        if ok {
            self.cancel();
        } else {
            self.mode = Mode::Editing;
        }
        self.trace_state();
        ok
    }

    async fn submit_create(&mut self) -> bool {
        match self.client.create(&self.buffer).await {
            Ok(created) => {
                let id = created.id().to_string();
                self.items.push(created);
                log_mutation(E::PATH, "create", Some(&id), "ok");
                self.alert(AlertKind::Success, E::MESSAGES.inserted.to_string());
                true
            }
            Err(e) => {
                log_mutation(E::PATH, "create", None, "failed");
                self.alert(AlertKind::Failure, format!("{}: {}", E::MESSAGES.insert_failed, e));
                false
            }
        }
    }

    async fn submit_update(&mut self, id: E::Id) -> bool {
        match self.client.update(id, &self.buffer).await {
            Ok(_) => {
                // Merge what was submitted rather than the server echo.
                if let Some(item) = self.items.iter_mut().find(|e| e.id() == id) {
                    item.apply(&self.buffer);
                }
                log_mutation(E::PATH, "update", Some(&id.to_string()), "ok");
                self.alert(AlertKind::Success, E::MESSAGES.updated.to_string());
                true
            }
            Err(e) => {
                log_mutation(E::PATH, "update", Some(&id.to_string()), "failed");
                self.alert(AlertKind::Failure, format!("{}: {}", E::MESSAGES.update_failed, e));
                false
            }
        }
    }

    /// Delete by identifier. Entities that require it ask `confirm` first; a
    /// declined confirmation sends nothing.
    pub async fn delete(&mut self, id: E::Id, confirm: &mut dyn Confirm) -> bool {
        if E::CONFIRM_DELETE && !confirm.confirm(DELETE_PROMPT) {
            return false;
        }
        let ok = match self.client.delete(id).await {
            Ok(()) => {
                self.items.retain(|e| e.id() != id);
                log_mutation(E::PATH, "delete", Some(&id.to_string()), "ok");
                self.alert(AlertKind::Success, E::MESSAGES.deleted.to_string());
                true
            }
            Err(e) => {
                log_mutation(E::PATH, "delete", Some(&id.to_string()), "failed");
                self.alert(AlertKind::Failure, format!("{}: {}", E::MESSAGES.delete_failed, e));
                false
            }
        };
        self.trace_state();
        ok
    }

    /// sha256 over the serialized collection.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(&self.items).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }

    fn alert(&mut self, kind: AlertKind, message: String) {
        log_alert(E::PATH, kind == AlertKind::Failure, &message);
        self.alerts.push(Alert { kind, message });
    }

    fn trace_state(&self) {
        log_view_state(E::PATH, self.items.len(), &self.digest());
    }
}

/// A page of the console: one resource view plus the reference
/// collections its foreign keys are labelled from.
#[async_trait]
pub trait Page: Send {
    type Entity: Entity;

    const TITLE: &'static str;

    /// Fetch the collection and its references concurrently.
    async fn mount(&mut self);

    fn view(&self) -> &ResourceView<Self::Entity>;
    fn view_mut(&mut self) -> &mut ResourceView<Self::Entity>;

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.view_mut().set_field(field, value)
    }

    /// The collection as displayed, foreign keys joined to labels.
    fn table(&self) -> Table;

    /// Dropdown choices of the form, keyed by field name.
    fn options(&self) -> Vec<(&'static str, Vec<SelectOption>)>;
}

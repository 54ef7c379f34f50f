use std::time::{Duration, Instant};

use super::form::TaskForm;
use crate::task::{Task, TaskId};

pub const PAGE_SIZE: usize = 4;
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

/// Everything the terminal client holds locally. Nothing here is sent to the
/// service except through explicit actions in the event loop.
#[derive(Debug, Clone)]
pub struct ClientState {
    /// Last fetched list, patched locally after create and delete.
    pub tasks: Vec<Task>,
    /// 1-based.
    pub current_page: usize,
    /// Index of the highlighted card within the current page.
    pub selected: usize,
    pub dark_mode: bool,
    /// `Some` while the create modal is open.
    pub modal: Option<TaskForm>,
    /// Deletion waiting for confirmation.
    pub confirm_delete: Option<TaskId>,
    pub notification: Option<Notification>,
}

impl ClientState {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            tasks: Vec::new(),
            current_page: 1,
            selected: 0,
            dark_mode,
            modal: None,
            confirm_delete: None,
            notification: None,
        }
    }

    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.clamp_view();
    }

    pub fn page_count(&self) -> usize {
        self.tasks.len().div_ceil(PAGE_SIZE)
    }

    /// The slice of already-fetched tasks shown on the current page.
    pub fn page_tasks(&self) -> &[Task] {
        let start = ((self.current_page - 1) * PAGE_SIZE).min(self.tasks.len());
        let end = (start + PAGE_SIZE).min(self.tasks.len());
        &self.tasks[start..end]
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.page_count().max(1));
        self.selected = 0;
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.page_tasks().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.page_tasks().get(self.selected)
    }

    /// Flips the theme and returns the new value for persisting.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    pub fn open_modal(&mut self) {
        self.modal = Some(TaskForm::new());
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Marks the highlighted task for deletion. Nothing is sent yet.
    pub fn request_delete(&mut self) {
        self.confirm_delete = self.selected_task().map(|t| t.id);
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = None;
    }

    /// Takes the confirmed target; the caller issues the request.
    pub fn take_delete_target(&mut self) -> Option<TaskId> {
        self.confirm_delete.take()
    }

    /// Appends the record the service returned and closes the form.
    pub fn task_created(&mut self, task: Task) {
        self.tasks.push(task);
        self.close_modal();
        self.notify_success("Task created successfully");
    }

    pub fn task_deleted(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
        self.clamp_view();
        self.notify_success("Task deleted successfully");
    }

    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message.into());
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message.into());
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        self.notification = Some(Notification {
            kind,
            message,
            shown_at: Instant::now(),
        });
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTIFICATION_TTL)
        {
            self.notification = None;
        }
    }

    fn clamp_view(&mut self) {
        self.current_page = self.current_page.clamp(1, self.page_count().max(1));
        let on_page = self.page_tasks().len();
        self.selected = self.selected.min(on_page.saturating_sub(1));
    }
}

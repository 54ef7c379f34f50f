//! Terminal client: renders the task list, submits creates and deletes, and
//! keeps view-only state (page, theme, dialogs) locally.

mod api;
mod form;
mod prefs;
mod state;
mod ui;

pub use api::{ApiError, TaskApi};
pub use form::{FormField, TaskForm};
pub use prefs::Preferences;
pub use state::{ClientState, Notification, NotificationKind, PAGE_SIZE};
pub use ui::render;

use chrono::Local;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{backend::Backend, Terminal};
use std::{
    io,
    path::Path,
    time::{Duration, Instant},
};
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the client until the user quits. The list is fetched once on start;
/// afterwards only explicit actions talk to the service.
pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    api: &TaskApi,
    prefs_path: &Path,
) -> io::Result<()> {
    let mut state = ClientState::new(Preferences::load(prefs_path).dark_mode);
    fetch_tasks(&mut state, api).await;

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);

    loop {
        state.expire_notification(Instant::now());
        terminal.draw(|f| render(f, &state))?;

        tokio::select! {
            _ = ticker.tick() => {}
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut state, key, api, prefs_path).await == Flow::Quit {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            },
        }
    }
}

async fn fetch_tasks(state: &mut ClientState, api: &TaskApi) {
    match api.list().await {
        Ok(tasks) => {
            info!(count = tasks.len(), "Fetched tasks");
            state.set_tasks(tasks);
        }
        Err(err) => {
            warn!(error = %err, "Failed to fetch tasks");
            state.notify_error(err.user_message("Error loading tasks"));
        }
    }
}

async fn handle_key(
    state: &mut ClientState,
    key: KeyEvent,
    api: &TaskApi,
    prefs_path: &Path,
) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    if state.confirm_delete.is_some() {
        handle_confirm_key(state, key, api).await;
    } else if state.is_modal_open() {
        handle_form_key(state, key, api).await;
    } else {
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('n') => state.open_modal(),
            KeyCode::Char('t') => {
                let dark_mode = state.toggle_dark_mode();
                if let Err(err) = (Preferences { dark_mode }).save(prefs_path) {
                    warn!(error = %err, "Failed to save preferences");
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => state.request_delete(),
            KeyCode::Char('r') => fetch_tasks(state, api).await,
            KeyCode::Left => state.prev_page(),
            KeyCode::Right => state.next_page(),
            KeyCode::Up => state.select_prev(),
            KeyCode::Down => state.select_next(),
            _ => {}
        }
    }
    Flow::Continue
}

async fn handle_confirm_key(state: &mut ClientState, key: KeyEvent, api: &TaskApi) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            let Some(id) = state.take_delete_target() else {
                return;
            };
            match api.delete(id).await {
                Ok(_) => {
                    info!(%id, "Deleted task");
                    state.task_deleted(id);
                }
                Err(err) => {
                    warn!(%id, error = %err, "Failed to delete task");
                    state.notify_error(err.user_message("Error deleting task"));
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => state.cancel_delete(),
        _ => {}
    }
}

async fn handle_form_key(state: &mut ClientState, key: KeyEvent, api: &TaskApi) {
    let Some(form) = state.modal.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => state.close_modal(),
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left if form.focus == FormField::Status => form.cycle_status(-1),
        KeyCode::Right if form.focus == FormField::Status => form.cycle_status(1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input(c),
        KeyCode::Enter => {
            let Some(draft) = form.submit(Local::now().date_naive()) else {
                return;
            };
            match api.create(&draft).await {
                Ok(task) => {
                    info!(id = %task.id, "Created task");
                    state.task_created(task);
                }
                Err(err) => {
                    warn!(error = %err, "Failed to create task");
                    state.notify_error(err.user_message("Error creating task"));
                }
            }
        }
        _ => {}
    }
}

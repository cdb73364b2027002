use std::sync::Arc;
use std::time::Instant;

use ratatui::style::{Color, Style};
use tokio::runtime::Runtime;
use tracing::warn;

use super::constants::*;
use super::field::TextField;
use super::helpers::{clamp_index, palette, Palette};
use crate::config::AppConfig;
use crate::core::{Board, LoadError, Panel, Preferences, Workbench, WorkbenchResult};
use crate::model::{ProjectId, ResourceId, TaskId};
use crate::store::Store;

mod input;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
    Jump,
    Help,
    Confirm,
    Notice,
}

/// The surface receiving keys, derived from the workbench after every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Board,
    Jobs,
    Resources,
    ProjectEditor,
    TaskEditor,
    Picker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectField {
    Name,
    Bucket,
    Notes,
    Tasks,
}

const PROJECT_FIELDS: [ProjectField; 4] = [
    ProjectField::Name,
    ProjectField::Bucket,
    ProjectField::Notes,
    ProjectField::Tasks,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskField {
    Name,
    Project,
    Notes,
    Duration,
    Dependency,
    Resources,
}

const TASK_FIELDS: [TaskField; 6] = [
    TaskField::Name,
    TaskField::Project,
    TaskField::Notes,
    TaskField::Duration,
    TaskField::Dependency,
    TaskField::Resources,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmTarget {
    Project,
    Task,
    ProjectTask(TaskId),
    Resource(ResourceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    fn toggle(self) -> Self {
        match self {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoardRow {
    Project(ProjectId),
    Task(ProjectId, TaskId),
}

fn board_columns(board: &Board) -> Vec<Vec<BoardRow>> {
    board
        .buckets
        .iter()
        .map(|bucket| {
            bucket
                .projects
                .iter()
                .flat_map(|project| {
                    std::iter::once(BoardRow::Project(project.id)).chain(
                        project
                            .tasks
                            .iter()
                            .map(move |task| BoardRow::Task(project.id, task.id)),
                    )
                })
                .collect()
        })
        .collect()
}

pub(crate) struct App {
    config: AppConfig,
    runtime: Runtime,
    workbench: Workbench,
    preferences: Preferences,
    input_mode: InputMode,
    field: TextField,
    surface: Surface,
    focus: usize,
    selected: usize,
    picker_selected: usize,
    column: usize,
    row: usize,
    confirm: Option<ConfirmTarget>,
    confirm_choice: ConfirmChoice,
    notice: Option<String>,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(
        config: AppConfig,
        runtime: Runtime,
        store: Arc<dyn Store>,
        preferences: Preferences,
    ) -> Self {
        let mut app = Self {
            config,
            runtime,
            workbench: Workbench::new(store),
            preferences,
            input_mode: InputMode::Normal,
            field: TextField::new(),
            surface: Surface::Board,
            focus: 0,
            selected: 0,
            picker_selected: 0,
            column: 0,
            row: 0,
            confirm: None,
            confirm_choice: ConfirmChoice::No,
            notice: None,
            status: None,
            should_quit: false,
        };
        app.reload();
        app
    }

    pub(crate) fn on_tick(&mut self) {
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn palette(&self) -> Palette {
        palette(self.preferences.dark_mode)
    }

    fn current_surface(&self) -> Surface {
        let dialogs = self.workbench.dialogs();
        if dialogs.picker().is_some() {
            Surface::Picker
        } else if dialogs.task().is_some() {
            Surface::TaskEditor
        } else if dialogs.project().is_some() {
            Surface::ProjectEditor
        } else {
            match self.workbench.panel() {
                Panel::Jobs(_) => Surface::Jobs,
                Panel::Resources(_) => Surface::Resources,
                Panel::None => Surface::Board,
            }
        }
    }

    /// Re-derives the focused surface after a workbench action and resets focus when it changed.
    fn sync_surface(&mut self) {
        let next = self.current_surface();
        let previous = self.surface;
        if next == previous {
            return;
        }
        self.surface = next;
        match (previous, next) {
            (Surface::TaskEditor, Surface::Picker) => {
                self.picker_selected = 0;
                self.set_status_info(STATUS_PICKER);
                return;
            }
            (Surface::Picker, Surface::TaskEditor) => return,
            (Surface::TaskEditor | Surface::Picker, Surface::ProjectEditor) => {
                self.focus = PROJECT_FIELDS.len() - 1;
                self.selected = 0;
            }
            _ => {
                self.focus = 0;
                self.selected = 0;
            }
        }
        match next {
            Surface::ProjectEditor => self.set_status_info(STATUS_PROJECT_EDITOR),
            Surface::TaskEditor => self.set_status_info(STATUS_TASK_EDITOR),
            _ => {}
        }
        self.load_field();
    }

    fn project_field(&self) -> ProjectField {
        PROJECT_FIELDS[clamp_index(self.focus, PROJECT_FIELDS.len())]
    }

    fn task_field(&self) -> TaskField {
        TASK_FIELDS[clamp_index(self.focus, TASK_FIELDS.len())]
    }

    /// Copies the focused form value into the edit field.
    fn load_field(&mut self) {
        let text = match self.surface {
            Surface::ProjectEditor => {
                let field = self.project_field();
                self.workbench.project_form_mut().and_then(|form| match field {
                    ProjectField::Name => Some(form.name.clone()),
                    ProjectField::Bucket => Some(form.bucket.clone()),
                    ProjectField::Notes => Some(form.notes.clone()),
                    ProjectField::Tasks => None,
                })
            }
            Surface::TaskEditor => {
                let field = self.task_field();
                self.workbench.task_form_mut().and_then(|form| match field {
                    TaskField::Name => Some(form.name.clone()),
                    TaskField::Notes => Some(form.notes.clone()),
                    TaskField::Duration => Some(form.duration.clone()),
                    _ => None,
                })
            }
            _ => None,
        };
        match text {
            Some(text) => self.field.set(text),
            None => self.field.clear(),
        }
    }

    /// Writes the edit field back into the focused form value.
    fn store_field(&mut self) {
        let text = self.field.as_str().to_string();
        match self.surface {
            Surface::ProjectEditor => {
                let field = self.project_field();
                if let Some(form) = self.workbench.project_form_mut() {
                    match field {
                        ProjectField::Name => form.name = text,
                        ProjectField::Bucket => form.bucket = text,
                        ProjectField::Notes => form.notes = text,
                        ProjectField::Tasks => {}
                    }
                }
            }
            Surface::TaskEditor => {
                let field = self.task_field();
                if let Some(form) = self.workbench.task_form_mut() {
                    match field {
                        TaskField::Name => form.name = text,
                        TaskField::Notes => form.notes = text,
                        TaskField::Duration => form.duration = text,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn focus_step(&mut self, forward: bool) {
        let len = match self.surface {
            Surface::ProjectEditor => PROJECT_FIELDS.len(),
            Surface::TaskEditor => TASK_FIELDS.len(),
            _ => return,
        };
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
        self.selected = 0;
        self.load_field();
    }

    fn board(&self) -> Option<Board> {
        self.workbench.board().ok()
    }

    fn selected_board_row(&self) -> Option<BoardRow> {
        let board = self.board()?;
        let columns = board_columns(&board);
        columns.get(self.column)?.get(self.row).copied()
    }

    fn clamp_board_cursor(&mut self) {
        let columns = self.board().map(|b| board_columns(&b)).unwrap_or_default();
        self.column = clamp_index(self.column, columns.len());
        let rows = columns.get(self.column).map_or(0, Vec::len);
        self.row = clamp_index(self.row, rows);
    }

    /// Applies the outcome of a workbench action: a blocking notice on failure.
    fn finish<T>(&mut self, result: WorkbenchResult<T>, success: &str) -> Option<T> {
        let value = match result {
            Ok(value) => {
                if !success.is_empty() {
                    self.set_status_info(success);
                }
                Some(value)
            }
            Err(err) => {
                self.show_notice(err.to_string());
                None
            }
        };
        self.sync_surface();
        self.clamp_board_cursor();
        value
    }

    fn finish_load(&mut self, result: Result<(), LoadError>, success: &str) {
        match result {
            Ok(()) => {
                if !success.is_empty() {
                    self.set_status_info(success);
                }
            }
            Err(err) => self.set_status_error(err.to_string()),
        }
        self.sync_surface();
        self.clamp_board_cursor();
    }

    fn show_notice(&mut self, message: String) {
        warn!(error = %message, "action failed");
        self.notice = Some(message);
        self.input_mode = InputMode::Notice;
    }

    fn reload(&mut self) {
        let result = self.runtime.block_on(self.workbench.load_projects());
        self.finish_load(result, STATUS_REFRESHED);
    }

    fn show_projects(&mut self) {
        let result = self.runtime.block_on(self.workbench.show_projects());
        self.finish_load(result, "");
    }

    fn open_jobs(&mut self) {
        let result = self.runtime.block_on(self.workbench.open_jobs_board());
        self.finish(result, "Jobs board");
    }

    fn open_resources(&mut self) {
        let result = self.runtime.block_on(self.workbench.open_resource_manager());
        self.finish(result, "Resource manager");
    }

    fn new_project(&mut self) {
        let result = self.runtime.block_on(self.workbench.open_project_editor(None));
        self.finish(result, "");
    }

    fn open_board_selection(&mut self) {
        let result = match self.selected_board_row() {
            Some(BoardRow::Project(project)) => self
                .runtime
                .block_on(self.workbench.open_project_editor(Some(project))),
            Some(BoardRow::Task(project, task)) => {
                self.runtime.block_on(self.workbench.open_task(project, task))
            }
            None => {
                self.set_status_info("Nothing selected");
                return;
            }
        };
        self.finish(result, "");
    }

    fn jump_to_task(&mut self) {
        let raw = self.field.as_str().trim().to_string();
        self.field.clear();
        self.input_mode = InputMode::Normal;
        let Ok(id) = raw.parse::<i64>() else {
            self.set_status_error(format!("'{raw}' is not a task id"));
            return;
        };
        let result = self
            .runtime
            .block_on(self.workbench.open_task_standalone(TaskId(id)));
        self.finish(result, "");
    }

    fn toggle_theme(&mut self) {
        self.preferences.toggle_dark_mode();
        let label = if self.preferences.dark_mode {
            "Dark mode on"
        } else {
            "Dark mode off"
        };
        match self.preferences.save(&self.config.preferences_path()) {
            Ok(()) => self.set_status_info(label),
            Err(err) => self.set_status_error(format!("{label} (not saved: {err})")),
        }
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("ℹ️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("⚠️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}

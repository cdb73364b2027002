use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::Panel;
use crate::tui::constants::{STATUS_CONFIRM_DELETE, STATUS_HELP, STATUS_JUMP, STATUS_SEARCH};
use crate::tui::helpers::clamp_index;

use super::{
    board_columns, App, ConfirmChoice, ConfirmTarget, InputMode, ProjectField, Surface, TaskField,
};

#[derive(Debug, Clone, Copy)]
enum BoardAction {
    Quit,
    ShowHelp,
    Search,
    Jump,
    ClearFilter,
    NewProject,
    Open,
    Reload,
    ToggleTheme,
    ShowProjects,
    ShowJobs,
    ShowResources,
    SelectNext,
    SelectPrev,
    NextColumn,
    PrevColumn,
}

impl BoardAction {
    fn from_event(key: &KeyEvent) -> Option<Self> {
        if is_ctrl(key, 'c') {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('?') | KeyCode::Char('h') => Some(Self::ShowHelp),
            KeyCode::Char('/') => Some(Self::Search),
            KeyCode::Char(':') => Some(Self::Jump),
            KeyCode::Esc => Some(Self::ClearFilter),
            KeyCode::Char('n') => Some(Self::NewProject),
            KeyCode::Enter => Some(Self::Open),
            KeyCode::Char('r') => Some(Self::Reload),
            KeyCode::Char('t') => Some(Self::ToggleTheme),
            KeyCode::Char('1') => Some(Self::ShowProjects),
            KeyCode::Char('2') => Some(Self::ShowJobs),
            KeyCode::Char('3') => Some(Self::ShowResources),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => Some(Self::NextColumn),
            KeyCode::Left | KeyCode::BackTab => Some(Self::PrevColumn),
            _ => None,
        }
    }
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

fn ctrl_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(ch) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ch.to_ascii_lowercase())
        }
        _ => None,
    }
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Notice => {
                self.notice = None;
                self.input_mode = InputMode::Normal;
            }
            InputMode::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
                ) {
                    self.input_mode = InputMode::Normal;
                    self.status = None;
                }
            }
            InputMode::Confirm => self.handle_confirm(key),
            InputMode::Search => self.handle_search(key),
            InputMode::Jump => self.handle_jump(key),
            InputMode::Normal => match self.surface {
                Surface::Board => self.handle_board(key),
                Surface::Jobs => self.handle_jobs(key),
                Surface::Resources => self.handle_resources(key),
                Surface::ProjectEditor => self.handle_project_editor(key),
                Surface::TaskEditor => self.handle_task_editor(key),
                Surface::Picker => self.handle_picker(key),
            },
        }
    }

    fn handle_board(&mut self, key: KeyEvent) {
        let Some(action) = BoardAction::from_event(&key) else {
            return;
        };
        match action {
            BoardAction::Quit => self.should_quit = true,
            BoardAction::ShowHelp => {
                self.input_mode = InputMode::Help;
                self.set_status_info(STATUS_HELP);
            }
            BoardAction::Search => {
                self.field.set(self.workbench.filter().to_string());
                self.input_mode = InputMode::Search;
                self.set_status_info(STATUS_SEARCH);
            }
            BoardAction::Jump => {
                self.field.clear();
                self.input_mode = InputMode::Jump;
                self.set_status_info(STATUS_JUMP);
            }
            BoardAction::ClearFilter => {
                if !self.workbench.filter().is_empty() {
                    self.workbench.set_filter("");
                    self.clamp_board_cursor();
                    self.set_status_info("Cleared search");
                }
            }
            BoardAction::NewProject => self.new_project(),
            BoardAction::Open => self.open_board_selection(),
            BoardAction::Reload => self.reload(),
            BoardAction::ToggleTheme => self.toggle_theme(),
            BoardAction::ShowProjects => self.show_projects(),
            BoardAction::ShowJobs => self.open_jobs(),
            BoardAction::ShowResources => self.open_resources(),
            BoardAction::SelectNext => {
                self.row += 1;
                self.clamp_board_cursor();
            }
            BoardAction::SelectPrev => {
                self.row = self.row.saturating_sub(1);
            }
            BoardAction::NextColumn => {
                let columns = self.board().map(|b| board_columns(&b).len()).unwrap_or(0);
                if columns > 0 {
                    self.column = (self.column + 1) % columns;
                    self.clamp_board_cursor();
                }
            }
            BoardAction::PrevColumn => {
                let columns = self.board().map(|b| board_columns(&b).len()).unwrap_or(0);
                if columns > 0 {
                    self.column = (self.column + columns - 1) % columns;
                    self.clamp_board_cursor();
                }
            }
        }
    }

    fn handle_search(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.field.clear();
                self.workbench.set_filter("");
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            _ => {
                if self.edit_field(key) {
                    self.workbench.set_filter(self.field.as_str().to_string());
                }
            }
        }
        self.row = 0;
        self.column = 0;
        self.clamp_board_cursor();
    }

    fn handle_jump(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.field.clear();
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Enter => self.jump_to_task(),
            KeyCode::Char(ch) if !ch.is_ascii_digit() => {}
            _ => {
                self.edit_field(key);
            }
        }
    }

    /// Applies a text-editing key to the edit field; returns whether it was consumed.
    fn edit_field(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Char(ch) => self.field.insert_char(ch),
            KeyCode::Backspace => self.field.backspace(),
            KeyCode::Delete => self.field.delete_char(),
            KeyCode::Left => self.field.move_left(),
            KeyCode::Right => self.field.move_right(),
            KeyCode::Home => self.field.move_home(),
            KeyCode::End => self.field.move_end(),
            _ => return false,
        }
        true
    }

    fn handle_project_editor(&mut self, key: KeyEvent) {
        if let Some(ch) = ctrl_char(&key) {
            match ch {
                's' => {
                    let result = self.runtime.block_on(self.workbench.save_project());
                    self.finish(result, "Saved project");
                }
                'd' => {
                    let deletable = self
                        .workbench
                        .dialogs()
                        .project()
                        .is_some_and(|editor| editor.can_delete());
                    if deletable {
                        self.prompt_confirm(ConfirmTarget::Project);
                    } else {
                        self.set_status_info("Nothing to delete until the project is saved");
                    }
                }
                'n' => self.add_task(),
                'c' => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.runtime.block_on(self.workbench.cancel_project());
                self.finish(Ok(()), "");
            }
            KeyCode::Tab => self.focus_step(true),
            KeyCode::BackTab => self.focus_step(false),
            _ => match self.project_field() {
                ProjectField::Tasks => self.handle_project_tasks(key),
                _ => match key.code {
                    KeyCode::Down | KeyCode::Enter => self.focus_step(true),
                    KeyCode::Up => self.focus_step(false),
                    _ => {
                        if self.edit_field(key) {
                            self.store_field();
                        }
                    }
                },
            },
        }
    }

    fn handle_project_tasks(&mut self, key: KeyEvent) {
        let tasks: Vec<_> = self
            .workbench
            .dialogs()
            .project()
            .map(|editor| editor.tasks().iter().map(|task| task.id).collect())
            .unwrap_or_default();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = clamp_index(self.selected + 1, tasks.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected == 0 {
                    self.focus_step(false);
                } else {
                    self.selected -= 1;
                }
            }
            KeyCode::Enter => {
                if let Some(task) = tasks.get(self.selected).copied() {
                    let result = self
                        .runtime
                        .block_on(self.workbench.open_task_from_project(Some(task)));
                    self.finish(result, "");
                }
            }
            KeyCode::Char('a') | KeyCode::Char('+') => self.add_task(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(task) = tasks.get(self.selected).copied() {
                    self.prompt_confirm(ConfirmTarget::ProjectTask(task));
                }
            }
            _ => {}
        }
    }

    fn add_task(&mut self) {
        let result = self.runtime.block_on(self.workbench.add_task());
        self.finish(result, "");
    }

    fn handle_task_editor(&mut self, key: KeyEvent) {
        if let Some(ch) = ctrl_char(&key) {
            match ch {
                's' => {
                    let result = self.runtime.block_on(self.workbench.save_task());
                    self.finish(result, "Saved task");
                }
                'd' => {
                    let existing = self
                        .workbench
                        .dialogs()
                        .task()
                        .is_some_and(|editor| editor.id().is_some());
                    if existing {
                        self.prompt_confirm(ConfirmTarget::Task);
                    } else {
                        self.runtime.block_on(self.workbench.cancel_task());
                        self.finish(Ok(()), "Discarded new task");
                    }
                }
                't' => {
                    let result = self.runtime.block_on(self.workbench.start_task());
                    self.finish(result, "Started task");
                }
                'f' => {
                    let result = self.runtime.block_on(self.workbench.finish_task());
                    self.finish(result, "Finished task");
                }
                'r' => self.open_picker(),
                'c' => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.runtime.block_on(self.workbench.cancel_task());
                self.finish(Ok(()), "");
            }
            KeyCode::Tab => self.focus_step(true),
            KeyCode::BackTab => self.focus_step(false),
            _ => match self.task_field() {
                TaskField::Resources => self.handle_task_resources(key),
                TaskField::Project => match key.code {
                    KeyCode::Left => self.cycle_project(false),
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_project(true),
                    KeyCode::Down | KeyCode::Enter => self.focus_step(true),
                    KeyCode::Up => self.focus_step(false),
                    _ => {}
                },
                TaskField::Dependency => match key.code {
                    KeyCode::Left => self.cycle_dependency(false),
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_dependency(true),
                    KeyCode::Down | KeyCode::Enter => self.focus_step(true),
                    KeyCode::Up => self.focus_step(false),
                    _ => {}
                },
                _ => match key.code {
                    KeyCode::Down | KeyCode::Enter => self.focus_step(true),
                    KeyCode::Up => self.focus_step(false),
                    _ => {
                        if self.edit_field(key) {
                            self.store_field();
                        }
                    }
                },
            },
        }
    }

    fn handle_task_resources(&mut self, key: KeyEvent) {
        let resources: Vec<_> = self
            .workbench
            .dialogs()
            .task()
            .map(|editor| editor.resources().resource_ids())
            .unwrap_or_default();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = clamp_index(self.selected + 1, resources.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected == 0 {
                    self.focus_step(false);
                } else {
                    self.selected -= 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('a') | KeyCode::Char('+') => self.open_picker(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(resource) = resources.get(self.selected).copied() {
                    let result = self.runtime.block_on(self.workbench.remove_resource(resource));
                    self.finish(result, "Removed resource");
                    self.selected = clamp_index(self.selected, resources.len().saturating_sub(1));
                }
            }
            _ => {}
        }
    }

    fn open_picker(&mut self) {
        let result = self.runtime.block_on(self.workbench.open_resource_picker());
        self.finish(result, "");
    }

    fn cycle_project(&mut self, forward: bool) {
        let Some(editor) = self.workbench.dialogs().task() else {
            return;
        };
        let projects = editor.projects();
        if projects.is_empty() {
            return;
        }
        let current = projects
            .iter()
            .position(|(id, _)| *id == editor.form.project_id)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % projects.len()
        } else {
            (current + projects.len() - 1) % projects.len()
        };
        let project = projects[next].0;
        if let Some(form) = self.workbench.task_form_mut() {
            form.project_id = project;
        }
    }

    fn cycle_dependency(&mut self, forward: bool) {
        let Some(editor) = self.workbench.dialogs().task() else {
            return;
        };
        let mut options = vec![None];
        options.extend(editor.siblings().iter().map(|task| Some(task.id)));
        let current = options
            .iter()
            .position(|option| *option == editor.form.dependency())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        let choice = options[next];
        let result = self.workbench.choose_dependency(choice);
        self.finish(result, "");
    }

    fn handle_picker(&mut self, key: KeyEvent) {
        let candidates: Vec<_> = self
            .workbench
            .dialogs()
            .picker()
            .map(|picker| picker.candidates().iter().map(|r| r.id).collect())
            .unwrap_or_default();
        match key.code {
            KeyCode::Esc => {
                self.workbench.cancel_resource_picker();
                self.finish(Ok(()), "");
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.picker_selected = clamp_index(self.picker_selected + 1, candidates.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.picker_selected = self.picker_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(resource) = candidates.get(self.picker_selected).copied() {
                    let result = self.runtime.block_on(self.workbench.pick_resource(resource));
                    self.finish(result, "Added resource");
                }
            }
            _ => {}
        }
    }

    fn handle_jobs(&mut self, key: KeyEvent) {
        let jobs: Vec<_> = match self.workbench.panel() {
            Panel::Jobs(board) => board
                .jobs()
                .map(|job| (job.project_id, job.task_id))
                .collect(),
            _ => Vec::new(),
        };
        if is_ctrl(&key, 'c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('1') => {
                let result = self.runtime.block_on(self.workbench.close_jobs_board());
                self.finish_load(result, "");
            }
            KeyCode::Char('3') => self.open_resources(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = clamp_index(self.selected + 1, jobs.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some((project, task)) = jobs.get(self.selected).copied() {
                    let result = self.runtime.block_on(self.workbench.open_task(project, task));
                    self.finish(result, "");
                }
            }
            _ => {}
        }
    }

    fn handle_resources(&mut self, key: KeyEvent) {
        let resources: Vec<_> = match self.workbench.panel() {
            Panel::Resources(list) => list.iter().map(|r| r.id).collect(),
            _ => Vec::new(),
        };
        if is_ctrl(&key, 'c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.field.clear();
                let result = self.runtime.block_on(self.workbench.close_resource_manager());
                self.finish_load(result, "");
            }
            KeyCode::Enter => {
                let name = self.field.as_str().to_string();
                let result = self.runtime.block_on(self.workbench.add_resource(&name));
                if let Some(created) = self.finish(result, "") {
                    self.field.clear();
                    if created.is_some() {
                        self.set_status_info(format!("Added resource '{}'", name.trim()));
                    }
                }
            }
            KeyCode::Down => {
                self.selected = clamp_index(self.selected + 1, resources.len());
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Delete => {
                if let Some(resource) = resources.get(self.selected).copied() {
                    self.prompt_confirm(ConfirmTarget::Resource(resource));
                }
            }
            _ => {
                self.edit_field(key);
            }
        }
    }

    fn prompt_confirm(&mut self, target: ConfirmTarget) {
        self.confirm = Some(target);
        self.confirm_choice = ConfirmChoice::No;
        self.input_mode = InputMode::Confirm;
        self.set_status_info(STATUS_CONFIRM_DELETE);
    }

    fn handle_confirm(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab | KeyCode::Char(' ') => {
                self.confirm_choice = self.confirm_choice.toggle();
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.confirm_choice = ConfirmChoice::Yes;
                self.perform_confirmed();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
                self.input_mode = InputMode::Normal;
                self.set_status_info("Deletion cancelled");
            }
            KeyCode::Enter => {
                if self.confirm_choice == ConfirmChoice::Yes {
                    self.perform_confirmed();
                } else {
                    self.confirm = None;
                    self.input_mode = InputMode::Normal;
                    self.set_status_info("Deletion cancelled");
                }
            }
            _ => {}
        }
    }

    fn perform_confirmed(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(target) = self.confirm.take() else {
            return;
        };
        match target {
            ConfirmTarget::Project => {
                let result = self.runtime.block_on(self.workbench.delete_project());
                self.finish(result, "Deleted project 🗑️");
            }
            ConfirmTarget::Task => {
                let result = self.runtime.block_on(self.workbench.delete_task());
                self.finish(result, "Deleted task 🗑️");
            }
            ConfirmTarget::ProjectTask(task) => {
                let result = self
                    .runtime
                    .block_on(self.workbench.delete_task_from_project(task));
                self.finish(result, "Deleted task 🗑️");
                let remaining = self
                    .workbench
                    .dialogs()
                    .project()
                    .map_or(0, |editor| editor.tasks().len());
                self.selected = clamp_index(self.selected, remaining);
            }
            ConfirmTarget::Resource(resource) => {
                let result = self.runtime.block_on(self.workbench.delete_resource(resource));
                self.finish(result, "Deleted resource 🗑️");
                let remaining = match self.workbench.panel() {
                    Panel::Resources(list) => list.len(),
                    _ => 0,
                };
                self.selected = clamp_index(self.selected, remaining);
            }
        }
    }
}

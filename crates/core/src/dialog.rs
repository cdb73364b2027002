//! Dialog Stack: the modal editors and the rules for opening, replacing and closing them.
//!
//! Transitions consume the current stack and return the next one together with the
//! [`Refresh`] targets the caller must reload. Store calls happen in
//! [`crate::workbench::Workbench`]; nothing in here touches the network.

use crate::buffer::TaskResourceBuffer;
use crate::error::ValidationError;
use crate::model::{
    Progress, Project, ProjectDraft, ProjectId, Resource, Task, TaskFields, TaskId,
    DEFAULT_DURATION_DAYS,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub bucket: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEditor {
    id: Option<ProjectId>,
    pub form: ProjectForm,
    tasks: Vec<Task>,
}

impl ProjectEditor {
    pub fn blank() -> Self {
        Self {
            id: None,
            form: ProjectForm::default(),
            tasks: Vec::new(),
        }
    }

    pub fn existing(project: &Project, tasks: Vec<Task>) -> Self {
        Self {
            id: Some(project.id),
            form: ProjectForm {
                name: project.description.clone(),
                bucket: project.bucket.clone().unwrap_or_default(),
                notes: project.notes.clone().unwrap_or_default(),
            },
            tasks,
        }
    }

    pub fn id(&self) -> Option<ProjectId> {
        self.id
    }

    /// Delete is only offered once the project exists on the store.
    pub fn can_delete(&self) -> bool {
        self.id.is_some()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn draft(&self) -> Result<ProjectDraft, ValidationError> {
        let name = self.form.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName("Project Name"));
        }
        Ok(ProjectDraft {
            description: name.to_string(),
            bucket: self.form.bucket.trim().to_string(),
            notes: self.form.notes.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub name: String,
    pub project_id: ProjectId,
    pub notes: String,
    /// Raw duration text as typed; see [`TaskForm::duration_days`].
    pub duration: String,
    dependency: Option<TaskId>,
}

impl TaskForm {
    pub fn dependency(&self) -> Option<TaskId> {
        self.dependency
    }

    /// Parsed duration; blank, unparsable or non-positive input means one day.
    pub fn duration_days(&self) -> f64 {
        match self.duration.trim().parse::<f64>() {
            Ok(days) if days.is_finite() && days > 0.0 => days,
            _ => DEFAULT_DURATION_DAYS,
        }
    }

    pub fn fields(&self) -> Result<TaskFields, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName("Task Name"));
        }
        Ok(TaskFields {
            project_id: self.project_id,
            description: name.to_string(),
            notes: self.notes.clone(),
            duration: self.duration_days(),
            dependency: self.dependency,
        })
    }
}

/// Choices offered by the resource picker, fixed when the picker opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePicker {
    candidates: Vec<Resource>,
}

impl ResourcePicker {
    pub fn candidates(&self) -> &[Resource] {
        &self.candidates
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskEditor {
    id: Option<TaskId>,
    pub form: TaskForm,
    progress: Progress,
    projects: Vec<(ProjectId, String)>,
    siblings: Vec<Task>,
    resources: TaskResourceBuffer,
    picker: Option<ResourcePicker>,
}

impl TaskEditor {
    pub fn blank(project: ProjectId, projects: Vec<(ProjectId, String)>, siblings: Vec<Task>) -> Self {
        Self {
            id: None,
            form: TaskForm {
                name: String::new(),
                project_id: project,
                notes: String::new(),
                duration: format_days(DEFAULT_DURATION_DAYS),
                dependency: None,
            },
            progress: Progress::NotStarted,
            projects,
            siblings,
            resources: TaskResourceBuffer::unbound(),
            picker: None,
        }
    }

    pub fn existing(
        task: &Task,
        projects: Vec<(ProjectId, String)>,
        siblings: Vec<Task>,
        resources: TaskResourceBuffer,
    ) -> Self {
        let siblings = siblings.into_iter().filter(|t| t.id != task.id).collect();
        Self {
            id: Some(task.id),
            form: TaskForm {
                name: task.description.clone(),
                project_id: task.project_id,
                notes: task.notes.clone().unwrap_or_default(),
                duration: format_days(task.duration),
                dependency: task.dependency.filter(|dep| *dep != task.id),
            },
            progress: task.progress(),
            projects,
            siblings,
            resources,
            picker: None,
        }
    }

    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn projects(&self) -> &[(ProjectId, String)] {
        &self.projects
    }

    /// Dependency choices; never includes the task itself.
    pub fn siblings(&self) -> &[Task] {
        &self.siblings
    }

    pub fn resources(&self) -> &TaskResourceBuffer {
        &self.resources
    }

    pub(crate) fn resources_mut(&mut self) -> &mut TaskResourceBuffer {
        &mut self.resources
    }

    pub fn can_start(&self) -> bool {
        self.id.is_some() && self.progress.can_start()
    }

    pub fn can_finish(&self) -> bool {
        self.id.is_some() && self.progress.can_finish()
    }

    /// Sets the dependency; choosing the task itself is ignored and reported as `false`.
    pub fn choose_dependency(&mut self, dependency: Option<TaskId>) -> bool {
        if dependency.is_some() && dependency == self.id {
            return false;
        }
        self.form.dependency = dependency;
        true
    }

    pub fn picker(&self) -> Option<&ResourcePicker> {
        self.picker.as_ref()
    }

    /// Opens (or reopens) the picker with every resource the buffer does not hold.
    pub fn open_picker(&mut self, all: &[Resource]) {
        self.picker = Some(ResourcePicker {
            candidates: self.resources.candidates(all),
        });
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }
}

fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{days:.0}")
    } else {
        days.to_string()
    }
}

/// How an editor was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Cancelled,
    Saved,
    Deleted,
}

/// What must be reloaded after a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refresh {
    pub project_editor: Option<ProjectId>,
    pub board: bool,
}

impl Refresh {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn board() -> Self {
        Self {
            project_editor: None,
            board: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogStack {
    #[default]
    Closed,
    Project(ProjectEditor),
    ProjectTask(ProjectEditor, Box<TaskEditor>),
    Task(Box<TaskEditor>),
}

impl DialogStack {
    pub fn is_closed(&self) -> bool {
        matches!(self, DialogStack::Closed)
    }

    /// Replaces whatever is open with `editor`.
    pub fn open_project(self, editor: ProjectEditor) -> Self {
        DialogStack::Project(editor)
    }

    /// Stacks `editor` over an open project editor, or opens it stand-alone.
    /// An already open task editor is replaced.
    pub fn push_task(self, editor: TaskEditor) -> Self {
        match self {
            DialogStack::Project(project) | DialogStack::ProjectTask(project, _) => {
                DialogStack::ProjectTask(project, Box::new(editor))
            }
            DialogStack::Closed | DialogStack::Task(_) => DialogStack::Task(Box::new(editor)),
        }
    }

    /// Closes the task editor. Saving or deleting refreshes the project editor underneath, if
    /// any, and the board.
    pub fn close_task(self, outcome: Outcome) -> (Self, Refresh) {
        let (next, parent) = match self {
            DialogStack::ProjectTask(project, _) => {
                let parent = project.id();
                (DialogStack::Project(project), parent)
            }
            DialogStack::Task(_) => (DialogStack::Closed, None),
            other => return (other, Refresh::none()),
        };
        let refresh = match outcome {
            Outcome::Cancelled => Refresh::none(),
            Outcome::Saved | Outcome::Deleted => Refresh {
                project_editor: parent,
                board: true,
            },
        };
        (next, refresh)
    }

    /// Closes every editor. Saving or deleting refreshes the board.
    pub fn close_project(self, outcome: Outcome) -> (Self, Refresh) {
        let refresh = match outcome {
            Outcome::Cancelled => Refresh::none(),
            Outcome::Saved | Outcome::Deleted => Refresh::board(),
        };
        (DialogStack::Closed, refresh)
    }

    pub fn project(&self) -> Option<&ProjectEditor> {
        match self {
            DialogStack::Project(project) | DialogStack::ProjectTask(project, _) => Some(project),
            _ => None,
        }
    }

    pub fn project_mut(&mut self) -> Option<&mut ProjectEditor> {
        match self {
            DialogStack::Project(project) | DialogStack::ProjectTask(project, _) => Some(project),
            _ => None,
        }
    }

    pub fn task(&self) -> Option<&TaskEditor> {
        match self {
            DialogStack::ProjectTask(_, task) | DialogStack::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn task_mut(&mut self) -> Option<&mut TaskEditor> {
        match self {
            DialogStack::ProjectTask(_, task) | DialogStack::Task(task) => Some(task),
            _ => None,
        }
    }

    /// The innermost open editor is the only one accepting input.
    pub fn project_is_topmost(&self) -> bool {
        matches!(self, DialogStack::Project(_))
    }

    pub fn picker(&self) -> Option<&ResourcePicker> {
        self.task().and_then(TaskEditor::picker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoardStatus, ResourceId};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn task(id: i64, project: i64) -> Task {
        Task {
            id: TaskId(id),
            project_id: ProjectId(project),
            description: format!("task {id}"),
            notes: None,
            duration: 2.0,
            dependency: None,
            started: None,
            completed: None,
            status: Some(BoardStatus::AwaitingResource),
        }
    }

    fn project(id: i64) -> Project {
        Project {
            id: ProjectId(id),
            description: format!("project {id}"),
            bucket: None,
            notes: None,
            possible_date: None,
            tasks: Vec::new(),
        }
    }

    fn task_editor(id: i64) -> TaskEditor {
        TaskEditor::existing(
            &task(id, 1),
            vec![(ProjectId(1), "project 1".into())],
            vec![task(id, 1), task(id + 1, 1)],
            TaskResourceBuffer::unbound(),
        )
    }

    #[test]
    fn task_saved_over_project_refreshes_parent_and_board() {
        let stack = DialogStack::Closed
            .open_project(ProjectEditor::existing(&project(1), vec![task(5, 1)]))
            .push_task(task_editor(5));
        assert!(matches!(stack, DialogStack::ProjectTask(..)));

        let (stack, refresh) = stack.close_task(Outcome::Saved);
        assert!(stack.project_is_topmost());
        assert_eq!(
            refresh,
            Refresh {
                project_editor: Some(ProjectId(1)),
                board: true
            }
        );
    }

    #[test]
    fn task_moved_to_another_project_still_refreshes_the_stacked_editor() {
        let mut editor = task_editor(5);
        editor.form.project_id = ProjectId(2);
        let (stack, refresh) = DialogStack::Closed
            .open_project(ProjectEditor::existing(&project(1), vec![task(5, 1)]))
            .push_task(editor)
            .close_task(Outcome::Saved);
        assert_eq!(stack.project().and_then(ProjectEditor::id), Some(ProjectId(1)));
        assert_eq!(refresh.project_editor, Some(ProjectId(1)));
        assert!(refresh.board);
    }

    #[test]
    fn cancelled_task_keeps_project_editor_untouched() {
        let editor = ProjectEditor::existing(&project(1), vec![task(5, 1), task(6, 1)]);
        let before = editor.clone();
        let (stack, refresh) = DialogStack::Closed
            .open_project(editor)
            .push_task(task_editor(5))
            .close_task(Outcome::Cancelled);
        assert_eq!(stack.project(), Some(&before));
        assert_eq!(refresh, Refresh::none());
    }

    #[test]
    fn standalone_task_close_refreshes_board_only() {
        let (stack, refresh) = DialogStack::Closed
            .push_task(task_editor(5))
            .close_task(Outcome::Deleted);
        assert!(stack.is_closed());
        assert_eq!(refresh, Refresh::board());
    }

    #[rstest]
    #[case(Outcome::Cancelled, Refresh::none())]
    #[case(Outcome::Saved, Refresh::board())]
    #[case(Outcome::Deleted, Refresh::board())]
    fn closing_project_closes_everything(#[case] outcome: Outcome, #[case] expected: Refresh) {
        let (stack, refresh) = DialogStack::Closed
            .open_project(ProjectEditor::blank())
            .push_task(task_editor(5))
            .close_project(outcome);
        assert!(stack.is_closed());
        assert_eq!(refresh, expected);
    }

    #[test]
    fn opening_project_replaces_existing_dialogs() {
        let stack = DialogStack::Closed
            .push_task(task_editor(5))
            .open_project(ProjectEditor::blank());
        assert!(stack.task().is_none());
        assert!(stack.project_is_topmost());
    }

    #[test]
    fn dependency_on_self_is_ignored() {
        let mut editor = task_editor(5);
        assert!(!editor.choose_dependency(Some(TaskId(5))));
        assert_eq!(editor.form.dependency(), None);
        assert!(editor.choose_dependency(Some(TaskId(6))));
        assert_eq!(editor.form.dependency(), Some(TaskId(6)));
        assert!(editor.siblings().iter().all(|t| t.id != TaskId(5)));
    }

    #[rstest]
    #[case("3.5", 3.5)]
    #[case("", 1.0)]
    #[case("soon", 1.0)]
    #[case("0", 1.0)]
    #[case("-2", 1.0)]
    fn duration_falls_back_to_one_day(#[case] raw: &str, #[case] expected: f64) {
        let mut editor = task_editor(5);
        editor.form.duration = raw.to_string();
        assert_eq!(editor.form.duration_days(), expected);
    }

    #[test]
    fn blank_names_fail_validation() {
        let mut editor = task_editor(5);
        editor.form.name = "   ".into();
        assert_eq!(editor.form.fields(), Err(ValidationError::MissingName("Task Name")));
        assert_eq!(
            ProjectEditor::blank().draft(),
            Err(ValidationError::MissingName("Project Name"))
        );
    }

    #[test]
    fn start_and_finish_follow_progress() {
        let fresh = TaskEditor::blank(ProjectId(1), Vec::new(), Vec::new());
        assert!(!fresh.can_start());
        assert_eq!(fresh.form.duration, "1");

        let mut started = task(5, 1);
        started.started = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(8, 0, 0));
        let editor = TaskEditor::existing(&started, Vec::new(), Vec::new(), TaskResourceBuffer::unbound());
        assert!(!editor.can_start());
        assert!(editor.can_finish());
    }

    #[test]
    fn picker_lives_inside_task_editor() {
        let mut stack = DialogStack::Closed.push_task(task_editor(5));
        let all = vec![Resource {
            id: ResourceId(1),
            description: "Crane".into(),
        }];
        if let Some(editor) = stack.task_mut() {
            editor.open_picker(&all);
        }
        assert_eq!(stack.picker().map(|p| p.candidates().len()), Some(1));

        let (stack, _) = stack.close_task(Outcome::Cancelled);
        assert!(stack.picker().is_none());
    }
}

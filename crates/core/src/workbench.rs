//! The controller that owns the snapshot, the dialog stack and the side panels, and runs every
//! user action against the store.
//!
//! Each action either completes or returns an error having left the visible state as it was.
//! Store calls inside one action run strictly in sequence.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::board::{build_board, Board};
use crate::buffer::TaskResourceBuffer;
use crate::dialog::{DialogStack, Outcome, ProjectEditor, ProjectForm, Refresh, TaskEditor, TaskForm};
use crate::error::{LoadError, ValidationError, WorkbenchError};
use crate::jobs::JobsBoard;
use crate::model::{NewTask, Project, ProjectId, Resource, ResourceId, TaskId, TaskUpdate};
use crate::store::Store;

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;

/// Last project snapshot; always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Snapshot {
    #[default]
    NotLoaded,
    Loaded(Vec<Project>),
    Unavailable(LoadError),
}

/// Non-modal panels that sit over the board.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Panel {
    #[default]
    None,
    Jobs(JobsBoard),
    Resources(Vec<Resource>),
}

pub struct Workbench {
    store: Arc<dyn Store>,
    snapshot: Snapshot,
    filter: String,
    dialogs: DialogStack,
    panel: Panel,
}

impl Workbench {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            snapshot: Snapshot::NotLoaded,
            filter: String::new(),
            dialogs: DialogStack::Closed,
            panel: Panel::None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// The board for the current snapshot and filter.
    pub fn board(&self) -> Result<Board, LoadError> {
        match &self.snapshot {
            Snapshot::NotLoaded => Ok(build_board(&[], &self.filter)),
            Snapshot::Loaded(projects) => Ok(build_board(projects, &self.filter)),
            Snapshot::Unavailable(err) => Err(err.clone()),
        }
    }

    pub fn dialogs(&self) -> &DialogStack {
        &self.dialogs
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn project_form_mut(&mut self) -> Option<&mut ProjectForm> {
        self.dialogs.project_mut().map(|editor| &mut editor.form)
    }

    pub fn task_form_mut(&mut self) -> Option<&mut TaskForm> {
        self.dialogs.task_mut().map(|editor| &mut editor.form)
    }

    pub async fn load_projects(&mut self) -> Result<(), LoadError> {
        match self.store.list_projects().await {
            Ok(projects) => {
                debug!(projects = projects.len(), "snapshot loaded");
                self.snapshot = Snapshot::Loaded(projects);
                Ok(())
            }
            Err(err) => {
                let err = LoadError::from(err);
                warn!(error = %err, "snapshot unavailable");
                self.snapshot = Snapshot::Unavailable(err.clone());
                Err(err)
            }
        }
    }

    /// Menu "Projects": drops every dialog and panel and reloads the board.
    pub async fn show_projects(&mut self) -> Result<(), LoadError> {
        self.dialogs = DialogStack::Closed;
        self.panel = Panel::None;
        self.load_projects().await
    }

    pub async fn open_project_editor(&mut self, id: Option<ProjectId>) -> WorkbenchResult<()> {
        let editor = match id {
            Some(id) => {
                let project = self.store.fetch_project(id).await?;
                let tasks = self.store.project_tasks(id).await?;
                ProjectEditor::existing(&project, tasks)
            }
            None => ProjectEditor::blank(),
        };
        self.panel = Panel::None;
        self.dialogs = std::mem::take(&mut self.dialogs).open_project(editor);
        Ok(())
    }

    /// Opens `task` over the editor of `project`; the path used by both the board and the jobs
    /// panel.
    pub async fn open_task(&mut self, project: ProjectId, task: TaskId) -> WorkbenchResult<()> {
        let fetched = self.store.fetch_project(project).await?;
        let tasks = self.store.project_tasks(project).await?;
        let task_editor = self.task_editor(Some(task), project).await?;
        self.panel = Panel::None;
        self.dialogs = DialogStack::Closed
            .open_project(ProjectEditor::existing(&fetched, tasks))
            .push_task(task_editor);
        Ok(())
    }

    /// Opens a task editor with no project editor underneath.
    pub async fn open_task_standalone(&mut self, task: TaskId) -> WorkbenchResult<()> {
        let fetched = self.store.fetch_task(task).await?;
        let editor = self.task_editor(Some(task), fetched.project_id).await?;
        self.panel = Panel::None;
        self.dialogs = DialogStack::Closed.push_task(editor);
        Ok(())
    }

    /// Opens an existing task, or a new one with `None`, from the project editor.
    pub async fn open_task_from_project(&mut self, task: Option<TaskId>) -> WorkbenchResult<()> {
        let project = self
            .dialogs
            .project()
            .ok_or(WorkbenchError::NoDialog("project editor"))?;
        let project_id = project.id().ok_or(ValidationError::UnsavedProject)?;
        let editor = self.task_editor(task, project_id).await?;
        self.dialogs = std::mem::take(&mut self.dialogs).push_task(editor);
        Ok(())
    }

    pub async fn add_task(&mut self) -> WorkbenchResult<()> {
        self.open_task_from_project(None).await
    }

    async fn task_editor(&self, task: Option<TaskId>, project: ProjectId) -> WorkbenchResult<TaskEditor> {
        let existing = match task {
            Some(id) => Some(self.store.fetch_task(id).await?),
            None => None,
        };
        let resources = TaskResourceBuffer::load(self.store.as_ref(), task).await?;
        let projects = self
            .store
            .list_projects()
            .await?
            .into_iter()
            .map(|p| (p.id, p.description))
            .collect();
        let owner = existing.as_ref().map_or(project, |t| t.project_id);
        let siblings = self.store.project_tasks(owner).await?;

        Ok(match existing {
            Some(task) => TaskEditor::existing(&task, projects, siblings, resources),
            None => TaskEditor::blank(project, projects, siblings),
        })
    }

    pub fn choose_dependency(&mut self, dependency: Option<TaskId>) -> WorkbenchResult<bool> {
        let editor = self
            .dialogs
            .task_mut()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        Ok(editor.choose_dependency(dependency))
    }

    pub async fn save_project(&mut self) -> WorkbenchResult<()> {
        let editor = self
            .dialogs
            .project()
            .ok_or(WorkbenchError::NoDialog("project editor"))?;
        let draft = editor.draft()?;
        match editor.id() {
            Some(id) => {
                self.store.replace_project(id, &draft).await?;
                info!(project = %id, "project updated");
            }
            None => {
                let created = self.store.create_project(&draft).await?;
                info!(project = %created.id, "project created");
            }
        }
        self.close_project(Outcome::Saved).await;
        Ok(())
    }

    pub async fn cancel_project(&mut self) {
        self.close_project(Outcome::Cancelled).await;
    }

    /// Deletes the project (and, on the store side, all of its tasks).
    pub async fn delete_project(&mut self) -> WorkbenchResult<()> {
        let editor = self
            .dialogs
            .project()
            .ok_or(WorkbenchError::NoDialog("project editor"))?;
        let id = editor.id().ok_or(ValidationError::UnsavedProject)?;
        self.store.delete_project(id).await?;
        info!(project = %id, "project deleted");
        self.close_project(Outcome::Deleted).await;
        Ok(())
    }

    /// Deletes a task listed in the project editor and re-renders that editor.
    pub async fn delete_task_from_project(&mut self, task: TaskId) -> WorkbenchResult<()> {
        let project = self
            .dialogs
            .project()
            .and_then(ProjectEditor::id)
            .ok_or(WorkbenchError::NoDialog("project editor"))?;
        self.store.delete_task(task).await?;
        info!(task = %task, "task deleted");
        self.refresh(Refresh {
            project_editor: Some(project),
            board: true,
        })
        .await;
        Ok(())
    }

    pub async fn save_task(&mut self) -> WorkbenchResult<()> {
        let editor = self
            .dialogs
            .task()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        let fields = editor.form.fields()?;
        match editor.id() {
            Some(id) => {
                let current = self.store.fetch_task(id).await?;
                let update = TaskUpdate {
                    fields,
                    started: current.started,
                    completed: current.completed,
                };
                self.store.replace_task(id, &update).await?;
                info!(task = %id, "task updated");
            }
            None => {
                let payload = NewTask {
                    fields,
                    resource_ids: editor.resources().resource_ids(),
                };
                let id = self.store.create_task(&payload).await?;
                info!(task = %id, resources = payload.resource_ids.len(), "task created");
            }
        }
        self.close_task(Outcome::Saved).await;
        Ok(())
    }

    pub async fn cancel_task(&mut self) {
        self.close_task(Outcome::Cancelled).await;
    }

    /// Deletes the edited task; on a task that was never saved this is a cancel.
    pub async fn delete_task(&mut self) -> WorkbenchResult<()> {
        let editor = self
            .dialogs
            .task()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        let Some(id) = editor.id() else {
            self.close_task(Outcome::Cancelled).await;
            return Ok(());
        };
        self.store.delete_task(id).await?;
        info!(task = %id, "task deleted");
        self.close_task(Outcome::Deleted).await;
        Ok(())
    }

    /// "Start Now": records the start, then saves the editor.
    pub async fn start_task(&mut self) -> WorkbenchResult<()> {
        let editor = self
            .dialogs
            .task()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        editor.form.fields()?;
        let Some(id) = editor.id().filter(|_| editor.can_start()) else {
            debug!("start ignored for this task");
            return Ok(());
        };
        self.store.start_task(id).await?;
        info!(task = %id, "task started");
        self.save_task().await
    }

    /// "Finish Now": records completion, then saves the editor.
    pub async fn finish_task(&mut self) -> WorkbenchResult<()> {
        let editor = self
            .dialogs
            .task()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        editor.form.fields()?;
        let Some(id) = editor.id().filter(|_| editor.can_finish()) else {
            debug!("finish ignored for this task");
            return Ok(());
        };
        self.store.finish_task(id).await?;
        info!(task = %id, "task finished");
        self.save_task().await
    }

    pub async fn open_resource_picker(&mut self) -> WorkbenchResult<()> {
        if self.dialogs.task().is_none() {
            return Err(WorkbenchError::NoDialog("task editor"));
        }
        let all = self.store.list_resources().await?;
        if let Some(editor) = self.dialogs.task_mut() {
            editor.open_picker(&all);
        }
        Ok(())
    }

    /// Adds a picker candidate to the buffer and closes the picker. On failure the picker stays
    /// open.
    pub async fn pick_resource(&mut self, id: ResourceId) -> WorkbenchResult<()> {
        let store = self.store.as_ref();
        let editor = self
            .dialogs
            .task_mut()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        let resource = editor
            .picker()
            .ok_or(WorkbenchError::NoDialog("resource picker"))?
            .candidates()
            .iter()
            .find(|resource| resource.id == id)
            .cloned()
            .ok_or(WorkbenchError::NoDialog("resource picker entry"))?;
        editor.resources_mut().add(store, resource).await?;
        editor.close_picker();
        Ok(())
    }

    pub fn cancel_resource_picker(&mut self) {
        if let Some(editor) = self.dialogs.task_mut() {
            editor.close_picker();
        }
    }

    pub async fn remove_resource(&mut self, id: ResourceId) -> WorkbenchResult<()> {
        let store = self.store.as_ref();
        let editor = self
            .dialogs
            .task_mut()
            .ok_or(WorkbenchError::NoDialog("task editor"))?;
        editor.resources_mut().remove(store, id).await?;
        Ok(())
    }

    pub async fn open_jobs_board(&mut self) -> WorkbenchResult<()> {
        let jobs = JobsBoard::load(self.store.as_ref()).await?;
        self.dialogs = DialogStack::Closed;
        self.panel = Panel::Jobs(jobs);
        Ok(())
    }

    pub async fn close_jobs_board(&mut self) -> Result<(), LoadError> {
        self.show_projects().await
    }

    pub async fn open_resource_manager(&mut self) -> WorkbenchResult<()> {
        let resources = self.store.list_resources().await?;
        self.dialogs = DialogStack::Closed;
        self.panel = Panel::Resources(resources);
        Ok(())
    }

    /// Creates a resource; blank names are ignored and yield `None`.
    pub async fn add_resource(&mut self, name: &str) -> WorkbenchResult<Option<ResourceId>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let id = self.store.create_resource(name).await?;
        info!(resource = %id, name, "resource created");
        self.reload_resources().await?;
        Ok(Some(id))
    }

    /// Deletes a resource; the store drops it from every task that required it.
    pub async fn delete_resource(&mut self, id: ResourceId) -> WorkbenchResult<()> {
        self.store.delete_resource(id).await?;
        info!(resource = %id, "resource deleted");
        self.reload_resources().await
    }

    pub async fn close_resource_manager(&mut self) -> Result<(), LoadError> {
        self.show_projects().await
    }

    async fn reload_resources(&mut self) -> WorkbenchResult<()> {
        let resources = self.store.list_resources().await?;
        if let Panel::Resources(list) = &mut self.panel {
            *list = resources;
        }
        Ok(())
    }

    async fn close_task(&mut self, outcome: Outcome) {
        let (next, refresh) = std::mem::take(&mut self.dialogs).close_task(outcome);
        self.dialogs = next;
        self.refresh(refresh).await;
    }

    async fn close_project(&mut self, outcome: Outcome) {
        let (next, refresh) = std::mem::take(&mut self.dialogs).close_project(outcome);
        self.dialogs = next;
        self.refresh(refresh).await;
    }

    /// Reloads the declared targets. The triggering action already succeeded, so failures here
    /// are logged and, for the board, shown through the snapshot.
    async fn refresh(&mut self, refresh: Refresh) {
        if let Some(project) = refresh.project_editor {
            match self.store.project_tasks(project).await {
                Ok(tasks) => {
                    if let Some(editor) = self.dialogs.project_mut() {
                        editor.replace_tasks(tasks);
                    }
                }
                Err(err) => warn!(project = %project, error = %err, "project editor refresh failed"),
            }
        }
        if refresh.board {
            let _ = self.load_projects().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::Progress;
    use crate::store::{MemoryStore, StoreCall};
    use chrono::Local;
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: Arc<MemoryStore>,
        bench: Workbench,
        project: ProjectId,
        task: TaskId,
        crane: ResourceId,
        van: ResourceId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let project = store.insert_project("Barn", Some("Farm"));
        let task = store.insert_task(project, "Roof");
        store.insert_task(project, "Walls");
        let crane = store.insert_resource("Crane");
        let van = store.insert_resource("Van");
        let mut bench = Workbench::new(store.clone());
        bench.load_projects().await.unwrap();
        store.clear_calls();
        Fixture {
            store,
            bench,
            project,
            task,
            crane,
            van,
        }
    }

    fn mutations(store: &MemoryStore) -> Vec<StoreCall> {
        store.calls().into_iter().filter(StoreCall::is_mutation).collect()
    }

    #[tokio::test]
    async fn new_task_buffers_resources_and_creates_once() {
        let mut f = fixture().await;
        f.bench.open_project_editor(Some(f.project)).await.unwrap();
        f.bench.add_task().await.unwrap();
        f.bench.task_form_mut().unwrap().name = "Gutters".into();

        f.bench.open_resource_picker().await.unwrap();
        f.bench.pick_resource(f.crane).await.unwrap();
        f.bench.open_resource_picker().await.unwrap();
        f.bench.pick_resource(f.van).await.unwrap();
        f.bench.remove_resource(f.crane).await.unwrap();
        f.bench.open_resource_picker().await.unwrap();
        f.bench.pick_resource(f.crane).await.unwrap();
        assert!(mutations(&f.store).is_empty());

        f.bench.save_task().await.unwrap();
        assert_eq!(
            mutations(&f.store),
            vec![StoreCall::CreateTask {
                resource_ids: vec![f.van, f.crane]
            }]
        );

        let created = f.store.task_count();
        assert_eq!(created, 3);
        let editor = f.bench.dialogs().project().unwrap();
        let gutters = editor.tasks().iter().find(|t| t.description == "Gutters").unwrap();
        assert_eq!(f.store.assigned(gutters.id), vec![f.van, f.crane]);
        assert!(f.bench.dialogs().project_is_topmost());
    }

    #[tokio::test]
    async fn existing_task_edits_resources_immediately() {
        let mut f = fixture().await;
        f.bench.open_task(f.project, f.task).await.unwrap();

        f.bench.open_resource_picker().await.unwrap();
        f.bench.pick_resource(f.crane).await.unwrap();
        assert_eq!(f.store.assigned(f.task), vec![f.crane]);
        assert!(f.bench.dialogs().task().unwrap().resources().contains(f.crane));
        assert!(f.bench.dialogs().picker().is_none());

        f.bench.remove_resource(f.crane).await.unwrap();
        assert!(f.store.assigned(f.task).is_empty());
        assert!(!f.bench.dialogs().task().unwrap().resources().contains(f.crane));
    }

    #[tokio::test]
    async fn picker_offers_only_unassigned_resources() {
        let mut f = fixture().await;
        f.store.assign(f.task, f.crane);
        f.bench.open_task(f.project, f.task).await.unwrap();
        f.bench.open_resource_picker().await.unwrap();
        let offered: Vec<_> = f
            .bench
            .dialogs()
            .picker()
            .unwrap()
            .candidates()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(offered, vec![f.van]);
    }

    #[tokio::test]
    async fn failed_pick_keeps_picker_open() {
        let mut f = fixture().await;
        f.bench.open_task(f.project, f.task).await.unwrap();
        f.bench.open_resource_picker().await.unwrap();
        f.store.fail_when(|call| matches!(call, StoreCall::AssignResource(..)));

        let err = f.bench.pick_resource(f.van).await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Store(StoreError::Rejected(_))));
        assert!(f.bench.dialogs().picker().is_some());
        assert!(f.bench.dialogs().task().unwrap().resources().resources().is_empty());
    }

    #[tokio::test]
    async fn cancelling_nested_task_leaves_project_editor_unchanged() {
        let mut f = fixture().await;
        f.bench.open_project_editor(Some(f.project)).await.unwrap();
        let before = f.bench.dialogs().project().cloned();

        f.bench.open_task_from_project(Some(f.task)).await.unwrap();
        f.bench.task_form_mut().unwrap().name = "Renamed".into();
        f.bench.cancel_task().await;

        assert_eq!(f.bench.dialogs().project().cloned(), before);
        assert!(mutations(&f.store).is_empty());
    }

    #[tokio::test]
    async fn blank_task_name_blocks_save_without_store_calls() {
        let mut f = fixture().await;
        f.bench.open_task(f.project, f.task).await.unwrap();
        f.bench.task_form_mut().unwrap().name = "  ".into();
        f.store.clear_calls();

        let err = f.bench.save_task().await.unwrap_err();
        assert!(err.is_validation());
        assert!(f.store.calls().is_empty());
        assert!(f.bench.dialogs().task().is_some());
    }

    #[tokio::test]
    async fn store_failure_on_save_keeps_editor_open() {
        let mut f = fixture().await;
        f.bench.open_project_editor(None).await.unwrap();
        f.bench.project_form_mut().unwrap().name = "Shed".into();
        f.store.fail_when(|call| matches!(call, StoreCall::CreateProject));

        assert!(f.bench.save_project().await.is_err());
        assert_eq!(f.bench.dialogs().project().unwrap().form.name, "Shed");
    }

    #[tokio::test]
    async fn saving_existing_task_echoes_timestamps_and_refreshes() {
        let mut f = fixture().await;
        let started = Local::now().naive_local();
        f.store.mark_started(f.task, started);
        f.bench.open_project_editor(Some(f.project)).await.unwrap();
        f.bench.open_task_from_project(Some(f.task)).await.unwrap();
        f.bench.task_form_mut().unwrap().name = "Roof tiles".into();

        f.bench.save_task().await.unwrap();

        let saved = f.store.task(f.task).unwrap();
        assert_eq!(saved.started, Some(started));
        assert_eq!(saved.description, "Roof tiles");
        let listed: Vec<_> = f
            .bench
            .dialogs()
            .project()
            .unwrap()
            .tasks()
            .iter()
            .map(|t| t.description.clone())
            .collect();
        assert!(listed.contains(&"Roof tiles".to_string()));
        let board = f.bench.board().unwrap();
        assert_eq!(board.buckets[0].projects[0].tasks[0].description, "Roof tiles");
    }

    #[tokio::test]
    async fn start_now_records_start_then_saves() {
        let mut f = fixture().await;
        f.bench.open_task(f.project, f.task).await.unwrap();
        assert!(f.bench.dialogs().task().unwrap().can_start());

        f.bench.start_task().await.unwrap();

        assert!(matches!(f.store.task(f.task).unwrap().progress(), Progress::Started(_)));
        assert!(f.bench.dialogs().task().is_none());
        assert!(f.bench.dialogs().project_is_topmost());
    }

    #[tokio::test]
    async fn adding_task_to_unsaved_project_is_rejected() {
        let mut f = fixture().await;
        f.bench.open_project_editor(None).await.unwrap();
        let err = f.bench.add_task().await.unwrap_err();
        assert_eq!(err, WorkbenchError::Validation(ValidationError::UnsavedProject));
        assert!(f.bench.dialogs().task().is_none());
    }

    #[tokio::test]
    async fn deleting_task_from_project_editor_rerenders_it() {
        let mut f = fixture().await;
        f.bench.open_project_editor(Some(f.project)).await.unwrap();
        f.bench.delete_task_from_project(f.task).await.unwrap();
        let remaining: Vec<_> = f.bench.dialogs().project().unwrap().tasks().iter().map(|t| t.id).collect();
        assert!(!remaining.contains(&f.task));
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn deleting_project_closes_editor_and_reloads_board() {
        let mut f = fixture().await;
        f.bench.open_project_editor(Some(f.project)).await.unwrap();
        f.bench.delete_project().await.unwrap();
        assert!(f.bench.dialogs().is_closed());
        assert!(f.bench.board().unwrap().is_empty());
        assert_eq!(f.store.task_count(), 0);
    }

    #[tokio::test]
    async fn deleted_resource_disappears_from_task_on_next_open() {
        let mut f = fixture().await;
        f.store.assign(f.task, f.crane);
        f.bench.open_resource_manager().await.unwrap();
        f.bench.delete_resource(f.crane).await.unwrap();
        assert_eq!(f.bench.panel(), &Panel::Resources(vec![Resource {
            id: f.van,
            description: "Van".into()
        }]));

        f.bench.open_task(f.project, f.task).await.unwrap();
        let editor = f.bench.dialogs().task().unwrap();
        assert!(editor.resources().resources().is_empty());
        assert!(f.store.task(f.task).is_some());
    }

    #[tokio::test]
    async fn resource_manager_ignores_blank_and_reports_duplicates() {
        let mut f = fixture().await;
        f.bench.open_resource_manager().await.unwrap();
        assert_eq!(f.bench.add_resource("   ").await.unwrap(), None);
        let err = f.bench.add_resource("Crane").await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Store(StoreError::Conflict(_))));
        assert!(f.bench.add_resource("Ladder").await.unwrap().is_some());

        f.bench.close_resource_manager().await.unwrap();
        assert_eq!(f.bench.panel(), &Panel::None);
    }

    #[tokio::test]
    async fn jobs_entry_stacks_project_and_task_editors() {
        let mut f = fixture().await;
        f.store.assign(f.task, f.van);
        f.bench.open_jobs_board().await.unwrap();
        let job = match f.bench.panel() {
            Panel::Jobs(jobs) => jobs.find(f.task).cloned().unwrap(),
            other => panic!("unexpected panel {other:?}"),
        };

        f.bench.open_task(job.project_id, job.task_id).await.unwrap();
        assert_eq!(f.bench.panel(), &Panel::None);
        assert_eq!(f.bench.dialogs().project().and_then(|p| p.id()), Some(f.project));
        assert_eq!(f.bench.dialogs().task().and_then(|t| t.id()), Some(f.task));
    }

    #[tokio::test]
    async fn standalone_task_save_returns_to_board() {
        let mut f = fixture().await;
        f.bench.open_task_standalone(f.task).await.unwrap();
        assert!(f.bench.dialogs().project().is_none());
        f.bench.save_task().await.unwrap();
        assert!(f.bench.dialogs().is_closed());
    }

    #[tokio::test]
    async fn load_failure_marks_board_unavailable() {
        let store = Arc::new(MemoryStore::new());
        store.fail_when(|call| matches!(call, StoreCall::ListProjects));
        let mut bench = Workbench::new(store);
        assert!(bench.load_projects().await.is_err());
        let err = bench.board().unwrap_err();
        assert!(err.to_string().starts_with("Could not load projects."));
    }

    #[tokio::test]
    async fn filter_narrows_the_board() {
        let mut f = fixture().await;
        f.store.insert_project("Website", None);
        f.bench.load_projects().await.unwrap();
        f.bench.set_filter("walls");
        let board = f.bench.board().unwrap();
        assert_eq!(board.project_count(), 1);
        assert_eq!(board.buckets[0].label, "Farm");
    }
}

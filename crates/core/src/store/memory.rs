use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    BoardStatus, JobTask, JobsEntry, NewTask, Project, ProjectDraft, ProjectId, Resource,
    ResourceId, Task, TaskId, TaskUpdate,
};

/// One request observed by a [`MemoryStore`], in the order it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListProjects,
    FetchProject(ProjectId),
    CreateProject,
    ReplaceProject(ProjectId),
    DeleteProject(ProjectId),
    ProjectTasks(ProjectId),
    FetchTask(TaskId),
    CreateTask { resource_ids: Vec<ResourceId> },
    ReplaceTask(TaskId),
    DeleteTask(TaskId),
    StartTask(TaskId),
    FinishTask(TaskId),
    ListResources,
    CreateResource(String),
    DeleteResource(ResourceId),
    TaskResources(TaskId),
    AssignResource(TaskId, ResourceId),
    UnassignResource(TaskId, ResourceId),
    Jobs,
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            StoreCall::ListProjects
                | StoreCall::FetchProject(_)
                | StoreCall::ProjectTasks(_)
                | StoreCall::FetchTask(_)
                | StoreCall::ListResources
                | StoreCall::TaskResources(_)
                | StoreCall::Jobs
        )
    }
}

type FailureRule = Box<dyn Fn(&StoreCall) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
struct ProjectRow {
    id: ProjectId,
    description: String,
    bucket: Option<String>,
    notes: Option<String>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    projects: Vec<ProjectRow>,
    tasks: Vec<Task>,
    resources: Vec<Resource>,
    assignments: Vec<(TaskId, ResourceId)>,
    calls: Vec<StoreCall>,
    failure: Option<FailureRule>,
}

impl State {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, call: StoreCall) -> StoreResult<()> {
        let fails = self.failure.as_ref().is_some_and(|rule| rule(&call));
        self.calls.push(call.clone());
        if fails {
            return Err(StoreError::Rejected(format!("{call:?} failed")));
        }
        Ok(())
    }

    fn project(&self, id: ProjectId) -> StoreResult<&ProjectRow> {
        self.projects
            .iter()
            .find(|project| project.id == id)
            .ok_or(StoreError::NotFound {
                entity: "project",
                id: id.0,
            })
    }

    fn task(&self, id: TaskId) -> StoreResult<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound {
                entity: "task",
                id: id.0,
            })
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    fn has_resource(&self, id: ResourceId) -> bool {
        self.resources.iter().any(|resource| resource.id == id)
    }

    fn board_status(&self, task: &Task) -> BoardStatus {
        if task.completed.is_some() {
            return BoardStatus::Completed;
        }
        if task.started.is_some() {
            return BoardStatus::Active;
        }
        let blocked = task
            .dependency
            .and_then(|dep| self.tasks.iter().find(|other| other.id == dep))
            .is_some_and(|dep| dep.completed.is_none());
        if blocked {
            BoardStatus::Dependent
        } else {
            BoardStatus::AwaitingResource
        }
    }

    fn to_project(&self, row: &ProjectRow, tasks: Vec<Task>) -> Project {
        Project {
            id: row.id,
            description: row.description.clone(),
            bucket: row.bucket.clone(),
            notes: row.notes.clone(),
            possible_date: None,
            tasks,
        }
    }
}

/// In-process [`Store`] that mirrors the planning server's semantics.
///
/// Every request is appended to a call log, and a failure rule can make matching requests fail,
/// which is how dialog flows are exercised without a server.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small board used by `--demo`.
    pub fn demo() -> Self {
        let store = Self::new();
        let carpenter = store.insert_resource("Carpenter");
        let electrician = store.insert_resource("Electrician");
        let painter = store.insert_resource("Painter");

        let kitchen = store.insert_project("Kitchen refit", Some("Home"));
        let strip = store.insert_task(kitchen, "Strip old units");
        let wiring = store.insert_task(kitchen, "Rewire sockets");
        let fit = store.insert_task(kitchen, "Fit new units");
        store.set_dependency(fit, strip);
        store.assign(strip, carpenter);
        store.assign(wiring, electrician);
        store.assign(fit, carpenter);
        store.mark_started(strip, Local::now().naive_local());

        let shed = store.insert_project("Garden shed", Some("Home"));
        let paint = store.insert_task(shed, "Paint shed");
        store.assign(paint, painter);

        let launch = store.insert_project("Website launch", None);
        store.insert_task(launch, "Write copy");
        store
    }

    pub fn insert_project(&self, description: &str, bucket: Option<&str>) -> ProjectId {
        let mut state = self.state.lock();
        let id = ProjectId(state.allocate());
        state.projects.push(ProjectRow {
            id,
            description: description.to_string(),
            bucket: bucket.map(str::to_string),
            notes: None,
        });
        id
    }

    pub fn insert_task(&self, project: ProjectId, description: &str) -> TaskId {
        let mut state = self.state.lock();
        let id = TaskId(state.allocate());
        state.tasks.push(Task {
            id,
            project_id: project,
            description: description.to_string(),
            notes: None,
            duration: 1.0,
            dependency: None,
            started: None,
            completed: None,
            status: None,
        });
        id
    }

    pub fn insert_resource(&self, description: &str) -> ResourceId {
        let mut state = self.state.lock();
        let id = ResourceId(state.allocate());
        state.resources.push(Resource {
            id,
            description: description.to_string(),
        });
        id
    }

    pub fn assign(&self, task: TaskId, resource: ResourceId) {
        self.state.lock().assignments.push((task, resource));
    }

    pub fn set_dependency(&self, task: TaskId, dependency: TaskId) {
        if let Some(task) = self.state.lock().task_mut(task) {
            task.dependency = Some(dependency);
        }
    }

    pub fn mark_started(&self, task: TaskId, at: NaiveDateTime) {
        if let Some(task) = self.state.lock().task_mut(task) {
            task.started = Some(at);
        }
    }

    pub fn mark_completed(&self, task: TaskId, at: NaiveDateTime) {
        if let Some(task) = self.state.lock().task_mut(task) {
            task.completed = Some(at);
        }
    }

    /// Requests matching `rule` fail until [`MemoryStore::clear_failures`] is called.
    pub fn fail_when<F>(&self, rule: F)
    where
        F: Fn(&StoreCall) -> bool + Send + Sync + 'static,
    {
        self.state.lock().failure = Some(Box::new(rule));
    }

    pub fn clear_failures(&self) {
        self.state.lock().failure = None;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn assigned(&self, task: TaskId) -> Vec<ResourceId> {
        self.state
            .lock()
            .assignments
            .iter()
            .filter(|(t, _)| *t == task)
            .map(|(_, r)| *r)
            .collect()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.state.lock().task(id).ok().cloned()
    }

    pub fn task_count(&self) -> usize {
        self.state.lock().tasks.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut state = self.state.lock();
        state.record(StoreCall::ListProjects)?;
        let mut tasks = state.tasks.clone();
        tasks.sort_by_key(|task| task.id);
        for task in &mut tasks {
            task.status = Some(state.board_status(task));
        }
        let mut rows = state.projects.clone();
        rows.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(rows
            .iter()
            .map(|row| {
                let owned = tasks
                    .iter()
                    .filter(|task| task.project_id == row.id)
                    .cloned()
                    .collect();
                state.to_project(row, owned)
            })
            .collect())
    }

    async fn fetch_project(&self, id: ProjectId) -> StoreResult<Project> {
        let mut state = self.state.lock();
        state.record(StoreCall::FetchProject(id))?;
        let row = state.project(id)?.clone();
        Ok(state.to_project(&row, Vec::new()))
    }

    async fn create_project(&self, draft: &ProjectDraft) -> StoreResult<Project> {
        let mut state = self.state.lock();
        state.record(StoreCall::CreateProject)?;
        let row = ProjectRow {
            id: ProjectId(state.allocate()),
            description: draft.description.clone(),
            bucket: Some(draft.bucket.clone()),
            notes: Some(draft.notes.clone()),
        };
        state.projects.push(row.clone());
        Ok(state.to_project(&row, Vec::new()))
    }

    async fn replace_project(&self, id: ProjectId, draft: &ProjectDraft) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::ReplaceProject(id))?;
        if let Some(row) = state.projects.iter_mut().find(|row| row.id == id) {
            row.description = draft.description.clone();
            row.bucket = Some(draft.bucket.clone());
            row.notes = Some(draft.notes.clone());
        }
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::DeleteProject(id))?;
        state.projects.retain(|row| row.id != id);
        let removed: HashSet<TaskId> = state
            .tasks
            .iter()
            .filter(|task| task.project_id == id)
            .map(|task| task.id)
            .collect();
        state.tasks.retain(|task| !removed.contains(&task.id));
        state.assignments.retain(|(task, _)| !removed.contains(task));
        Ok(())
    }

    async fn project_tasks(&self, id: ProjectId) -> StoreResult<Vec<Task>> {
        let mut state = self.state.lock();
        state.record(StoreCall::ProjectTasks(id))?;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|task| task.project_id == id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(tasks)
    }

    async fn fetch_task(&self, id: TaskId) -> StoreResult<Task> {
        let mut state = self.state.lock();
        state.record(StoreCall::FetchTask(id))?;
        state.task(id).cloned()
    }

    async fn create_task(&self, task: &NewTask) -> StoreResult<TaskId> {
        let mut state = self.state.lock();
        state.record(StoreCall::CreateTask {
            resource_ids: task.resource_ids.clone(),
        })?;
        state.project(task.fields.project_id)?;
        if let Some(missing) = task
            .resource_ids
            .iter()
            .find(|id| !state.has_resource(**id))
        {
            return Err(StoreError::Rejected(format!("unknown resource {missing}")));
        }

        let id = TaskId(state.allocate());
        state.tasks.push(Task {
            id,
            project_id: task.fields.project_id,
            description: task.fields.description.clone(),
            notes: Some(task.fields.notes.clone()),
            duration: task.fields.duration,
            dependency: task.fields.dependency,
            started: None,
            completed: None,
            status: None,
        });
        for resource in &task.resource_ids {
            state.assignments.push((id, *resource));
        }
        Ok(id)
    }

    async fn replace_task(&self, id: TaskId, update: &TaskUpdate) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::ReplaceTask(id))?;
        if let Some(task) = state.task_mut(id) {
            task.project_id = update.fields.project_id;
            task.description = update.fields.description.clone();
            task.notes = Some(update.fields.notes.clone());
            task.duration = update.fields.duration;
            task.dependency = update.fields.dependency;
            task.started = update.started;
            task.completed = update.completed;
        }
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::DeleteTask(id))?;
        state.tasks.retain(|task| task.id != id);
        state.assignments.retain(|(task, _)| *task != id);
        Ok(())
    }

    async fn start_task(&self, id: TaskId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::StartTask(id))?;
        if let Some(task) = state.task_mut(id) {
            task.started = Some(Local::now().naive_local());
            task.completed = None;
        }
        Ok(())
    }

    async fn finish_task(&self, id: TaskId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::FinishTask(id))?;
        if let Some(task) = state.task_mut(id) {
            task.completed = Some(Local::now().naive_local());
        }
        Ok(())
    }

    async fn list_resources(&self) -> StoreResult<Vec<Resource>> {
        let mut state = self.state.lock();
        state.record(StoreCall::ListResources)?;
        let mut resources = state.resources.clone();
        resources.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(resources)
    }

    async fn create_resource(&self, description: &str) -> StoreResult<ResourceId> {
        let mut state = self.state.lock();
        state.record(StoreCall::CreateResource(description.to_string()))?;
        if state
            .resources
            .iter()
            .any(|resource| resource.description == description)
        {
            return Err(StoreError::Conflict("Resource already exists".to_string()));
        }
        let id = ResourceId(state.allocate());
        state.resources.push(Resource {
            id,
            description: description.to_string(),
        });
        Ok(id)
    }

    async fn delete_resource(&self, id: ResourceId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::DeleteResource(id))?;
        state.resources.retain(|resource| resource.id != id);
        state.assignments.retain(|(_, resource)| *resource != id);
        Ok(())
    }

    async fn task_resources(&self, task: TaskId) -> StoreResult<Vec<Resource>> {
        let mut state = self.state.lock();
        state.record(StoreCall::TaskResources(task))?;
        Ok(state
            .assignments
            .iter()
            .filter(|(t, _)| *t == task)
            .filter_map(|(_, r)| state.resources.iter().find(|resource| resource.id == *r))
            .cloned()
            .collect())
    }

    async fn assign_resource(&self, task: TaskId, resource: ResourceId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::AssignResource(task, resource))?;
        state.task(task)?;
        if !state.has_resource(resource) {
            return Err(StoreError::NotFound {
                entity: "resource",
                id: resource.0,
            });
        }
        if state.assignments.contains(&(task, resource)) {
            return Err(StoreError::Rejected(format!(
                "task {task} already requires resource {resource}"
            )));
        }
        state.assignments.push((task, resource));
        Ok(())
    }

    async fn unassign_resource(&self, task: TaskId, resource: ResourceId) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.record(StoreCall::UnassignResource(task, resource))?;
        state
            .assignments
            .retain(|assignment| *assignment != (task, resource));
        Ok(())
    }

    async fn jobs(&self) -> StoreResult<Vec<JobsEntry>> {
        let mut state = self.state.lock();
        state.record(StoreCall::Jobs)?;
        let mut resources = state.resources.clone();
        resources.sort_by(|a, b| a.description.cmp(&b.description));

        let mut entries = Vec::new();
        for resource in resources {
            let mut pending: Vec<&Task> = state
                .assignments
                .iter()
                .filter(|(_, r)| *r == resource.id)
                .filter_map(|(t, _)| state.tasks.iter().find(|task| task.id == *t))
                .filter(|task| task.completed.is_none())
                .collect();
            if pending.is_empty() {
                continue;
            }
            pending.sort_by_key(|task| task.id);
            let tasks = pending
                .into_iter()
                .map(|task| JobTask {
                    task_id: task.id,
                    project_id: task.project_id,
                    description: task.description.clone(),
                    status: task.progress().to_string(),
                    project_description: state
                        .project(task.project_id)
                        .map(|row| row.description.clone())
                        .unwrap_or_default(),
                })
                .collect();
            entries.push(JobsEntry {
                resource_id: Some(resource.id),
                description: resource.description,
                tasks,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskFields;
    use pretty_assertions::assert_eq;

    fn fields(project: ProjectId, description: &str) -> TaskFields {
        TaskFields {
            project_id: project,
            description: description.to_string(),
            notes: String::new(),
            duration: 1.0,
            dependency: None,
        }
    }

    #[tokio::test]
    async fn board_status_follows_dependency_and_timestamps() {
        let store = MemoryStore::new();
        let project = store.insert_project("House", None);
        let first = store.insert_task(project, "Foundations");
        let second = store.insert_task(project, "Walls");
        let third = store.insert_task(project, "Roof");
        store.set_dependency(second, first);
        store.mark_started(third, Local::now().naive_local());

        let projects = store.list_projects().await.unwrap();
        let statuses: Vec<_> = projects[0].tasks.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![
                Some(BoardStatus::AwaitingResource),
                Some(BoardStatus::Dependent),
                Some(BoardStatus::Active)
            ]
        );
    }

    #[tokio::test]
    async fn create_task_with_unknown_resource_creates_nothing() {
        let store = MemoryStore::new();
        let project = store.insert_project("House", None);
        let result = store
            .create_task(&NewTask {
                fields: fields(project, "Walls"),
                resource_ids: vec![ResourceId(404)],
            })
            .await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert_eq!(store.task_count(), 0);
    }

    #[tokio::test]
    async fn deleting_project_cascades_to_tasks_and_assignments() {
        let store = MemoryStore::new();
        let project = store.insert_project("House", None);
        let task = store.insert_task(project, "Walls");
        let mason = store.insert_resource("Mason");
        store.assign(task, mason);

        store.delete_project(project).await.unwrap();

        assert_eq!(store.task_count(), 0);
        assert!(store.assigned(task).is_empty());
    }

    #[tokio::test]
    async fn duplicate_resource_name_conflicts() {
        let store = MemoryStore::new();
        store.create_resource("Crane").await.unwrap();
        let err = store.create_resource("Crane").await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("Resource already exists".into()));
    }

    #[tokio::test]
    async fn failure_rule_rejects_matching_calls_and_logs_them() {
        let store = MemoryStore::new();
        store.fail_when(|call| matches!(call, StoreCall::Jobs));
        assert!(store.jobs().await.is_err());
        assert!(store.list_resources().await.is_ok());
        assert_eq!(store.calls(), vec![StoreCall::Jobs, StoreCall::ListResources]);
    }

    #[tokio::test]
    async fn jobs_skip_completed_tasks() {
        let store = MemoryStore::new();
        let project = store.insert_project("House", None);
        let open = store.insert_task(project, "Walls");
        let done = store.insert_task(project, "Floor");
        let mason = store.insert_resource("Mason");
        store.assign(open, mason);
        store.assign(done, mason);
        store.mark_completed(done, Local::now().naive_local());

        let jobs = store.jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].tasks.len(), 1);
        assert_eq!(jobs[0].tasks[0].task_id, open);
        assert_eq!(jobs[0].tasks[0].status, "Not Started");
        assert_eq!(jobs[0].tasks[0].project_description, "House");
    }
}

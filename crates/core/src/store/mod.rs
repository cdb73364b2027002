//! Store Client: every read and write the board performs against the external store.

mod http;
mod memory;

use async_trait::async_trait;

pub use http::{Endpoint, HttpStore, Verb};
pub use memory::{MemoryStore, StoreCall};

use crate::error::StoreResult;
use crate::model::{
    JobsEntry, NewTask, Project, ProjectDraft, ProjectId, Resource, ResourceId, Task, TaskId,
    TaskUpdate,
};

/// Typed view over the store's REST surface.
///
/// Every call either yields decoded records or a [`crate::StoreError`]; implementations keep no
/// cache, so callers re-fetch whatever they need after a mutation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Projects with their tasks embedded, each task carrying its board status.
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;
    async fn fetch_project(&self, id: ProjectId) -> StoreResult<Project>;
    async fn create_project(&self, draft: &ProjectDraft) -> StoreResult<Project>;
    async fn replace_project(&self, id: ProjectId, draft: &ProjectDraft) -> StoreResult<()>;
    /// Deleting a project also deletes its tasks on the store side.
    async fn delete_project(&self, id: ProjectId) -> StoreResult<()>;
    async fn project_tasks(&self, id: ProjectId) -> StoreResult<Vec<Task>>;

    async fn fetch_task(&self, id: TaskId) -> StoreResult<Task>;
    /// Creates the task and all of `task.resource_ids` associations atomically.
    async fn create_task(&self, task: &NewTask) -> StoreResult<TaskId>;
    async fn replace_task(&self, id: TaskId, update: &TaskUpdate) -> StoreResult<()>;
    async fn delete_task(&self, id: TaskId) -> StoreResult<()>;
    async fn start_task(&self, id: TaskId) -> StoreResult<()>;
    async fn finish_task(&self, id: TaskId) -> StoreResult<()>;

    async fn list_resources(&self) -> StoreResult<Vec<Resource>>;
    async fn create_resource(&self, description: &str) -> StoreResult<ResourceId>;
    /// Also drops the resource from every task that required it.
    async fn delete_resource(&self, id: ResourceId) -> StoreResult<()>;

    async fn task_resources(&self, task: TaskId) -> StoreResult<Vec<Resource>>;
    async fn assign_resource(&self, task: TaskId, resource: ResourceId) -> StoreResult<()>;
    async fn unassign_resource(&self, task: TaskId, resource: ResourceId) -> StoreResult<()>;

    /// Incomplete tasks grouped by the resource they require.
    async fn jobs(&self) -> StoreResult<Vec<JobsEntry>>;
}

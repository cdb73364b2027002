//! Task-Resource Buffer: the task editor's view of the resources its task requires.

use tracing::{debug, info};

use crate::error::StoreResult;
use crate::model::{Resource, ResourceId, TaskId};
use crate::store::Store;

/// Fixed for the life of a buffer: whether the subject task already exists on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMode {
    /// Edits go to the store immediately; the buffer mirrors confirmed associations.
    Bound(TaskId),
    /// Edits stay local until the task is created with the full set.
    Unbound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskResourceBuffer {
    mode: BufferMode,
    resources: Vec<Resource>,
}

impl TaskResourceBuffer {
    pub fn unbound() -> Self {
        Self {
            mode: BufferMode::Unbound,
            resources: Vec::new(),
        }
    }

    /// Loads the current associations of an existing task, or starts empty for a new one.
    pub async fn load(store: &dyn Store, task: Option<TaskId>) -> StoreResult<Self> {
        match task {
            Some(id) => {
                let resources = store.task_resources(id).await?;
                debug!(task = %id, count = resources.len(), "loaded task resources");
                Ok(Self {
                    mode: BufferMode::Bound(id),
                    resources,
                })
            }
            None => Ok(Self::unbound()),
        }
    }

    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.resources.iter().any(|resource| resource.id == id)
    }

    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resources.iter().map(|resource| resource.id).collect()
    }

    /// Everything in `all` that the buffer does not already hold.
    pub fn candidates(&self, all: &[Resource]) -> Vec<Resource> {
        all.iter()
            .filter(|resource| !self.contains(resource.id))
            .cloned()
            .collect()
    }

    /// Appends `resource`; in bound mode only after the store accepted the association.
    pub async fn add(&mut self, store: &dyn Store, resource: Resource) -> StoreResult<()> {
        if self.contains(resource.id) {
            return Ok(());
        }
        if let BufferMode::Bound(task) = self.mode {
            store.assign_resource(task, resource.id).await?;
            info!(task = %task, resource = %resource.id, "resource assigned");
        }
        self.resources.push(resource);
        Ok(())
    }

    /// Removes `id`; in bound mode only after the store dropped the association.
    pub async fn remove(&mut self, store: &dyn Store, id: ResourceId) -> StoreResult<()> {
        if let BufferMode::Bound(task) = self.mode {
            store.unassign_resource(task, id).await?;
            info!(task = %task, resource = %id, "resource unassigned");
        }
        self.resources.retain(|resource| resource.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreCall};
    use pretty_assertions::assert_eq;

    fn resource(id: ResourceId, description: &str) -> Resource {
        Resource {
            id,
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn unbound_edits_never_reach_the_store() {
        let store = MemoryStore::new();
        let crane = store.insert_resource("Crane");
        let van = store.insert_resource("Van");

        let mut buffer = TaskResourceBuffer::load(&store, None).await.unwrap();
        buffer.add(&store, resource(crane, "Crane")).await.unwrap();
        buffer.add(&store, resource(van, "Van")).await.unwrap();
        buffer.remove(&store, crane).await.unwrap();

        assert_eq!(buffer.mode(), BufferMode::Unbound);
        assert_eq!(buffer.resource_ids(), vec![van]);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn bound_edits_mirror_store_associations() {
        let store = MemoryStore::new();
        let project = store.insert_project("Barn", None);
        let task = store.insert_task(project, "Roof");
        let crane = store.insert_resource("Crane");

        let mut buffer = TaskResourceBuffer::load(&store, Some(task)).await.unwrap();
        buffer.add(&store, resource(crane, "Crane")).await.unwrap();
        assert!(buffer.contains(crane));
        assert_eq!(store.assigned(task), vec![crane]);

        buffer.remove(&store, crane).await.unwrap();
        assert!(!buffer.contains(crane));
        assert!(store.assigned(task).is_empty());
    }

    #[tokio::test]
    async fn failed_association_leaves_buffer_untouched() {
        let store = MemoryStore::new();
        let project = store.insert_project("Barn", None);
        let task = store.insert_task(project, "Roof");
        let crane = store.insert_resource("Crane");
        let mut buffer = TaskResourceBuffer::load(&store, Some(task)).await.unwrap();

        store.fail_when(|call| matches!(call, StoreCall::AssignResource(..)));
        assert!(buffer.add(&store, resource(crane, "Crane")).await.is_err());
        assert!(buffer.resources().is_empty());
    }

    #[test]
    fn candidates_exclude_buffered_resources() {
        let mut buffer = TaskResourceBuffer::unbound();
        buffer.resources.push(resource(ResourceId(1), "Crane"));
        let all = vec![resource(ResourceId(1), "Crane"), resource(ResourceId(2), "Van")];
        assert_eq!(buffer.candidates(&all), vec![resource(ResourceId(2), "Van")]);
    }
}

//! Jobs Aggregator: read-only view of pending work per resource.

use tracing::debug;

use crate::error::StoreResult;
use crate::model::{JobTask, ResourceId, TaskId};
use crate::store::Store;

pub const NO_JOBS: &str = "No available jobs for this resource.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobGroup {
    /// Absent when the server omits the id; the group still lists by description.
    pub resource_id: Option<ResourceId>,
    pub description: String,
    pub jobs: Vec<JobTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobsBoard {
    pub groups: Vec<JobGroup>,
}

impl JobsBoard {
    pub async fn load(store: &dyn Store) -> StoreResult<Self> {
        let entries = store.jobs().await?;
        debug!(resources = entries.len(), "loaded jobs board");
        Ok(Self {
            groups: entries
                .into_iter()
                .map(|entry| JobGroup {
                    resource_id: entry.resource_id,
                    description: entry.description,
                    jobs: entry.tasks,
                })
                .collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Jobs in display order, flattened across groups.
    pub fn jobs(&self) -> impl Iterator<Item = &JobTask> {
        self.groups.iter().flat_map(|group| group.jobs.iter())
    }

    pub fn find(&self, task: TaskId) -> Option<&JobTask> {
        self.jobs().find(|job| job.task_id == task)
    }
}

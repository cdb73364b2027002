use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_DURATION_DAYS: f64 = 1.0;

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M";

macro_rules! record_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(ProjectId);
record_id!(TaskId);
record_id!(ResourceId);

/// Status the store derives for each task embedded in the project snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardStatus {
    Completed,
    Active,
    Dependent,
    #[serde(rename = "Awaiting resource")]
    AwaitingResource,
}

impl BoardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardStatus::Completed => "Completed",
            BoardStatus::Active => "Active",
            BoardStatus::Dependent => "Dependent",
            BoardStatus::AwaitingResource => "Awaiting resource",
        }
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a task as recorded by its start and completion timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    NotStarted,
    Started(NaiveDateTime),
    Completed(NaiveDateTime),
}

impl Progress {
    pub fn can_start(&self) -> bool {
        matches!(self, Progress::NotStarted)
    }

    pub fn can_finish(&self) -> bool {
        matches!(self, Progress::Started(_))
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::NotStarted => write!(f, "Not Started"),
            Progress::Started(at) => write!(f, "Started {}", at.format(TIMESTAMP_DISPLAY)),
            Progress::Completed(at) => write!(f, "Completed {}", at.format(TIMESTAMP_DISPLAY)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "ProjectID")]
    pub id: ProjectId,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Bucket", default)]
    pub bucket: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_date: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    /// Bucket label used for grouping; blank or missing buckets collapse into [`UNCATEGORIZED`].
    pub fn bucket_label(&self) -> &str {
        match self.bucket.as_deref() {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ => UNCATEGORIZED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "TaskID")]
    pub id: TaskId,
    #[serde(rename = "ProjectID")]
    pub project_id: ProjectId,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
    #[serde(rename = "Duration", default = "default_duration")]
    pub duration: f64,
    #[serde(rename = "DependentTaskID", default)]
    pub dependency: Option<TaskId>,
    #[serde(rename = "Started", default)]
    pub started: Option<NaiveDateTime>,
    #[serde(rename = "Completed", default)]
    pub completed: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BoardStatus>,
}

impl Task {
    pub fn progress(&self) -> Progress {
        match (self.started, self.completed) {
            (_, Some(completed)) => Progress::Completed(completed),
            (Some(started), None) => Progress::Started(started),
            (None, None) => Progress::NotStarted,
        }
    }
}

fn default_duration() -> f64 {
    DEFAULT_DURATION_DAYS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "ResourceID")]
    pub id: ResourceId,
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDraft {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// Metadata shared by task creation and replacement payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskFields {
    #[serde(rename = "ProjectID")]
    pub project_id: ProjectId,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "DependentTaskID")]
    pub dependency: Option<TaskId>,
}

/// Creation payload; associations are created with the task in one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    #[serde(flatten)]
    pub fields: TaskFields,
    #[serde(rename = "ResourceIDs")]
    pub resource_ids: Vec<ResourceId>,
}

/// Replacement payload; the store overwrites timestamps, so callers echo the current ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(flatten)]
    pub fields: TaskFields,
    #[serde(rename = "Started")]
    pub started: Option<NaiveDateTime>,
    #[serde(rename = "Completed")]
    pub completed: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsEntry {
    #[serde(rename = "ResourceID", default)]
    pub resource_id: Option<ResourceId>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<JobTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTask {
    #[serde(rename = "TaskID")]
    pub task_id: TaskId,
    #[serde(rename = "ProjectID")]
    pub project_id: ProjectId,
    #[serde(rename = "Description")]
    pub description: String,
    pub status: String,
    #[serde(rename = "ProjectDescription")]
    pub project_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .and_then(|d| d.and_hms_opt(hour, 30, 0))
            .unwrap()
    }

    #[test]
    fn bucket_label_defaults_blank_and_missing() {
        let mut project: Project = serde_json::from_str(
            r#"{"ProjectID": 3, "Description": "Garden", "Bucket": null, "Notes": null}"#,
        )
        .unwrap();
        assert_eq!(project.bucket_label(), UNCATEGORIZED);
        project.bucket = Some(String::new());
        assert_eq!(project.bucket_label(), UNCATEGORIZED);
        project.bucket = Some("Home".into());
        assert_eq!(project.bucket_label(), "Home");
    }

    #[test]
    fn task_decodes_store_row_with_iso_timestamps() {
        let task: Task = serde_json::from_str(
            r#"{"TaskID": 7, "ProjectID": 2, "Description": "Dig", "Notes": "",
                "Duration": 2.5, "Started": "2024-03-04T09:30:00.123456",
                "Completed": null, "DependentTaskID": null, "status": "Active"}"#,
        )
        .unwrap();
        assert_eq!(task.id, TaskId(7));
        assert_eq!(task.duration, 2.5);
        assert_eq!(task.status, Some(BoardStatus::Active));
        assert!(matches!(task.progress(), Progress::Started(_)));
    }

    #[test]
    fn progress_labels_follow_timestamps() {
        assert_eq!(Progress::NotStarted.to_string(), "Not Started");
        assert_eq!(Progress::Started(at(9)).to_string(), "Started 2024-03-04 09:30");
        assert_eq!(
            Progress::Completed(at(17)).to_string(),
            "Completed 2024-03-04 17:30"
        );
        assert!(Progress::NotStarted.can_start());
        assert!(Progress::Started(at(9)).can_finish());
        assert!(!Progress::Completed(at(9)).can_finish());
    }

    #[test]
    fn jobs_entry_tolerates_missing_resource_id() {
        let entries: Vec<JobsEntry> = serde_json::from_str(
            r#"[{"Description": "Digger", "tasks": [{"TaskID": 3, "ProjectID": 1,
                "Description": "Trench", "status": "Not Started",
                "ProjectDescription": "Garden"}]},
              {"ResourceID": 4, "Description": "Van"}]"#,
        )
        .unwrap();
        assert_eq!(entries[0].resource_id, None);
        assert_eq!(entries[0].tasks[0].task_id, TaskId(3));
        assert_eq!(entries[1].resource_id, Some(ResourceId(4)));
        assert!(entries[1].tasks.is_empty());
    }

    #[test]
    fn new_task_payload_carries_resource_ids() {
        let payload = NewTask {
            fields: TaskFields {
                project_id: ProjectId(1),
                description: "Paint".into(),
                notes: String::new(),
                duration: 1.0,
                dependency: None,
            },
            resource_ids: vec![ResourceId(4), ResourceId(9)],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["ProjectID"], 1);
        assert_eq!(value["ResourceIDs"], serde_json::json!([4, 9]));
        assert!(value["DependentTaskID"].is_null());
    }
}

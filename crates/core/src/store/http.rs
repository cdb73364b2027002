use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    JobsEntry, NewTask, Project, ProjectDraft, ProjectId, Resource, ResourceId, Task, TaskId,
    TaskUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// Entity kind plus identity; resolves to a path under `/api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Projects,
    NewProject,
    Project(ProjectId),
    ProjectTasks(ProjectId),
    NewTask,
    Task(TaskId),
    TaskStart(TaskId),
    TaskFinish(TaskId),
    Resources,
    Resource(ResourceId),
    TaskResources(TaskId),
    TaskResource(TaskId, ResourceId),
    Jobs,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Projects => "/api/projects".to_string(),
            Endpoint::NewProject => "/api/project".to_string(),
            Endpoint::Project(id) => format!("/api/project/{id}"),
            Endpoint::ProjectTasks(id) => format!("/api/project/{id}/tasks"),
            Endpoint::NewTask => "/api/task".to_string(),
            Endpoint::Task(id) => format!("/api/task/{id}"),
            Endpoint::TaskStart(id) => format!("/api/task/{id}/start"),
            Endpoint::TaskFinish(id) => format!("/api/task/{id}/finish"),
            Endpoint::Resources => "/api/resources".to_string(),
            Endpoint::Resource(id) => format!("/api/resource/{id}"),
            Endpoint::TaskResources(id) => format!("/api/task/{id}/resources"),
            Endpoint::TaskResource(task, resource) => {
                format!("/api/task/{task}/resource/{resource}")
            }
            Endpoint::Jobs => "/api/jobs".to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    #[serde(rename = "TaskID")]
    id: TaskId,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    #[serde(rename = "ResourceID")]
    id: ResourceId,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct ResourceBody<'a> {
    #[serde(rename = "Description")]
    description: &'a str,
}

#[derive(Serialize)]
struct AssignmentBody {
    #[serde(rename = "ResourceID")]
    resource: ResourceId,
}

/// [`Store`] backed by the planning server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed building HTTP client for the store")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, verb: Verb, endpoint: Endpoint, body: Option<Vec<u8>>) -> StoreResult<String> {
        let path = endpoint.path();
        let url = format!("{}{}", self.base_url, path);
        debug!(method = verb.as_str(), path = %path, "store request");

        let mut request = self.client.request(verb.method(), &url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|err| StoreError::Transport {
            method: verb.as_str(),
            path: path.clone(),
            message: err.to_string(),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| StoreError::Transport {
            method: verb.as_str(),
            path: path.clone(),
            message: err.to_string(),
        })?;

        if status == StatusCode::CONFLICT {
            warn!(path = %path, "store reported a conflict");
            return Err(StoreError::Conflict(conflict_message(&text)));
        }
        if !status.is_success() {
            warn!(method = verb.as_str(), path = %path, status = status.as_u16(), "store request failed");
            return Err(StoreError::Status {
                method: verb.as_str(),
                path,
                status: status.as_u16(),
            });
        }
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> StoreResult<T> {
        let text = self.send(Verb::Get, endpoint, None).await?;
        decode(endpoint, &text)
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> StoreResult<String> {
        self.send(Verb::Post, endpoint, Some(encode(endpoint, body)?))
            .await
    }

    async fn put<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> StoreResult<()> {
        self.send(Verb::Put, endpoint, Some(encode(endpoint, body)?))
            .await
            .map(|_| ())
    }

    async fn delete(&self, endpoint: Endpoint) -> StoreResult<()> {
        self.send(Verb::Delete, endpoint, None).await.map(|_| ())
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.get(Endpoint::Projects).await
    }

    async fn fetch_project(&self, id: ProjectId) -> StoreResult<Project> {
        self.get(Endpoint::Project(id)).await
    }

    async fn create_project(&self, draft: &ProjectDraft) -> StoreResult<Project> {
        let text = self.post(Endpoint::NewProject, draft).await?;
        decode(Endpoint::NewProject, &text)
    }

    async fn replace_project(&self, id: ProjectId, draft: &ProjectDraft) -> StoreResult<()> {
        self.put(Endpoint::Project(id), draft).await
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<()> {
        self.delete(Endpoint::Project(id)).await
    }

    async fn project_tasks(&self, id: ProjectId) -> StoreResult<Vec<Task>> {
        self.get(Endpoint::ProjectTasks(id)).await
    }

    async fn fetch_task(&self, id: TaskId) -> StoreResult<Task> {
        self.get(Endpoint::Task(id)).await
    }

    async fn create_task(&self, task: &NewTask) -> StoreResult<TaskId> {
        let text = self.post(Endpoint::NewTask, task).await?;
        let created: CreatedTask = decode(Endpoint::NewTask, &text)?;
        Ok(created.id)
    }

    async fn replace_task(&self, id: TaskId, update: &TaskUpdate) -> StoreResult<()> {
        self.put(Endpoint::Task(id), update).await
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.delete(Endpoint::Task(id)).await
    }

    async fn start_task(&self, id: TaskId) -> StoreResult<()> {
        self.send(Verb::Post, Endpoint::TaskStart(id), None)
            .await
            .map(|_| ())
    }

    async fn finish_task(&self, id: TaskId) -> StoreResult<()> {
        self.send(Verb::Post, Endpoint::TaskFinish(id), None)
            .await
            .map(|_| ())
    }

    async fn list_resources(&self) -> StoreResult<Vec<Resource>> {
        self.get(Endpoint::Resources).await
    }

    async fn create_resource(&self, description: &str) -> StoreResult<ResourceId> {
        let text = self
            .post(Endpoint::Resources, &ResourceBody { description })
            .await?;
        let created: CreatedResource = decode(Endpoint::Resources, &text)?;
        Ok(created.id)
    }

    async fn delete_resource(&self, id: ResourceId) -> StoreResult<()> {
        self.delete(Endpoint::Resource(id)).await
    }

    async fn task_resources(&self, task: TaskId) -> StoreResult<Vec<Resource>> {
        self.get(Endpoint::TaskResources(task)).await
    }

    async fn assign_resource(&self, task: TaskId, resource: ResourceId) -> StoreResult<()> {
        self.post(Endpoint::TaskResources(task), &AssignmentBody { resource })
            .await
            .map(|_| ())
    }

    async fn unassign_resource(&self, task: TaskId, resource: ResourceId) -> StoreResult<()> {
        self.delete(Endpoint::TaskResource(task, resource)).await
    }

    async fn jobs(&self) -> StoreResult<Vec<JobsEntry>> {
        self.get(Endpoint::Jobs).await
    }
}

fn encode<B: Serialize + ?Sized>(endpoint: Endpoint, body: &B) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(body).map_err(|err| StoreError::Decode {
        path: endpoint.path(),
        message: err.to_string(),
    })
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, text: &str) -> StoreResult<T> {
    serde_json::from_str(text).map_err(|err| StoreError::Decode {
        path: endpoint.path(),
        message: err.to_string(),
    })
}

fn conflict_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "Resource already exists".to_string())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::model::BoardStatus;

    /// Answers one request with a canned response; the handle yields the request line.
    fn serve_once(status: &str, body: &str) -> (HttpStore, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).expect("write response");
            request
        });
        let client = Client::builder().no_proxy().build().expect("client");
        (HttpStore { client, base_url }, handle)
    }

    fn read_request(stream: &mut impl Read) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut chunk).expect("read request");
            assert!(n > 0, "connection closed before headers ended");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + length {
            let n = stream.read(&mut chunk).expect("read body");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        head.lines().next().unwrap_or_default().to_string()
    }

    #[rstest]
    #[case(Endpoint::Projects, "/api/projects")]
    #[case(Endpoint::NewProject, "/api/project")]
    #[case(Endpoint::ProjectTasks(ProjectId(4)), "/api/project/4/tasks")]
    #[case(Endpoint::TaskFinish(TaskId(9)), "/api/task/9/finish")]
    #[case(Endpoint::Resource(ResourceId(2)), "/api/resource/2")]
    #[case(Endpoint::TaskResources(TaskId(3)), "/api/task/3/resources")]
    #[case(Endpoint::TaskResource(TaskId(3), ResourceId(8)), "/api/task/3/resource/8")]
    #[case(Endpoint::Jobs, "/api/jobs")]
    fn endpoints_resolve_to_api_paths(#[case] endpoint: Endpoint, #[case] expected: &str) {
        assert_eq!(endpoint.path(), expected);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let store = HttpStore::new("http://localhost:5000/").unwrap();
        assert_eq!(store.base_url(), "http://localhost:5000");
    }

    #[test]
    fn conflict_message_prefers_server_text() {
        assert_eq!(
            conflict_message(r#"{"status": "error", "message": "Resource already exists"}"#),
            "Resource already exists"
        );
        assert_eq!(conflict_message("<html>"), "Resource already exists");
    }

    #[test]
    fn decode_reports_path_on_malformed_body() {
        let err = decode::<Vec<Project>>(Endpoint::Projects, "not json").unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref path, .. } if path == "/api/projects"));
    }

    #[test]
    fn created_task_reads_task_id() {
        let created: CreatedTask =
            decode(Endpoint::NewTask, r#"{"status": "success", "TaskID": 12}"#).unwrap();
        assert_eq!(created.id, TaskId(12));
    }

    #[tokio::test]
    async fn conflict_status_carries_server_message() {
        let (store, server) = serve_once(
            "409 CONFLICT",
            r#"{"status": "error", "message": "Resource already exists"}"#,
        );
        let err = store.create_resource("Plumber").await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("Resource already exists".to_string()));
        assert_eq!(server.join().unwrap(), "POST /api/resources HTTP/1.1");
    }

    #[tokio::test]
    async fn server_error_maps_to_status_with_method_and_path() {
        let (store, server) = serve_once(
            "500 INTERNAL SERVER ERROR",
            r#"{"status": "error", "message": "boom"}"#,
        );
        let err = store.delete_task(TaskId(1)).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Status {
                method: "DELETE",
                path: "/api/task/1".to_string(),
                status: 500,
            }
        );
        assert_eq!(server.join().unwrap(), "DELETE /api/task/1 HTTP/1.1");
    }

    #[tokio::test]
    async fn created_resource_reads_id_from_success_body() {
        let (store, server) = serve_once("201 CREATED", r#"{"status": "success", "ResourceID": 7}"#);
        assert_eq!(store.create_resource("Tiler").await.unwrap(), ResourceId(7));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn projects_decode_with_microsecond_timestamps() {
        let body = r#"[{"Bucket": "Home", "Description": "Kitchen", "Notes": null, "ProjectID": 1,
            "tasks": [{"Completed": null, "DependentTaskID": null, "Description": "Tile splashback",
                "Duration": 2.5, "Notes": null, "ProjectID": 1,
                "Started": "2024-03-01T09:30:00.123456", "TaskID": 10, "status": "Active"},
              {"Completed": "2024-02-28T17:05:12.000001", "DependentTaskID": 10,
                "Description": "Order tiles", "Duration": 1.0, "Notes": "", "ProjectID": 1,
                "Started": "2024-02-27T08:00:00.5", "TaskID": 11, "status": "Completed"}]}]"#;
        let (store, server) = serve_once("200 OK", body);
        let projects = store.list_projects().await.unwrap();
        assert_eq!(server.join().unwrap(), "GET /api/projects HTTP/1.1");

        assert_eq!(projects.len(), 1);
        let tasks = &projects[0].tasks;
        let started = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_micro_opt(9, 30, 0, 123_456))
            .unwrap();
        assert_eq!(tasks[0].started, Some(started));
        assert_eq!(tasks[0].status, Some(BoardStatus::Active));
        assert_eq!(tasks[1].dependency, Some(TaskId(10)));
        let completed = NaiveDate::from_ymd_opt(2024, 2, 28)
            .and_then(|d| d.and_hms_micro_opt(17, 5, 12, 1))
            .unwrap();
        assert_eq!(tasks[1].completed, Some(completed));
    }
}

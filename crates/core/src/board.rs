//! Board View: the bucketed, filtered projection of the project snapshot.

use std::collections::BTreeMap;

use crate::model::{BoardStatus, Project, ProjectId, Task, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub buckets: Vec<BucketColumn>,
}

impl Board {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn project_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.projects.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketColumn {
    pub label: String,
    pub projects: Vec<ProjectCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCard {
    pub id: ProjectId,
    pub description: String,
    pub possible_date: Option<String>,
    pub tasks: Vec<TaskLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskLine {
    pub id: TaskId,
    pub description: String,
    pub status: Option<BoardStatus>,
}

impl From<&Task> for TaskLine {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            description: task.description.clone(),
            status: task.status,
        }
    }
}

/// Groups the projects passing `filter` by bucket label.
///
/// A project passes when its description or any of its task descriptions contains the filter,
/// compared case-insensitively with surrounding spaces kept; a passing project keeps all of its
/// tasks. Buckets come out in lexicographic order, projects within a bucket keep snapshot order,
/// and empty buckets are dropped.
pub fn build_board(projects: &[Project], filter: &str) -> Board {
    let needle = filter.to_lowercase();
    let mut buckets: BTreeMap<String, Vec<ProjectCard>> = BTreeMap::new();

    for project in projects.iter().filter(|p| matches_filter(p, &needle)) {
        buckets
            .entry(project.bucket_label().to_string())
            .or_default()
            .push(ProjectCard {
                id: project.id,
                description: project.description.clone(),
                possible_date: project.possible_date.clone(),
                tasks: project.tasks.iter().map(TaskLine::from).collect(),
            });
    }

    Board {
        buckets: buckets
            .into_iter()
            .map(|(label, projects)| BucketColumn { label, projects })
            .collect(),
    }
}

fn matches_filter(project: &Project, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    project.description.to_lowercase().contains(needle)
        || project
            .tasks
            .iter()
            .any(|task| task.description.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn task(id: i64, project: i64, description: &str) -> Task {
        Task {
            id: TaskId(id),
            project_id: ProjectId(project),
            description: description.to_string(),
            notes: None,
            duration: 1.0,
            dependency: None,
            started: None,
            completed: None,
            status: Some(BoardStatus::AwaitingResource),
        }
    }

    fn project(id: i64, description: &str, bucket: Option<&str>, tasks: Vec<Task>) -> Project {
        Project {
            id: ProjectId(id),
            description: description.to_string(),
            bucket: bucket.map(str::to_string),
            notes: None,
            possible_date: None,
            tasks,
        }
    }

    fn snapshot() -> Vec<Project> {
        vec![
            project(1, "Kitchen", Some("Home"), vec![task(10, 1, "Tile splashback"), task(11, 1, "Plumbing")]),
            project(2, "Launch site", Some("Work"), vec![task(20, 2, "Write copy")]),
            project(3, "Garden", Some("Home"), vec![]),
            project(4, "Taxes", None, vec![task(40, 4, "Gather receipts")]),
        ]
    }

    fn labels(board: &Board) -> Vec<&str> {
        board.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn empty_filter_shows_everything_grouped_and_sorted() {
        let board = build_board(&snapshot(), "");
        assert_eq!(labels(&board), vec!["Home", "Uncategorized", "Work"]);
        let home: Vec<_> = board.buckets[0].projects.iter().map(|p| p.id).collect();
        assert_eq!(home, vec![ProjectId(1), ProjectId(3)]);
    }

    #[test]
    fn task_match_keeps_every_task_of_the_project() {
        let board = build_board(&snapshot(), "TILE");
        assert_eq!(labels(&board), vec!["Home"]);
        assert_eq!(board.project_count(), 1);
        assert_eq!(board.buckets[0].projects[0].tasks.len(), 2);
    }

    #[rstest]
    #[case("garden", 1)]
    #[case("copy", 1)]
    #[case("e", 4)]
    #[case("nothing matches", 0)]
    #[case(" ", 3)]
    #[case(" kitchen", 0)]
    #[case("site ", 0)]
    fn every_shown_project_matches_filter(#[case] filter: &str, #[case] expected: usize) {
        let projects = snapshot();
        let board = build_board(&projects, filter);
        assert_eq!(board.project_count(), expected);

        let needle = filter.to_lowercase();
        for card in board.buckets.iter().flat_map(|b| &b.projects) {
            let hit = card.description.to_lowercase().contains(&needle)
                || card
                    .tasks
                    .iter()
                    .any(|t| t.description.to_lowercase().contains(&needle));
            assert!(hit, "{} shown without a match", card.description);
        }
    }

    #[test]
    fn no_matches_yield_no_buckets() {
        assert!(build_board(&snapshot(), "zzz").is_empty());
    }
}

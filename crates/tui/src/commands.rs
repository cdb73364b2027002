use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::cli::{BoardArgs, CliCommand, ResourceCommand};
use crate::core::{build_board, Board, JobsBoard, LoadError, ResourceId, NO_JOBS};
use crate::runtime::build_runtime;
use crate::store::Store;

pub fn execute<W: Write>(store: Arc<dyn Store>, command: CliCommand, mut writer: W) -> Result<()> {
    let runtime = build_runtime()?;
    match command {
        CliCommand::Board(args) => runtime.block_on(handle_board(store.as_ref(), &args, &mut writer)),
        CliCommand::Jobs => runtime.block_on(handle_jobs(store.as_ref(), &mut writer)),
        CliCommand::Resources(command) => {
            runtime.block_on(handle_resources(store.as_ref(), command, &mut writer))
        }
        CliCommand::Tui => Err(anyhow!("launch interactive surfaces directly")),
    }
}

async fn handle_board<W: Write>(store: &dyn Store, args: &BoardArgs, mut writer: W) -> Result<()> {
    let projects = store.list_projects().await.map_err(LoadError::from)?;
    let board = build_board(&projects, args.filter.as_deref().unwrap_or_default());
    write_board(&board, &mut writer)
}

fn write_board<W: Write>(board: &Board, mut writer: W) -> Result<()> {
    if board.is_empty() {
        writeln!(writer, "No projects match.")?;
        return Ok(());
    }
    for bucket in &board.buckets {
        writeln!(writer, "== {} ==", bucket.label)?;
        for project in &bucket.projects {
            match &project.possible_date {
                Some(date) => writeln!(writer, "#{} {} (possible {})", project.id, project.description, date)?,
                None => writeln!(writer, "#{} {}", project.id, project.description)?,
            }
            for task in &project.tasks {
                let status = task.status.map(|s| s.as_str()).unwrap_or("-");
                writeln!(writer, "    #{} {} [{}]", task.id, task.description, status)?;
            }
        }
    }
    Ok(())
}

async fn handle_jobs<W: Write>(store: &dyn Store, mut writer: W) -> Result<()> {
    let jobs = JobsBoard::load(store).await?;
    if jobs.is_empty() {
        writeln!(writer, "No pending jobs.")?;
        return Ok(());
    }
    for group in &jobs.groups {
        writeln!(writer, "== {} ==", group.description)?;
        if group.jobs.is_empty() {
            writeln!(writer, "    {NO_JOBS}")?;
        }
        for job in &group.jobs {
            writeln!(
                writer,
                "    #{} {} ({}) {}",
                job.task_id, job.description, job.project_description, job.status
            )?;
        }
    }
    Ok(())
}

async fn handle_resources<W: Write>(
    store: &dyn Store,
    command: ResourceCommand,
    mut writer: W,
) -> Result<()> {
    match command {
        ResourceCommand::List => {
            let resources = store.list_resources().await?;
            if resources.is_empty() {
                writeln!(writer, "No resources.")?;
            }
            for resource in resources {
                writeln!(writer, "#{} {}", resource.id, resource.description)?;
            }
        }
        ResourceCommand::Add { name } => {
            let name = name.join(" ");
            let name = name.trim();
            if name.is_empty() {
                writeln!(writer, "{}", ResourceLine::Ignored)?;
                return Ok(());
            }
            let id = store.create_resource(name).await?;
            writeln!(writer, "{}", ResourceLine::Added(id, name.to_string()))?;
        }
        ResourceCommand::Delete { id } => {
            let id = ResourceId(id);
            store.delete_resource(id).await?;
            writeln!(writer, "{}", ResourceLine::Deleted(id))?;
        }
    }
    Ok(())
}

enum ResourceLine {
    Added(ResourceId, String),
    Deleted(ResourceId),
    Ignored,
}

impl fmt::Display for ResourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLine::Added(id, name) => write!(f, "Added resource #{id} {name}"),
            ResourceLine::Deleted(id) => write!(f, "Deleted resource #{id}"),
            ResourceLine::Ignored => write!(f, "No resource name given"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn run(store: Arc<MemoryStore>, command: CliCommand) -> Result<String> {
        let mut output = Vec::new();
        execute(store, command, &mut output)?;
        Ok(String::from_utf8(output).expect("utf8"))
    }

    #[test]
    fn board_command_groups_and_filters() {
        let store = Arc::new(MemoryStore::demo());
        let output = run(
            store,
            CliCommand::Board(BoardArgs {
                filter: Some("paint".into()),
            }),
        )
        .expect("board");

        assert!(output.contains("== Home =="));
        assert!(output.contains("Garden shed"));
        assert!(output.contains("Paint shed [Awaiting resource]"));
        assert!(!output.contains("Kitchen refit"));
    }

    #[test]
    fn jobs_command_lists_pending_work() {
        let store = Arc::new(MemoryStore::demo());
        let output = run(store, CliCommand::Jobs).expect("jobs");

        assert!(output.contains("== Carpenter =="));
        assert!(output.contains("Strip old units (Kitchen refit) Started "));
        assert!(output.contains("Fit new units (Kitchen refit) Not Started"));
    }

    #[test]
    fn resource_commands_add_list_and_delete() {
        let store = Arc::new(MemoryStore::new());
        let added = run(
            store.clone(),
            CliCommand::Resources(ResourceCommand::Add {
                name: vec!["Tower".into(), "crane".into()],
            }),
        )
        .expect("add");
        assert!(added.starts_with("Added resource #1 Tower crane"));

        let listed = run(store.clone(), CliCommand::Resources(ResourceCommand::List)).expect("list");
        assert!(listed.contains("#1 Tower crane"));

        run(store.clone(), CliCommand::Resources(ResourceCommand::Delete { id: 1 })).expect("delete");
        let listed = run(store, CliCommand::Resources(ResourceCommand::List)).expect("list");
        assert!(listed.contains("No resources."));
    }

    #[test]
    fn duplicate_resource_surfaces_conflict() {
        let store = Arc::new(MemoryStore::new());
        store.insert_resource("Crane");
        let err = run(
            store,
            CliCommand::Resources(ResourceCommand::Add {
                name: vec!["Crane".into()],
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Resource already exists"));
    }

    #[test]
    fn unreachable_store_reports_load_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail_when(|_| true);
        let err = run(store, CliCommand::Board(BoardArgs::default())).unwrap_err();
        assert!(err.to_string().starts_with("Could not load projects."));
    }
}

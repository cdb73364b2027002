use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const STATUS_SEARCH: &str = "Type to filter projects and tasks • Enter keeps • Esc clears";
pub(crate) const STATUS_JUMP: &str = "Task id to open • Enter opens • Esc cancels";
pub(crate) const STATUS_REFRESHED: &str = "Reloaded projects";
pub(crate) const STATUS_PROJECT_EDITOR: &str =
    "Tab moves between fields • Ctrl+S save • Ctrl+N add task • Ctrl+D delete • Esc cancel";
pub(crate) const STATUS_TASK_EDITOR: &str =
    "Tab moves • ←/→ choose • Ctrl+R add resource • Ctrl+T start • Ctrl+F finish • Ctrl+S save • Esc cancel";
pub(crate) const STATUS_PICKER: &str = "Choose a resource • Enter adds • Esc cancels";
pub(crate) const STATUS_HELP: &str = "Keyboard reference • Enter/Esc to close";
pub(crate) const STATUS_CONFIRM_DELETE: &str =
    "Confirm deletion • arrows choose, Enter confirms, Esc cancels";

pub(crate) const HELP_BOARD: &str =
    "nav: ←/→ bucket | ↑/↓ move | enter open | n new project | / search | : open task # | 1 projects | 2 jobs | 3 resources | r reload | t theme | ? help | q quit";
pub(crate) const HELP_JOBS: &str = "↑/↓ move • Enter open task • Esc done";
pub(crate) const HELP_RESOURCES: &str =
    "Type a name, Enter adds • ↑/↓ move • Delete removes • Esc back to projects";
pub(crate) const HELP_PICKER: &str = "↑/↓ move • Enter add • Esc cancel";

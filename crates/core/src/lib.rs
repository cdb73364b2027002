pub mod board;
pub mod buffer;
pub mod config;
pub mod dialog;
pub mod error;
pub mod jobs;
pub mod model;
pub mod preferences;
pub mod store;
pub mod workbench;

pub use board::{build_board, Board, BucketColumn, ProjectCard, TaskLine};
pub use buffer::{BufferMode, TaskResourceBuffer};
pub use config::AppConfig;
pub use dialog::{DialogStack, Outcome, ProjectEditor, Refresh, ResourcePicker, TaskEditor};
pub use error::{LoadError, StoreError, StoreResult, ValidationError, WorkbenchError};
pub use jobs::{JobGroup, JobsBoard, NO_JOBS};
pub use model::*;
pub use preferences::Preferences;
pub use store::{HttpStore, MemoryStore, Store, StoreCall};
pub use workbench::{Panel, Snapshot, Workbench, WorkbenchResult};

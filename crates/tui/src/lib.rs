pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod runtime;
pub mod tui;

pub use planboard_core as core;
pub use planboard_core::model;
pub use planboard_core::store;

pub use planboard_core::AppConfig;

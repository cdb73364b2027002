pub use planboard_tui::cli;
pub use planboard_tui::commands;
pub use planboard_tui::config;
pub use planboard_tui::logging;
pub use planboard_tui::runtime;
pub use planboard_tui::tui;
pub use planboard_tui::AppConfig;

pub use planboard_core as core;
pub use planboard_core::model;
pub use planboard_core::store;

use anyhow::Result;
use clap::Parser;

use planboard::cli::{Cli, CliCommand};
use planboard::logging::{init_tracing, LogTarget};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = planboard::config::from_cli(&cli)?;

    let interactive = matches!(cli.command, Some(CliCommand::Tui) | None);
    let target = if interactive {
        LogTarget::File(config.log_path())
    } else {
        LogTarget::Stderr
    };
    init_tracing(cli.log_filter.as_deref(), target)?;

    let store = planboard::runtime::open_store(&config, cli.demo)?;

    match cli.command.clone() {
        Some(CliCommand::Tui) | None => planboard::tui::run(config, store)?,
        Some(command) => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            planboard::commands::execute(store, command, &mut handle)?;
        }
    }

    Ok(())
}

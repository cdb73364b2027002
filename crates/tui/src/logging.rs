use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Where log lines go. The interactive board owns the terminal, so it logs to a file.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Installs the global subscriber. Returns `false` when one was already installed, in which
/// case the existing subscriber keeps receiving events.
pub fn init_tracing(filter: Option<&str>, target: LogTarget) -> Result<bool> {
    let filter = filter.unwrap_or("info");
    let directive: Directive = filter
        .parse()
        .with_context(|| format!("invalid log directive `{filter}`"))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    if let Err(err) = installed {
        tracing::debug!(%err, "tracing subscriber already installed");
        return Ok(false);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_malformed_directive() {
        assert!(init_tracing(Some("planboard=loudest"), LogTarget::Stderr).is_err());
    }

    #[test]
    fn second_install_keeps_the_existing_subscriber() {
        let dir = TempDir::new().expect("temp dir");
        let log = dir.path().join("planboard.log");
        assert!(init_tracing(Some("debug"), LogTarget::File(log.clone())).is_ok());
        assert!(!init_tracing(None, LogTarget::Stderr).unwrap());
        assert!(log.exists());
    }
}

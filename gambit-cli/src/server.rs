//! `gambit serve` - run the HTTP API and board client

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use gambit_server::{run_server, ServerConfig};

#[derive(Args)]
pub struct ServerArgs {
    /// Listening port
    #[arg(long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Browser client files served at `/`
    #[arg(long, default_value = "public")]
    pub static_dir: PathBuf,

    /// Pause before each AI reply, in milliseconds
    #[arg(long, default_value = "500")]
    pub ai_delay_ms: u64,
}

/// Build the server config and block until shutdown
pub fn run(args: ServerArgs) -> Result<()> {
    let config = build_config(&args)?;
    tracing::info!(
        port = config.port,
        ai_delay_ms = config.ai_move_delay_ms,
        "Launching game server"
    );

    tokio::runtime::Runtime::new()
        .context("Failed to start tokio runtime")?
        .block_on(run_server(config))
}

fn build_config(args: &ServerArgs) -> Result<ServerConfig> {
    check_static_dir(&args.static_dir)?;

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.display().to_string(),
        ai_move_delay_ms: args.ai_delay_ms,
    })
}

/// A missing client directory only disables static serving; a file is an error
fn check_static_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    tracing::warn!("{} not found, serving the API only", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_copies_flags() {
        let args = ServerArgs {
            port: 4100,
            static_dir: PathBuf::from("client"),
            ai_delay_ms: 0,
        };

        let config = build_config(&args).unwrap();
        assert_eq!(config.port, 4100);
        assert_eq!(config.static_dir, "client");
        assert_eq!(config.ai_move_delay_ms, 0);
    }

    #[test]
    fn test_missing_static_dir_is_allowed() {
        assert!(check_static_dir(Path::new("/nonexistent/gambit-client")).is_ok());
    }

    #[test]
    fn test_static_dir_must_be_directory() {
        let file = std::env::temp_dir().join("gambit_static_dir_test.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(check_static_dir(&file).is_err());
        std::fs::remove_file(&file).ok();
    }
}

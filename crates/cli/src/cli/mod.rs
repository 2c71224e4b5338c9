pub mod config;
pub mod sessions;

use clap::{Parser, Subcommand};

/// ssa — operator tool for the single-session authority.
#[derive(Debug, Parser)]
#[command(name = "ssa", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Inspect or revoke active sessions in the configured store.
    #[command(subcommand)]
    Sessions(SessionsCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List every active session (tokens are never printed).
    List {
        /// Output JSON instead of one line per session.
        #[arg(long)]
        json: bool,
    },
    /// Show the active session for one user.
    Show {
        user_id: String,
    },
    /// End the active session for one user.
    Revoke {
        user_id: String,
    },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `SSA_CONFIG` (or `config.toml`
/// by default).  A missing file means all defaults.
pub fn load_config() -> anyhow::Result<(ssa_domain::config::Config, String)> {
    let config_path = std::env::var("SSA_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(std::path::Path::new(&config_path))?;
    Ok((config, config_path))
}

pub fn load_config_from(path: &std::path::Path) -> anyhow::Result<ssa_domain::config::Config> {
    if !path.exists() {
        return Ok(ssa_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}

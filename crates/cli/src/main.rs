mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ssa_domain::config::ObservabilityConfig;

use cli::{Cli, Command, ConfigCommand, SessionsCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = cli::load_config()?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _) = cli::load_config()?;
            cli::config::show(&config)
        }
        Command::Sessions(cmd) => {
            let (config, _) = cli::load_config()?;
            init_tracing(&config.observability);
            let authority = cli::sessions::open_authority(&config)?;
            let mut out = std::io::stdout().lock();
            match cmd {
                SessionsCommand::List { json } => {
                    cli::sessions::list(&authority, json, &mut out).await
                }
                SessionsCommand::Show { user_id } => {
                    cli::sessions::show(&authority, &user_id, &mut out).await
                }
                SessionsCommand::Revoke { user_id } => {
                    cli::sessions::revoke(&authority, &user_id, &mut out).await
                }
            }
        }
        Command::Version => {
            println!("ssa {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize stderr tracing so diagnostics never mix with command output.
///
/// `RUST_LOG` takes precedence over the configured filter.
fn init_tracing(obs: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&obs.log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if obs.json {
        builder.json().init();
    } else {
        builder.compact().with_target(false).init();
    }
}

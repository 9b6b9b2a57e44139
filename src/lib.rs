pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, LoginCommands, SessionCommands, TagCommands};
pub use config::Config;
use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("Config file already exists.");
        }
        return Ok(());
    }

    let state = SharedState::new(config).await?;

    match command {
        Commands::Init => Ok(()),

        Commands::Sessions {
            command: SessionCommands::Purge,
        } => cli::cmd_sessions_purge(&state).await,

        Commands::Logins { command } => match command {
            LoginCommands::ByIp { ip_address } => cli::cmd_logins_by_ip(&state, &ip_address).await,
            LoginCommands::Prune { days } => cli::cmd_logins_prune(&state, days).await,
        },

        Commands::Tags { command } => match command {
            TagCommands::List => cli::cmd_tags_list(&state).await,
            TagCommands::Lookup { identifier } => cli::cmd_tags_lookup(&state, &identifier).await,
        },
    }
}

use super::args::{Cli, Commands};
use super::handlers;
use super::logging;
use anyhow::Result;
use sdui_runtime::{Config, resolve_config_path};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Resolve { tree } => handlers::resolve::handle(&tree, &config, cli.format),

        Commands::Replay { tree, updates } => {
            handlers::replay::handle(&tree, &updates, &config, cli.format)
        }

        Commands::Config => handlers::config::handle(&config_path, &config, cli.format),
    }
}

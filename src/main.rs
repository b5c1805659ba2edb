use clap::Parser;

use link_saver::cli::{Cli, Commands};
use link_saver::config::{get_config, init_config_from};
use link_saver::runtime::modes;
use link_saver::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref().unwrap_or("config.toml"));

    // keep the guard alive so the non-blocking writer flushes on exit
    let _log_guard = init_logging(&get_config().logging)?;

    match cli.command {
        None | Some(Commands::Serve) => modes::run_server().await,
        Some(command) => modes::run_cli(command).await,
    }
}

use anyhow::Result;
use clap::Parser;
use jobmatch::app_log;
use jobmatch::cli::{handle_command, Cli};
use jobmatch::core::ConfigManager;
use jobmatch::logging::init_logging;
use jobmatch::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::load()?;
    if let Some(path) = &cli.storage {
        config.storage.path = path.clone();
    }

    // Initialize logging first
    init_logging(&config.logging.path, &config.logging.directive)?;
    app_log!(info, "Environment: {}", config.environment);
    app_log!(info, "Storage: {}", config.storage.path.display());

    let mut app = App::new(config);
    handle_command(cli, &mut app).await
}

// Entrypoint for the CLI application.
// - Keeps `main` small: load config, build the collaborators and hand them
//   to the session loop.
// - Startup failures bubble up through `anyhow` and exit non-zero; leaving
//   the menu (exit command or Ctrl+C) always exits with status 0.

use anyhow::Context;
use crossterm::style::Stylize;
use paket_cli::api::ApiClient;
use paket_cli::cancel::{install_ctrl_c, CancelToken};
use paket_cli::config::Config;
use paket_cli::dispatcher::{Dispatcher, Exit, Services};
use paket_cli::handlers::TerminalHandlers;
use paket_cli::logging;
use paket_cli::prompt::TerminalPrompter;
use paket_cli::session::FileSessionStore;

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env()?;
    tracing::debug!(
        base_url = %config.api_base_url,
        data_dir = %config.data_dir.display(),
        "starting"
    );

    let cancel = CancelToken::new();
    install_ctrl_c(cancel.clone()).context("Failed to install Ctrl+C handler")?;

    let api = ApiClient::new(&config)?;
    let mut store = FileSessionStore::open(&config.data_dir)?;
    let mut handlers = TerminalHandlers::new(
        api.clone(),
        cancel.clone(),
        config.data_dir.join(FileSessionStore::FILE_NAME),
    );
    let mut prompt = TerminalPrompter::new(cancel.clone());

    let services = Services {
        store: &mut store,
        profiles: &api,
        purchases: &api,
        handlers: &mut handlers,
    };
    let exit = Dispatcher::new(services, &mut prompt, cancel).run();

    if exit == Exit::Interrupted {
        println!("\n{}", "Application closed".red());
    }
    Ok(())
}

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use eyre::{Context, Result};
use gemchat::app::services::{ActionService, EventService};
use gemchat::backend::new_backend;
use gemchat::config::verbose;
use gemchat::config::{Configuration, init_logger, load_api_key, resolve_path, sweep_logs};
use gemchat::models::{Action, ArcEventTx, GenerationParams};
use gemchat::storage::ImportMode;
use gemchat::{
    app::{App, ChatController, destruct_terminal_for_panic},
    cli::Command,
};
use tokio::{sync::mpsc, task};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Command::new();
    if cmd.version() {
        cmd.print_version();
        return Ok(());
    }

    std::panic::set_hook(Box::new(|panic_info| {
        destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    Configuration::init(cmd.get_config()?)?;
    let config = Configuration::instance();

    let log_dir = resolve_path(&config.log.dir)?;
    let swept = sweep_logs(
        Path::new(&log_dir),
        config.log.retention_hours,
        Local::now().naive_local(),
    );
    let log_path = init_logger(&config.log)?;
    verbose!("[+] Logging to {}", log_path.display());
    match swept {
        Ok(0) => {}
        Ok(count) => log::info!("Removed {} expired log files", count),
        Err(err) => log::warn!("Failed to sweep old logs: {}", err),
    }

    let credential_path = resolve_path(&config.credential.path)?;
    let api_key = match load_api_key(&credential_path) {
        Ok(key) => key,
        Err(err) => {
            log::error!("Failed to load API key: {}", err);
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    verbose!("[+] API key loaded from {}", credential_path);

    let backend = new_backend(&config.gemini, &api_key);

    if cmd.list_models() {
        verbose!("[+] Fetching models...");
        let models = backend.list_models().await.wrap_err("listing models")?;
        for model in models {
            println!("{}", model);
        }
        return Ok(());
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut events = EventService::default();
    let token = CancellationToken::new();

    let history_dir = resolve_path(&config.storage.history_dir)?;
    let mut controller = ChatController::new(action_tx)
        .with_params(GenerationParams::new(config.gemini.default_model()))
        .with_history_dir(history_dir)
        .with_credential_path(&credential_path);

    if let Some(path) = cmd.import() {
        let path = resolve_path(path)?;
        controller
            .import_file(Path::new(&path), ImportMode::Append)
            .wrap_err(format!("importing {}", path))?;
        verbose!("[+] Imported {}", path);
    }
    controller.ensure_conversation();

    let mut task_set = task::JoinSet::new();
    let event_tx: ArcEventTx = Arc::new(events.event_tx());
    let service_backend = backend.clone();
    let service_token = token.clone();
    task_set.spawn(async move {
        ActionService::new(event_tx, &mut action_rx, service_backend, service_token)
            .start()
            .await
    });

    let mut app = App::new(controller, &mut events, token.clone());
    let result = app.run().await;

    token.cancel();
    while let Some(res) = task_set.join_next().await {
        match res {
            Ok(Err(err)) => log::error!("Action service error: {}", err),
            Err(err) => log::error!("Task error: {}", err),
            Ok(Ok(_)) => {}
        }
    }

    result
}

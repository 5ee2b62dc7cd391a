//! Subcommand execution.

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ripley_client::{
    ClientConfig, LocalBackend, MediaResourceLoader, OperationController, OperationOutcome, Session,
    WorkspaceContext,
};
use ripley_media::MediaConfig;
use ripley_models::{LoadOutcome, LoadResult, OperationKind, OperationState, WorkspaceConfig};
use ripley_progress::ProgressChannel;
use ripley_storage::{describe_asset, SettingsStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, SettingsAction};

/// Everything a subcommand may need, wired once.
struct App {
    session: Session,
    loader: MediaResourceLoader,
    settings_path: String,
    _channel: ProgressChannel,
}

impl App {
    async fn build() -> Result<Self> {
        let config = ClientConfig::from_env();
        let media = MediaConfig::from_env();
        let store = SettingsStore::from_env().context("Failed to locate settings directory")?;
        let settings_path = store.path().display().to_string();

        let channel = ProgressChannel::new(config.progress_capacity);
        let backend = Arc::new(
            LocalBackend::new(media, store, channel.publisher())
                .with_inline_ceiling(config.inline_ceiling_bytes),
        );

        let controller = OperationController::new(backend.clone(), &channel, &config);
        let workspace = WorkspaceContext::load_or_default(backend.clone()).await;
        info!(workspace = %workspace.config().directory(), "Client ready");

        Ok(Self {
            session: Session::new(controller, workspace, &config),
            loader: MediaResourceLoader::new(backend),
            settings_path,
            _channel: channel,
        })
    }

    async fn select(&mut self, input: &str) -> Result<()> {
        let asset = describe_asset(input)
            .await
            .with_context(|| format!("Cannot read {}", input))?;
        if !asset.is_selectable() {
            warn!("{} is not a recognised video file", asset.display_name);
        }
        self.session.select_asset(asset);
        Ok(())
    }

    /// Run `kind` on the selected asset, showing progress and cancelling on Ctrl-C.
    async fn execute(&mut self, kind: OperationKind, label: &'static str) -> Result<OperationOutcome> {
        let controller = self.session.controller().clone();
        if !controller.is_listening() {
            warn!("Progress stream is not attached; no progress will be shown");
        }
        let states = controller.subscribe();
        let handle = self.session.submit(kind)?;

        let printer = spawn_progress_printer(states, label);
        let interrupt = spawn_interrupt_handler(controller);

        let outcome = self.session.finish(handle).await;
        interrupt.abort();
        printer.abort();
        eprintln!();

        Ok(outcome)
    }

    /// Print the outcome and, when asked, how the result would be displayed.
    async fn report(&self, outcome: OperationOutcome, load: bool) -> Result<()> {
        match outcome {
            OperationOutcome::Completed { result_path } => {
                println!("{}", result_path);
                if load {
                    print_load(&self.loader.load(&result_path).await)?;
                }
                Ok(())
            }
            OperationOutcome::Failed { message } => Err(anyhow!(message)),
            OperationOutcome::Cancelled | OperationOutcome::Superseded => {
                Err(anyhow!("Operation cancelled"))
            }
        }
    }
}

fn spawn_progress_printer(mut states: watch::Receiver<OperationState>, label: &'static str) -> JoinHandle<()> {
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if !state.is_running() {
                break;
            }
            eprint!("\r{}: {:5.1}%", label, state.progress_percent);
            let _ = std::io::stderr().flush();
        }
    })
}

fn spawn_interrupt_handler(controller: OperationController) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, cancelling");
            controller.cancel();
        }
    })
}

fn print_load(result: &LoadResult) -> Result<()> {
    match &result.outcome {
        LoadOutcome::Renderable { uri, source } => {
            let shown: String = uri.chars().take(80).collect();
            println!("Renderable ({:?}): {}", source, shown);
        }
        LoadOutcome::Unplayable { reason } => {
            println!("Not renderable ({}): {}", reason.as_str(), reason.remediation());
        }
    }
    info!("{}", serde_json::to_string(result)?);
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut app = App::build().await?;

    match cli.command {
        Commands::Convert(args) => {
            app.select(&args.input).await?;
            app.session.set_format(&args.format)?;
            let kind = app.session.convert_operation()?;
            let outcome = app.execute(kind, "Converting").await?;
            app.report(outcome, args.load).await
        }
        Commands::Preview(args) => {
            app.select(&args.input).await?;
            app.session.set_preview_kind(args.kind);
            if let Some(timestamp) = args.timestamp {
                app.session.set_preview_timestamp(timestamp);
            }
            let kind = app.session.preview_operation();
            let outcome = app.execute(kind, "Generating preview").await?;
            app.report(outcome, args.load).await
        }
        Commands::Denoise(args) => {
            app.select(&args.input).await?;
            let outcome = app.execute(OperationKind::Denoise, "Denoising").await?;
            app.report(outcome, args.load).await
        }
        Commands::Open { path } => {
            app.loader.open_externally(&path).await?;
            Ok(())
        }
        Commands::Info { path } => {
            let asset = describe_asset(&path).await?;
            println!("{} ({:.2} MB)", asset.display_name, asset.size_mb());
            print_load(&app.loader.load(&path).await)
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                println!("Settings file: {}", app.settings_path);
                println!("{}", serde_json::to_string_pretty(app.session.workspace())?);
                Ok(())
            }
            SettingsAction::Set { directory } => {
                let saved = app
                    .session
                    .workspace_context_mut()
                    .save(WorkspaceConfig::new(directory))
                    .await?;
                println!("Workspace: {}", saved.directory());
                Ok(())
            }
        },
    }
}

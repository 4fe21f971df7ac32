mod cli;
mod config;
mod core;
mod error;
mod tui;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::core::{MindMapRequest, Pipeline, StorageService};
use crate::error::{Error, Result};
use crate::tui::{App, EventHandler, init as tui_init, restore as tui_restore, ui};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Some(Commands::Generate {
            topic,
            url,
            api_key,
            print,
        }) => {
            init_logging();
            run_cli_generate(&cli.settings, MindMapRequest::new(api_key, topic, url), print).await
        }
        Some(Commands::List { json }) => {
            init_logging();
            run_cli_list(&cli.settings, json)
        }
        Some(Commands::Tui) | None => run_tui(cli.settings).await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidmap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_cli_generate(settings: &Settings, request: MindMapRequest, print: bool) -> Result<()> {
    // Fail on blank inputs before building any network client.
    request.validate()?;

    let pipeline = Pipeline::from_settings(settings)?;
    let storage = StorageService::new(&settings.output_dir);

    let generated = pipeline
        .run(&request, |event| println!("{}", event.message()))
        .await?;

    if print {
        println!();
        println!("{}", generated.markdown);
        println!();
    }

    println!("Outline: {}", generated.outline.summary());
    let path = storage.save_artifact(&generated.artifact).await?;
    println!(
        "Mind map saved to: {} ({})",
        path.display(),
        generated.artifact.mime
    );

    Ok(())
}

fn run_cli_list(settings: &Settings, json: bool) -> Result<()> {
    let storage = StorageService::new(&settings.output_dir);
    let files = storage.list_files()?;

    if json {
        let listing = serde_json::to_string_pretty(&files).map_err(Error::custom)?;
        println!("{listing}");
        return Ok(());
    }

    if files.is_empty() {
        println!("No mind maps found in {}.", storage.root().display());
        return Ok(());
    }

    println!("Found {} mind maps:", files.len());
    println!();

    for file in files {
        let modified = chrono::DateTime::<chrono::Local>::from(file.modified)
            .format("%Y-%m-%d %H:%M");
        println!("{:<40} {:>8}  {}", file.name, file.size_label(), modified);
    }

    Ok(())
}

async fn run_tui(settings: Settings) -> Result<()> {
    // Initialize terminal
    let mut terminal = tui_init()?;

    let outcome = drive_tui(&mut terminal, settings).await;

    // Restore terminal even when the loop failed
    tui_restore()?;
    outcome
}

async fn drive_tui(terminal: &mut tui::Tui, settings: Settings) -> Result<()> {
    let mut app = App::new(settings)?;
    let event_handler = EventHandler::new();

    // Setup async communication channel for background runs
    let (tx, rx) = mpsc::unbounded_channel();
    app.processing_tx = Some(tx);
    app.processing_rx = Some(rx);

    // Main event loop
    loop {
        let event = event_handler.next_event()?;
        app.handle_event(event)?;

        terminal.draw(|f| {
            ui::draw(f, &mut app);
        })?;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

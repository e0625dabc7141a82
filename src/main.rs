use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

mod controller;
mod dataset;
mod domain;
mod model;
mod ui;

use clap::Parser;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use controller::Controller;
use dataset::Dataset;
use domain::{Config, CrankError};
use model::{Model, Status};
use ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about = "A tui based college ranking browser.")]
struct Cli {
    /// JSON dataset ({ "colleges": [ ... ] }); the bundled sample is used when omitted
    data: Option<String>,

    /// Append tracing output to this file, filtered by RUST_LOG
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Simulated latency for loading another page, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

// The terminal belongs to ratatui, tracing output goes to a file
fn init_logging(path: &Path) -> Result<(), CrankError> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run() -> Result<(), CrankError> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }
    info!("Starting crank!");

    let config = Config::default().load_delay(Duration::from_millis(cli.delay_ms));

    let (name, dataset) = match &cli.data {
        Some(path) => {
            let name = Path::new(path)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("???")
                .to_string();
            match dataset::load_dataset(path) {
                Ok(dataset) => (name, dataset),
                Err(e) => {
                    // A broken dataset is absorbed, the table just stays empty
                    warn!("Ignoring dataset {}: {:?}", path, e);
                    (name, Dataset::default())
                }
            }
        }
        None => ("sample colleges".to_string(), dataset::sample()),
    };

    let mut terminal = ratatui::init();
    let size = terminal.size()?;

    let mut model = Model::init(&config, size.width as usize, size.height as usize);
    model.set_dataset(&name, dataset);
    let ui = TableUI::new(&config);
    let controller = Controller::new(&config);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|frame| ui.draw(model.get_uidata(), frame))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    Ok(())
}

//! ==============================================================================
//! main.rs - switch-panel command line entry point
//! ==============================================================================
//!
//! purpose:
//!     drives the panel pages from a terminal. every command opens a page
//!     against the device, optionally clicks through one action, and prints
//!     the resulting page on stdout. notifications and logs go to stderr as
//!     they happen.
//!
//! commands:
//!     buttons | toggle | pins | add | edit | delete | status | history
//!     simulate (runs the in-memory device api instead)
//!
//! ==============================================================================

use switch_panel::config::PanelConfig;
use switch_panel::dom::Action;
use switch_panel::domain::ButtonId;
use switch_panel::notify::{
    Answer, Dialog, Notification, Notifier, Recorder, TerminalDialog, TerminalNotifier,
};
use switch_panel::views::{home, settings};
use switch_panel::{simulator, HttpTransport, Page, Panel, RequestClient, Services};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Control panel for a GPIO switch device
#[derive(Parser, Debug)]
#[command(name = "switch-panel", version)]
struct Args {
    /// Config file (default: config/panel.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device base URL, overrides the config file
    #[arg(short, long)]
    device: Option<String>,

    /// Print page markup instead of text
    #[arg(long)]
    html: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List buttons and their state
    Buttons,
    /// Flip one button
    Toggle { id: String },
    /// Show configured buttons and the free GPIO pins
    Pins,
    /// Configure a new button
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        pin: String,
    },
    /// Rename a button or move it to another pin
    Edit {
        id: String,
        #[arg(long)]
        pin: String,
        /// New name; asked interactively when missing
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a button
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Device status
    Status,
    /// Event history, newest first
    History,
    /// Serve an in-memory device API
    Simulate {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // step 1: load configuration
    let mut config = PanelConfig::load_or_default(args.config.as_deref());
    if let Some(url) = &args.device {
        config.device.base_url = url.clone();
    }

    // step 2: logging to stderr, RUST_LOG wins over the config level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Command::Simulate { bind } = &args.command {
        if let Some(bind) = bind {
            config.simulator.bind = *bind;
        }
        return simulator::run(&config.simulator).await;
    }

    // step 3: wire the panel
    let transport = HttpTransport::new(&config.device.base_url, config.device.timeout())
        .context("failed to build http client")?;
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);
    let dialog: Arc<dyn Dialog> = match &args.command {
        Command::Delete { yes: true, .. } => Arc::new(Recorder::with_answers([Answer::Confirm(true)])),
        Command::Edit { name: Some(name), .. } => {
            Arc::new(Recorder::with_answers([Answer::Prompt(Some(name.clone()))]))
        }
        _ => Arc::new(TerminalDialog::new()),
    };
    let services = Services {
        client: RequestClient::new(Arc::new(transport), notifier.clone()),
        notifier: notifier.clone(),
        dialog,
    };
    let mut panel = Panel::new(services);
    tracing::debug!(device = %config.device.base_url, "panel ready");

    // step 4: run the command
    match &args.command {
        Command::Buttons => panel.open(Page::Home).await,
        Command::Toggle { id } => {
            panel.open(Page::Home).await;
            if !panel.click(&home::toggle_id(&ButtonId::from(id.as_str()))).await {
                notifier.notify(missing(id));
            }
        }
        Command::Pins => panel.open(Page::Settings).await,
        Command::Add { name, pin } => {
            panel.open(Page::Settings).await;
            let doc = panel.document_mut();
            doc.set_value(settings::NAME_INPUT, name);
            doc.set_value(settings::PIN_SELECT, pin);
            panel.click(settings::SUBMIT).await;
        }
        Command::Edit { id, pin, .. } => {
            panel.open(Page::Settings).await;
            let id = ButtonId::from(id.as_str());
            if !panel.click(&settings::edit_id(&id)).await {
                notifier.notify(missing(&id.to_string()));
            } else {
                let save = settings::save_id(&id);
                // the listener only exists when the prompt was answered
                if matches!(panel.document().listener(&save), Some(Action::SaveEdit(_))) {
                    panel.document_mut().set_value(&settings::edit_pin_id(&id), pin);
                    panel.click(&save).await;
                }
            }
        }
        Command::Delete { id, .. } => {
            panel.open(Page::Settings).await;
            if !panel.click(&settings::delete_id(&ButtonId::from(id.as_str()))).await {
                notifier.notify(missing(id));
            }
        }
        Command::Status => panel.open(Page::Status).await,
        Command::History => panel.open(Page::History).await,
        // served above
        Command::Simulate { .. } => {}
    }

    let doc = panel.document();
    if args.html {
        println!("{}", doc.to_html());
    } else {
        println!("{}", doc.to_text());
    }
    Ok(())
}

fn missing(id: &str) -> Notification {
    Notification::error(format!("No button with id {}", id))
}

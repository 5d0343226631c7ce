//! Stock sheets command line client.
//!
//! Loads the sheet list (or settings page) from the server, runs one action
//! against it and prints the resulting list.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use stock_sheets::{
    logging, Banners, ClientConfig, DisplayZone, Error, HttpSheetsApi, RowAction, RowEvent,
    RowView, SettingsController, SheetListController, TerminalPage,
};

/// Manage the Google Sheets tracked by the stock tracker
#[derive(Parser, Debug)]
#[command(name = "stock-sheets", version)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tracked sheets
    List,
    /// Create a new tracked sheet
    Create,
    /// Open a sheet in the browser
    Visit { ssheet_id: String },
    /// Sync a sheet's stocks and prices
    Sync { ssheet_id: String },
    /// Stop tracking a sheet
    Delete { ssheet_id: String },
    /// Show or change email notifications
    Settings {
        /// Enable or disable price alert emails
        #[arg(long)]
        notify: Option<bool>,
        /// Leave without saving
        #[arg(long, conflicts_with = "notify")]
        cancel: bool,
    },
}

type Sheets = SheetListController<HttpSheetsApi, TerminalPage>;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Failures already shown through the page are not repeated.
            if !e.is_reported() {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> stock_sheets::Result<()> {
    let config = ClientConfig::load(args.config.as_deref())?;
    let endpoints = config.endpoints()?;
    let api = HttpSheetsApi::new(&config)?;
    let zone = if args.utc {
        DisplayZone::utc()
    } else {
        DisplayZone::Local
    };

    if let Command::Settings { notify, cancel } = args.command {
        let controller = SettingsController::new(Arc::new(api), TerminalPage::new(), endpoints);
        return run_settings(&controller, notify, cancel).await;
    }

    let sheets = SheetListController::new(api, TerminalPage::new(), endpoints).with_display_zone(zone);
    let result = run_sheets(&sheets, args.command).await;

    if sheets.page().take_reload() {
        eprintln!("Session expired, reloading sheet list...");
        match sheets.refresh().await {
            Ok(_) => print_sheets(&sheets.rows(), sheets.banners()),
            Err(Error::Access(_)) => eprintln!(
                "Still not signed in. Log in through the browser and update the session cookie."
            ),
            Err(e) => return Err(e),
        }
    }
    result
}

async fn run_sheets(sheets: &Sheets, command: Command) -> stock_sheets::Result<()> {
    sheets.refresh().await?;

    match command {
        Command::List | Command::Settings { .. } => {}
        Command::Create => {
            let row = sheets.create().await?;
            println!("Created {} ({})", row.title, row.ssheet_id);
        }
        Command::Visit { ssheet_id } => {
            sheets.dispatch(RowEvent::new(ssheet_id, RowAction::Visit)).await?;
            return Ok(());
        }
        Command::Sync { ssheet_id } => {
            sheets.dispatch(RowEvent::new(ssheet_id, RowAction::Sync)).await?;
        }
        Command::Delete { ssheet_id } => {
            sheets.dispatch(RowEvent::new(ssheet_id, RowAction::Delete)).await?;
        }
    }

    print_sheets(&sheets.rows(), sheets.banners());
    Ok(())
}

async fn run_settings(
    controller: &SettingsController<HttpSheetsApi, TerminalPage>,
    notify: Option<bool>,
    cancel: bool,
) -> stock_sheets::Result<()> {
    let current = match controller.refresh().await {
        Ok(current) => current,
        Err(e) => {
            if controller.page().take_reload() {
                eprintln!("Session expired. Log in through the browser and update the session cookie.");
            }
            return Err(e);
        }
    };

    if cancel {
        controller.cancel();
        return Ok(());
    }

    match notify {
        None => println!("Email notifications: {}", on_off(current)),
        Some(notify) => {
            controller.set_notify(notify);
            let pending = controller.submit();
            println!("Email notifications: {}", on_off(notify));
            // Let the request go out before the process exits.
            if let Err(e) = pending.await {
                tracing::warn!("settings request did not complete: {}", e);
            }
        }
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn print_sheets(rows: &[RowView], banners: Banners) {
    if banners.add_visible {
        println!("No sheets yet. Run `stock-sheets create` to add one.");
    }
    if banners.edit_visible {
        println!("Add stock symbols with lower and upper bounds to your sheet, then sync it.");
    }

    if rows.is_empty() {
        return;
    }

    let title_width = rows
        .iter()
        .map(|r| r.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("TITLE".len());

    println!("{:<title_width$}  {:<16}  ID", "TITLE", "LAST SYNCED");
    for row in rows {
        println!(
            "{:<title_width$}  {:<16}  {}",
            row.title, row.timestamp, row.ssheet_id
        );
    }
}

//! Stock sheets client library.
//!
//! Drives the two pages of the stock tracker: the sheet list (create, open,
//! sync and delete tracked Google Sheets) and the notification settings.
//! Controllers keep the page state, talk to the server through
//! [`SheetsApi`] and show results through [`Page`].

pub mod access;
pub mod api;
pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod markup;
pub mod models;
pub mod page;
pub mod table;
pub mod timefmt;

// Re-export commonly used types
pub use access::AccessError;

pub use api::{HttpSheetsApi, LocalSheetsApi, SheetsApi};

pub use config::{ClientConfig, EndpointPaths, Endpoints, SHEETS_URL_PREFIX};

pub use controllers::{RowOutcome, SettingsController, SheetListController};

pub use error::{ApiError, Error, Result};

pub use models::{
    Banners, CreateResponse, RowAction, RowEvent, RowState, RowView, SettingsUpdate, SheetRef,
    SheetRow, SyncResponse,
};

pub use page::{Page, PageEvent, RecordingPage, TerminalPage};

pub use table::SheetTable;

pub use timefmt::{format_wire, parse_wire, DisplayZone, DT_FORMAT};

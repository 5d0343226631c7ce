//! Sheet list page controller.
//!
//! Owns the list of tracked sheets and the two notices above it. Each row
//! action issues at most one request; the row is marked busy until the
//! response arrives, so a second action on the same row is refused while
//! other rows stay usable.

use std::sync::{Mutex, MutexGuard};
use url::Url;

use crate::access::AccessError;
use crate::api::SheetsApi;
use crate::config::Endpoints;
use crate::error::{ApiError, Error, Result};
use crate::markup;
use crate::models::{Banners, RowAction, RowEvent, RowState, RowView, SheetRow};
use crate::page::Page;
use crate::table::SheetTable;
use crate::timefmt::{parse_wire, DisplayZone};

/// What a dispatched row action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Opened(Url),
    Synced(RowView),
    Deleted(String),
}

pub struct SheetListController<A, P> {
    api: A,
    page: P,
    endpoints: Endpoints,
    zone: DisplayZone,
    table: Mutex<SheetTable>,
}

impl<A: SheetsApi, P: Page> SheetListController<A, P> {
    pub fn new(api: A, page: P, endpoints: Endpoints) -> Self {
        Self {
            api,
            page,
            endpoints,
            zone: DisplayZone::default(),
            table: Mutex::new(SheetTable::default()),
        }
    }

    pub fn with_display_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    fn table(&self) -> MutexGuard<'_, SheetTable> {
        lock(&self.table)
    }

    // ========================================================================
    // Page state
    // ========================================================================

    pub fn banners(&self) -> Banners {
        self.table().banners()
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.table().views(&self.zone)
    }

    pub fn row(&self, ssheet_id: &str) -> Option<RowView> {
        self.table().view(ssheet_id, &self.zone)
    }

    pub fn row_count(&self) -> usize {
        self.table().len()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Replace the list with rows rendered by the server.
    pub fn load(&self, rows: Vec<SheetRow>) -> Result<()> {
        let table = SheetTable::load(rows)?;
        tracing::debug!(rows = table.len(), "sheet list loaded");
        *self.table() = table;
        Ok(())
    }

    pub fn load_from_page(&self, html: &str) -> Result<usize> {
        let rows = markup::parse_rows(html)?;
        let count = rows.len();
        self.load(rows)?;
        Ok(count)
    }

    /// Fetch the sheet list page and load its rows.
    pub async fn refresh(&self) -> Result<usize> {
        let html = match self.api.index_page().await {
            Ok(html) => html,
            Err(e) => return Err(self.report(&e)),
        };
        self.load_from_page(&html).inspect_err(|e| {
            tracing::warn!("sheet list page unreadable: {}", e);
            AccessError::Other(None).inform(&self.page);
        })
    }

    // ========================================================================
    // Row actions
    // ========================================================================

    /// Single entry point for row actions.
    pub async fn dispatch(&self, event: RowEvent) -> Result<RowOutcome> {
        tracing::debug!(ssheet_id = %event.ssheet_id, action = ?event.action, "row action");
        match event.action {
            RowAction::Visit => self.visit(&event.ssheet_id).map(RowOutcome::Opened),
            RowAction::Sync => self.sync(&event.ssheet_id).await.map(RowOutcome::Synced),
            RowAction::Delete => {
                self.delete(&event.ssheet_id).await?;
                Ok(RowOutcome::Deleted(event.ssheet_id))
            }
        }
    }

    /// Create a new tracked sheet and append its row.
    pub async fn create(&self) -> Result<RowView> {
        let pending = Pending::create(&self.table)?;
        let result = self.api.create_sheet().await;
        drop(pending);

        let response = match result {
            Ok(r) => r,
            Err(e) => return Err(self.report(&e)),
        };

        let row = match markup::parse_row(&response.row_to_insert) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("create returned unreadable row: {}", e);
                AccessError::Other(None).inform(&self.page);
                return Err(e);
            }
        };

        let ssheet_id = row.ssheet_id.clone();
        let view = {
            let mut table = self.table();
            table.insert(row)?;
            tracing::info!(%ssheet_id, rows = table.len(), "sheet created");
            table.view(&ssheet_id, &self.zone)
        };
        view.ok_or_else(|| Error::row_not_found(ssheet_id))
    }

    /// Open the spreadsheet in a new window. No request to the app server.
    pub fn visit(&self, ssheet_id: &str) -> Result<Url> {
        if self.table().get(ssheet_id).is_none() {
            return Err(Error::row_not_found(ssheet_id));
        }
        let url = self.endpoints.sheet_url(ssheet_id)?;
        self.page.open_window(&url);
        Ok(url)
    }

    /// Pull the sheet's data through the server and refresh its row.
    pub async fn sync(&self, ssheet_id: &str) -> Result<RowView> {
        let _pending = Pending::row(&self.table, ssheet_id, RowState::Syncing)?;

        let response = match self.api.sync_sheet(ssheet_id).await {
            Ok(r) => r,
            Err(e) => return Err(self.report(&e)),
        };
        if let Some(message) = response.message.as_deref() {
            tracing::debug!(%ssheet_id, "sync: {}", message);
        }

        let synced_at = match parse_wire(&response.datetime) {
            Ok(ts) => ts,
            Err(e) => {
                AccessError::Other(None).inform(&self.page);
                return Err(e);
            }
        };
        let title = response.title.filter(|t| !t.is_empty());

        let view = {
            let mut table = self.table();
            table.apply_sync(ssheet_id, synced_at, title)?;
            tracing::info!(%ssheet_id, "sheet synced");
            table.view(ssheet_id, &self.zone)
        };
        view.ok_or_else(|| Error::row_not_found(ssheet_id))
    }

    /// Stop tracking the sheet and remove its row.
    pub async fn delete(&self, ssheet_id: &str) -> Result<()> {
        let _pending = Pending::row(&self.table, ssheet_id, RowState::Deleting)?;

        if let Err(e) = self.api.delete_sheet(ssheet_id).await {
            return Err(self.report(&e));
        }

        let mut table = self.table();
        table.remove(ssheet_id)?;
        tracing::info!(%ssheet_id, rows = table.len(), "sheet deleted");
        Ok(())
    }

    fn report(&self, e: &ApiError) -> Error {
        let access = AccessError::from(e);
        tracing::debug!("sheet request failed: {}", e);
        access.inform(&self.page);
        Error::Access(access)
    }
}

fn lock(table: &Mutex<SheetTable>) -> MutexGuard<'_, SheetTable> {
    table.lock().unwrap_or_else(|p| p.into_inner())
}

// ============================================================================
// In-flight marks
// ============================================================================

enum PendingTarget {
    Row(String),
    Create,
}

/// An in-flight mark on the table, cleared on drop. A request future that is
/// dropped before completing still releases its row.
struct Pending<'a> {
    table: &'a Mutex<SheetTable>,
    target: PendingTarget,
}

impl<'a> Pending<'a> {
    fn row(table: &'a Mutex<SheetTable>, ssheet_id: &str, state: RowState) -> Result<Self> {
        lock(table).begin(ssheet_id, state)?;
        Ok(Self {
            table,
            target: PendingTarget::Row(ssheet_id.to_string()),
        })
    }

    fn create(table: &'a Mutex<SheetTable>) -> Result<Self> {
        lock(table).begin_create()?;
        Ok(Self {
            table,
            target: PendingTarget::Create,
        })
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        let mut table = lock(self.table);
        match &self.target {
            PendingTarget::Row(ssheet_id) => table.finish(ssheet_id),
            PendingTarget::Create => table.finish_create(),
        }
    }
}

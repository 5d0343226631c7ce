//! Data models for the stock-sheets client.
//!
//! Rows and banners mirror what the sheet list page shows; the wire types
//! are the JSON bodies exchanged with the application server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Sheet Rows
// ============================================================================

/// One tracked spreadsheet in the sheet list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub ssheet_id: String,
    pub title: String,
    pub last_synced: DateTime<Utc>,
    pub state: RowState,
}

impl SheetRow {
    pub fn new(
        ssheet_id: impl Into<String>,
        title: impl Into<String>,
        last_synced: DateTime<Utc>,
    ) -> Self {
        Self {
            ssheet_id: ssheet_id.into(),
            title: title.into(),
            last_synced,
            state: RowState::Idle,
        }
    }
}

/// Lifecycle of a listed row: `Idle` between requests, otherwise the request
/// currently in flight for it. Deletion removes the row entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowState {
    #[default]
    Idle,
    Syncing,
    Deleting,
}

/// A row as displayed, with its timestamp already in the viewer's zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub ssheet_id: String,
    pub title: String,
    pub timestamp: String,
    pub state: RowState,
}

// ============================================================================
// Banners
// ============================================================================

/// Visibility of the "add a sheet" and "edit then sync" notices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Banners {
    pub add_visible: bool,
    pub edit_visible: bool,
}

impl Banners {
    /// Banners for a freshly loaded list.
    pub fn for_row_count(rows: usize) -> Self {
        Self {
            add_visible: rows == 0,
            edit_visible: rows == 1,
        }
    }

    pub fn after_create(&mut self, rows: usize) {
        self.add_visible = false;
        self.edit_visible = rows == 1;
    }

    /// Delete recomputes from the remaining row count, the same as a load.
    pub fn after_delete(&mut self, rows: usize) {
        *self = Banners::for_row_count(rows);
    }

    pub fn after_sync(&mut self) {
        self.edit_visible = false;
    }
}

// ============================================================================
// Row Actions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Visit,
    Sync,
    Delete,
}

/// An action triggered on a specific row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEvent {
    pub ssheet_id: String,
    pub action: RowAction,
}

impl RowEvent {
    pub fn new(ssheet_id: impl Into<String>, action: RowAction) -> Self {
        Self {
            ssheet_id: ssheet_id.into(),
            action,
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub notify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRef {
    pub ssheet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateResponse {
    pub row_to_insert: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncResponse {
    pub datetime: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ssheet_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

//! Page controllers.
//!
//! - `sheet_list` - tracked sheets: create, open, sync, delete
//! - `settings` - email notification preference

mod settings;
mod sheet_list;

pub use settings::SettingsController;
pub use sheet_list::{RowOutcome, SheetListController};

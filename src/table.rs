//! The sheet list: ordered rows keyed by spreadsheet id, plus banners.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{Banners, RowState, RowView, SheetRow};
use crate::timefmt::DisplayZone;

#[derive(Debug, Default)]
pub struct SheetTable {
    rows: Vec<SheetRow>,
    banners: Banners,
    creating: bool,
}

impl SheetTable {
    /// A table freshly loaded with `rows`. Ids must be unique.
    pub fn load(rows: Vec<SheetRow>) -> Result<Self> {
        let mut table = SheetTable::default();
        for row in rows {
            table.push_unique(row)?;
        }
        table.banners = Banners::for_row_count(table.len());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn banners(&self) -> Banners {
        self.banners
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn get(&self, ssheet_id: &str) -> Option<&SheetRow> {
        self.rows.iter().find(|r| r.ssheet_id == ssheet_id)
    }

    fn get_mut(&mut self, ssheet_id: &str) -> Option<&mut SheetRow> {
        self.rows.iter_mut().find(|r| r.ssheet_id == ssheet_id)
    }

    pub fn views(&self, zone: &DisplayZone) -> Vec<RowView> {
        self.rows.iter().map(|r| view_of(r, zone)).collect()
    }

    pub fn view(&self, ssheet_id: &str, zone: &DisplayZone) -> Option<RowView> {
        self.get(ssheet_id).map(|r| view_of(r, zone))
    }

    fn push_unique(&mut self, row: SheetRow) -> Result<()> {
        if self.get(&row.ssheet_id).is_some() {
            return Err(Error::DuplicateRow {
                ssheet_id: row.ssheet_id,
            });
        }
        self.rows.push(row);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // In-flight requests
    // ------------------------------------------------------------------------

    /// Mark a row as having `state` in flight. Fails if another request for
    /// the same row has not completed yet.
    pub fn begin(&mut self, ssheet_id: &str, state: RowState) -> Result<()> {
        let row = self
            .get_mut(ssheet_id)
            .ok_or_else(|| Error::row_not_found(ssheet_id))?;
        if row.state != RowState::Idle {
            return Err(Error::RowBusy {
                ssheet_id: ssheet_id.to_string(),
            });
        }
        row.state = state;
        Ok(())
    }

    /// Return a row to idle after its request completed.
    pub fn finish(&mut self, ssheet_id: &str) {
        if let Some(row) = self.get_mut(ssheet_id) {
            row.state = RowState::Idle;
        }
    }

    pub fn begin_create(&mut self) -> Result<()> {
        if self.creating {
            return Err(Error::CreateInFlight);
        }
        self.creating = true;
        Ok(())
    }

    pub fn finish_create(&mut self) {
        self.creating = false;
    }

    // ------------------------------------------------------------------------
    // Structural changes
    // ------------------------------------------------------------------------

    /// Append a newly created row at the end of the list.
    pub fn insert(&mut self, row: SheetRow) -> Result<()> {
        self.push_unique(row)?;
        self.banners.after_create(self.rows.len());
        Ok(())
    }

    /// Record a successful sync. Only the target row changes.
    pub fn apply_sync(
        &mut self,
        ssheet_id: &str,
        synced_at: DateTime<Utc>,
        title: Option<String>,
    ) -> Result<()> {
        let row = self
            .get_mut(ssheet_id)
            .ok_or_else(|| Error::row_not_found(ssheet_id))?;
        row.last_synced = synced_at;
        if let Some(title) = title {
            row.title = title;
        }
        row.state = RowState::Idle;
        self.banners.after_sync();
        Ok(())
    }

    /// Remove exactly the row with `ssheet_id`.
    pub fn remove(&mut self, ssheet_id: &str) -> Result<SheetRow> {
        let pos = self
            .rows
            .iter()
            .position(|r| r.ssheet_id == ssheet_id)
            .ok_or_else(|| Error::row_not_found(ssheet_id))?;
        let row = self.rows.remove(pos);
        self.banners.after_delete(self.rows.len());
        Ok(row)
    }
}

fn view_of(row: &SheetRow, zone: &DisplayZone) -> RowView {
    RowView {
        ssheet_id: row.ssheet_id.clone(),
        title: row.title.clone(),
        timestamp: zone.format(&row.last_synced),
        state: row.state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timefmt::parse_wire;

    fn row(id: &str) -> SheetRow {
        SheetRow::new(id, format!("Sheet {}", id), parse_wire("01-01-2024 00:00").unwrap())
    }

    fn table_of(ids: &[&str]) -> SheetTable {
        SheetTable::load(ids.iter().map(|id| row(id)).collect()).unwrap()
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let err = SheetTable::load(vec![row("a"), row("a")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateRow { .. }));
    }

    #[test]
    fn test_insert_appends_at_end() {
        let mut table = table_of(&["a", "b"]);
        table.insert(row("c")).unwrap();
        let ids: Vec<_> = table.rows().iter().map(|r| r.ssheet_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_only_target_row() {
        let mut table = table_of(&["a", "b", "c"]);
        let removed = table.remove("b").unwrap();
        assert_eq!(removed.ssheet_id, "b");
        let ids: Vec<_> = table.rows().iter().map(|r| r.ssheet_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(table.remove("b").is_err());
    }

    #[test]
    fn test_apply_sync_leaves_other_rows() {
        let mut table = table_of(&["a", "b"]);
        let before_b = table.get("b").cloned().unwrap();
        let ts = parse_wire("05-06-2024 07:08").unwrap();
        table.apply_sync("a", ts, Some("Renamed".into())).unwrap();

        let a = table.get("a").unwrap();
        assert_eq!(a.last_synced, ts);
        assert_eq!(a.title, "Renamed");
        assert_eq!(table.get("b"), Some(&before_b));
    }

    #[test]
    fn test_apply_sync_without_title_keeps_title() {
        let mut table = table_of(&["a"]);
        let ts = parse_wire("05-06-2024 07:08").unwrap();
        table.apply_sync("a", ts, None).unwrap();
        assert_eq!(table.get("a").unwrap().title, "Sheet a");
    }

    #[test]
    fn test_begin_rejects_second_request_on_same_row() {
        let mut table = table_of(&["a", "b"]);
        table.begin("a", RowState::Syncing).unwrap();
        assert!(matches!(
            table.begin("a", RowState::Deleting),
            Err(Error::RowBusy { .. })
        ));
        // Other rows are independent.
        table.begin("b", RowState::Deleting).unwrap();
        table.finish("a");
        table.begin("a", RowState::Deleting).unwrap();
    }

    #[test]
    fn test_begin_unknown_row() {
        let mut table = table_of(&[]);
        assert!(matches!(
            table.begin("zzz", RowState::Syncing),
            Err(Error::RowNotFound { .. })
        ));
    }

    #[test]
    fn test_create_guard() {
        let mut table = table_of(&[]);
        table.begin_create().unwrap();
        assert!(matches!(table.begin_create(), Err(Error::CreateInFlight)));
        table.finish_create();
        table.begin_create().unwrap();
    }

    #[test]
    fn test_banners_follow_structure() {
        let mut table = table_of(&[]);
        assert!(table.banners().add_visible);
        table.insert(row("a")).unwrap();
        assert_eq!(
            table.banners(),
            Banners { add_visible: false, edit_visible: true }
        );
        table.insert(row("b")).unwrap();
        assert_eq!(table.banners(), Banners::default());
        table.remove("a").unwrap();
        assert_eq!(
            table.banners(),
            Banners { add_visible: false, edit_visible: true }
        );
        table.remove("b").unwrap();
        assert!(table.banners().add_visible);
        assert!(table.is_empty());
    }
}

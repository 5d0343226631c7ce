//! Reading and writing the server-rendered HTML the client works with.
//!
//! Sheet rows are `<tr>` elements carrying an `ssheet-id` attribute, a
//! `sheet-title` cell and a `sheet-datetime` cell holding the UTC wire
//! timestamp. The settings page carries a `notify` checkbox.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::models::SheetRow;
use crate::timefmt::{format_wire, parse_wire};

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr\s*>").expect("row pattern"))
}

fn ssheet_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\bssheet-id\s*=\s*"([^"]*)""#).expect("id pattern"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<(\w+)\b[^>]*\bclass\s*=\s*"[^"]*\bsheet-title\b[^"]*"[^>]*>(.*?)</(\w+)\s*>"#)
            .expect("title pattern")
    })
}

fn datetime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<(\w+)\b[^>]*\bclass\s*=\s*"[^"]*\bsheet-datetime\b[^"]*"[^>]*>(.*?)</(\w+)\s*>"#)
            .expect("datetime pattern")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern"))
}

fn notify_input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<input\b[^>]*\bid\s*=\s*"notify"[^>]*>"#).expect("notify pattern")
    })
}

fn checked_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\schecked\b").expect("checked pattern"))
}

// ============================================================================
// Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Text content of an HTML fragment.
fn cell_text(fragment: &str) -> String {
    html_unescape(tag_re().replace_all(fragment, "").trim())
}

// ============================================================================
// Sheet Rows
// ============================================================================

/// Parse a single row, such as the `row_to_insert` markup returned on create.
pub fn parse_row(markup: &str) -> Result<SheetRow> {
    let caps = row_re()
        .captures_iter(markup)
        .find(|c| ssheet_id_re().is_match(&c[1]))
        .ok_or_else(|| Error::markup("no row with an ssheet-id attribute"))?;
    row_from_parts(&caps[1], &caps[2])
}

/// Parse every sheet row in a page, in document order. Rows without an
/// `ssheet-id` (headers, placeholders) are skipped.
pub fn parse_rows(page: &str) -> Result<Vec<SheetRow>> {
    row_re()
        .captures_iter(page)
        .filter(|c| ssheet_id_re().is_match(&c[1]))
        .map(|c| row_from_parts(&c[1], &c[2]))
        .collect()
}

fn row_from_parts(attrs: &str, body: &str) -> Result<SheetRow> {
    let ssheet_id = ssheet_id_re()
        .captures(attrs)
        .map(|c| html_unescape(&c[1]))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::markup("empty ssheet-id"))?;

    let title = title_re()
        .captures(body)
        .map(|c| cell_text(&c[2]))
        .unwrap_or_default();

    let datetime = datetime_re()
        .captures(body)
        .map(|c| cell_text(&c[2]))
        .ok_or_else(|| Error::markup(format!("row {} has no sheet-datetime cell", ssheet_id)))?;

    Ok(SheetRow::new(ssheet_id, title, parse_wire(&datetime)?))
}

/// Render a row the way the server does.
pub fn render_row(row: &SheetRow) -> String {
    format!(
        r#"<tr class="sheet-row" ssheet-id="{id}">
    <td class="sheet-title">{title}</td>
    <td class="sheet-datetime">{datetime}</td>
    <td class="sheet-actions">
        <button data-action="visit">Open</button>
        <button data-action="sync">Sync</button>
        <button data-action="delete">Delete</button>
    </td>
</tr>"#,
        id = html_escape(&row.ssheet_id),
        title = html_escape(&row.title),
        datetime = format_wire(&row.last_synced),
    )
}

// ============================================================================
// Settings
// ============================================================================

/// State of the `notify` checkbox on the settings page.
pub fn parse_notify_checkbox(page: &str) -> Result<bool> {
    let input = notify_input_re()
        .find(page)
        .ok_or_else(|| Error::markup("settings page has no notify checkbox"))?;
    Ok(checked_re().is_match(input.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timefmt::parse_wire;

    const INDEX_PAGE: &str = r##"
<table id="sheets">
  <tr><th>Title</th><th>Last synced</th><th></th></tr>
  <tr class="sheet-row" ssheet-id="abc123">
    <td class="sheet-title">Tech &amp; Energy</td>
    <td class="sheet-datetime">01-02-2024 10:00</td>
  </tr>
  <tr class="sheet-row" ssheet-id="def456">
    <td class="sheet-title"><a href="#">Dividends</a></td>
    <td class="sheet-datetime"> 12-31-2023 23:59 </td>
  </tr>
</table>"##;

    #[test]
    fn test_parse_rows_skips_header() {
        let rows = parse_rows(INDEX_PAGE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ssheet_id, "abc123");
        assert_eq!(rows[0].title, "Tech & Energy");
        assert_eq!(rows[0].last_synced, parse_wire("01-02-2024 10:00").unwrap());
        assert_eq!(rows[1].ssheet_id, "def456");
        assert_eq!(rows[1].title, "Dividends");
    }

    #[test]
    fn test_parse_rows_empty_table() {
        let rows = parse_rows("<table><tr><th>Title</th></tr></table>").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_render_then_parse_row() {
        let row = SheetRow::new("x<1>", "My \"Stock\" Tracker", parse_wire("03-04-2024 05:06").unwrap());
        let parsed = parse_row(&render_row(&row)).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_parse_row_requires_datetime() {
        let markup = r#"<tr ssheet-id="abc"><td class="sheet-title">T</td></tr>"#;
        assert!(matches!(parse_row(markup), Err(Error::Markup { .. })));
    }

    #[test]
    fn test_parse_row_rejects_missing_id() {
        let markup = r#"<tr><td class="sheet-datetime">01-02-2024 10:00</td></tr>"#;
        assert!(parse_row(markup).is_err());
    }

    #[test]
    fn test_notify_checkbox() {
        let on = r#"<form><input type="checkbox" id="notify" name="notify" checked></form>"#;
        let off = r#"<form><input type="checkbox" id="notify" name="notify"></form>"#;
        assert!(parse_notify_checkbox(on).unwrap());
        assert!(!parse_notify_checkbox(off).unwrap());
        assert!(parse_notify_checkbox("<form></form>").is_err());
    }
}

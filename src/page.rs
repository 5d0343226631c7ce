//! Page-level side effects.
//!
//! Everything the controllers do to the world besides HTTP goes through
//! [`Page`]: blocking alerts, reloads, navigation and opening sheets in a new
//! window. The terminal implementation backs the CLI; [`RecordingPage`]
//! captures effects for inspection.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use url::Url;

pub trait Page: Send + Sync {
    /// Show a blocking message to the user.
    fn alert(&self, message: &str);

    /// Reload the current page from the server.
    fn reload(&self);

    /// Leave the current page for `url`.
    fn navigate(&self, url: &Url);

    /// Open `url` in a new window or tab.
    fn open_window(&self, url: &Url);
}

// ============================================================================
// Terminal Page
// ============================================================================

/// Page effects for the command line client.
///
/// Reloads are deferred: the caller checks [`TerminalPage::take_reload`] once
/// the current command finishes and fetches the page again.
#[derive(Default)]
pub struct TerminalPage {
    reload_requested: AtomicBool,
    last_navigation: Mutex<Option<Url>>,
}

impl TerminalPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_reload(&self) -> bool {
        self.reload_requested.swap(false, Ordering::SeqCst)
    }

    pub fn last_navigation(&self) -> Option<Url> {
        self.last_navigation
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl Page for TerminalPage {
    fn alert(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "error: {}", message);
    }

    fn reload(&self) {
        self.reload_requested.store(true, Ordering::SeqCst);
    }

    fn navigate(&self, url: &Url) {
        tracing::debug!(%url, "navigating");
        *self
            .last_navigation
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = Some(url.clone());
    }

    fn open_window(&self, url: &Url) {
        tracing::info!(%url, "opening sheet");
        if let Err(e) = open::that(url.as_str()) {
            tracing::warn!("failed to open browser: {}", e);
            println!("{}", url);
        }
    }
}

// ============================================================================
// Recording Page
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Alert(String),
    Reload,
    Navigate(Url),
    OpenWindow(Url),
}

/// A page that remembers every effect in order.
#[derive(Debug, Default)]
pub struct RecordingPage {
    events: Mutex<Vec<PageEvent>>,
}

impl RecordingPage {
    pub fn events(&self) -> Vec<PageEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PageEvent::Alert(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PageEvent) {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(event);
    }
}

impl Page for RecordingPage {
    fn alert(&self, message: &str) {
        self.push(PageEvent::Alert(message.to_string()));
    }

    fn reload(&self) {
        self.push(PageEvent::Reload);
    }

    fn navigate(&self, url: &Url) {
        self.push(PageEvent::Navigate(url.clone()));
    }

    fn open_window(&self, url: &Url) {
        self.push(PageEvent::OpenWindow(url.clone()));
    }
}

impl<T: Page + ?Sized> Page for std::sync::Arc<T> {
    fn alert(&self, message: &str) {
        (**self).alert(message)
    }

    fn reload(&self) {
        (**self).reload()
    }

    fn navigate(&self, url: &Url) {
        (**self).navigate(url)
    }

    fn open_window(&self, url: &Url) {
        (**self).open_window(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_page_reload_is_taken_once() {
        let page = TerminalPage::new();
        assert!(!page.take_reload());
        page.reload();
        assert!(page.take_reload());
        assert!(!page.take_reload());
    }

    #[test]
    fn test_terminal_page_remembers_navigation() {
        let page = TerminalPage::new();
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        page.navigate(&url);
        assert_eq!(page.last_navigation(), Some(url));
    }
}

//! Settings page controller: the email notification checkbox.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::access::AccessError;
use crate::api::SheetsApi;
use crate::config::Endpoints;
use crate::error::Result;
use crate::markup;
use crate::models::SettingsUpdate;
use crate::page::Page;

pub struct SettingsController<A, P> {
    api: Arc<A>,
    page: P,
    endpoints: Endpoints,
    notify: AtomicBool,
}

impl<A, P> SettingsController<A, P>
where
    A: SheetsApi + Sync + 'static,
    P: Page,
{
    pub fn new(api: Arc<A>, page: P, endpoints: Endpoints) -> Self {
        Self {
            api,
            page,
            endpoints,
            notify: AtomicBool::new(false),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Current state of the checkbox.
    pub fn notify(&self) -> bool {
        self.notify.load(Ordering::SeqCst)
    }

    pub fn set_notify(&self, notify: bool) {
        self.notify.store(notify, Ordering::SeqCst);
    }

    /// Fetch the settings page and take the checkbox state from it.
    pub async fn refresh(&self) -> Result<bool> {
        let html = match self.api.settings_page().await {
            Ok(html) => html,
            Err(e) => {
                let access = AccessError::from(&e);
                access.inform(&self.page);
                return Err(access.into());
            }
        };
        let notify = markup::parse_notify_checkbox(&html).inspect_err(|e| {
            tracing::warn!("settings page unreadable: {}", e);
            AccessError::Other(None).inform(&self.page);
        })?;
        self.set_notify(notify);
        Ok(notify)
    }

    /// Post the checkbox state and go back to the sheet list.
    ///
    /// Navigation does not wait for the request. The returned handle only lets
    /// the caller keep the process alive until the request has been sent; its
    /// outcome is logged and otherwise dropped.
    pub fn submit(&self) -> JoinHandle<()> {
        let update = SettingsUpdate {
            notify: self.notify(),
        };
        let api = Arc::clone(&self.api);
        let handle = tokio::spawn(async move {
            match api.update_settings(update).await {
                Ok(()) => tracing::info!(notify = update.notify, "settings saved"),
                Err(e) => tracing::warn!("settings update failed: {}", e),
            }
        });
        self.page.navigate(&self.endpoints.index);
        handle
    }

    /// Go back to the sheet list without saving.
    pub fn cancel(&self) {
        self.page.navigate(&self.endpoints.index);
    }
}

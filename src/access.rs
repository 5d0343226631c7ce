//! Mapping of failed sheet requests to what the user sees.
//!
//! A 401 means the session expired: the page is reloaded so the server can
//! send the user back through login. Every other failure becomes a blocking
//! alert and leaves the sheet list untouched.

use thiserror::Error;

use crate::error::ApiError;
use crate::page::Page;

pub const MSG_FORBIDDEN: &str = "You are not authorized to modify this sheet.";
pub const MSG_NOT_FOUND: &str = "Sheet not found. It may have been deleted from Google Sheets.";
pub const MSG_BAD_FORMAT: &str = "Could not read the sheet. Please make sure stock symbols and bounds are not formatted and there are no blank lines.";
pub const MSG_GENERIC: &str = "Could not perform operation. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("session expired")]
    SessionExpired,
    #[error("{}", MSG_FORBIDDEN)]
    Forbidden,
    #[error("{}", MSG_NOT_FOUND)]
    NotFound,
    #[error("{}", MSG_BAD_FORMAT)]
    BadFormat,
    /// Any other status, or no status at all when the request never completed.
    #[error("{}", MSG_GENERIC)]
    Other(Option<u16>),
}

impl AccessError {
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => AccessError::SessionExpired,
            403 => AccessError::Forbidden,
            404 => AccessError::NotFound,
            400 => AccessError::BadFormat,
            other => AccessError::Other(Some(other)),
        }
    }

    /// Alert text, or `None` when the failure is handled by reloading.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            AccessError::SessionExpired => None,
            AccessError::Forbidden => Some(MSG_FORBIDDEN),
            AccessError::NotFound => Some(MSG_NOT_FOUND),
            AccessError::BadFormat => Some(MSG_BAD_FORMAT),
            AccessError::Other(_) => Some(MSG_GENERIC),
        }
    }

    /// Surface this failure on the page.
    pub fn inform<P: Page + ?Sized>(&self, page: &P) {
        match self.message() {
            None => {
                tracing::info!("session expired, reloading page");
                page.reload();
            }
            Some(message) => {
                tracing::warn!(error = ?self, "sheet request failed");
                page.alert(message);
            }
        }
    }
}

impl From<&ApiError> for AccessError {
    fn from(e: &ApiError) -> Self {
        match e {
            ApiError::Status(code) => AccessError::from_status(*code),
            ApiError::LoginRedirect(_) => AccessError::SessionExpired,
            ApiError::Transport(_) | ApiError::Decode(_) => AccessError::Other(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageEvent, RecordingPage};

    #[test]
    fn test_status_mapping() {
        assert_eq!(AccessError::from_status(401), AccessError::SessionExpired);
        assert_eq!(AccessError::from_status(403), AccessError::Forbidden);
        assert_eq!(AccessError::from_status(404), AccessError::NotFound);
        assert_eq!(AccessError::from_status(400), AccessError::BadFormat);
        assert_eq!(AccessError::from_status(999), AccessError::Other(Some(999)));
        assert_eq!(AccessError::from_status(500), AccessError::Other(Some(500)));
    }

    #[test]
    fn test_messages_for_fixed_codes() {
        let cases = [
            (400, MSG_BAD_FORMAT),
            (403, MSG_FORBIDDEN),
            (404, MSG_NOT_FOUND),
            (999, MSG_GENERIC),
        ];
        for (code, expected) in cases {
            let page = RecordingPage::default();
            AccessError::from_status(code).inform(&page);
            assert_eq!(page.events(), vec![PageEvent::Alert(expected.to_string())]);
        }
    }

    #[test]
    fn test_unauthorized_reloads_without_alert() {
        let page = RecordingPage::default();
        AccessError::from_status(401).inform(&page);
        assert_eq!(page.events(), vec![PageEvent::Reload]);
        assert!(page.alerts().is_empty());
    }

    #[test]
    fn test_transport_failure_is_generic() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(AccessError::from(&err), AccessError::Other(None));
        let err = ApiError::Status(403);
        assert_eq!(AccessError::from(&err), AccessError::Forbidden);
    }

    #[test]
    fn test_login_redirect_reloads() {
        let err = ApiError::LoginRedirect("/oauth2callback".into());
        let access = AccessError::from(&err);
        assert_eq!(access, AccessError::SessionExpired);

        let page = RecordingPage::default();
        access.inform(&page);
        assert_eq!(page.events(), vec![PageEvent::Reload]);
    }
}

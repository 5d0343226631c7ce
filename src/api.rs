//! HTTP access to the application server.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::{redirect, Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, Endpoints};
use crate::error::{ApiError, Error, Result};
use crate::models::{CreateResponse, SettingsUpdate, SheetRef, SyncResponse};

/// The server operations the controllers rely on.
#[trait_variant::make(SheetsApi: Send)]
pub trait LocalSheetsApi {
    /// Server-rendered sheet list page.
    async fn index_page(&self) -> std::result::Result<String, ApiError>;

    /// Server-rendered settings page.
    async fn settings_page(&self) -> std::result::Result<String, ApiError>;

    async fn update_settings(&self, update: SettingsUpdate) -> std::result::Result<(), ApiError>;

    async fn create_sheet(&self) -> std::result::Result<CreateResponse, ApiError>;

    async fn sync_sheet(&self, ssheet_id: &str) -> std::result::Result<SyncResponse, ApiError>;

    /// The response body is not used.
    async fn delete_sheet(&self, ssheet_id: &str) -> std::result::Result<(), ApiError>;
}

// ============================================================================
// reqwest Implementation
// ============================================================================

pub struct HttpSheetsApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpSheetsApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.cookie_header() {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|_| Error::config("session cookie contains invalid characters"))?;
            headers.insert(COOKIE, value);
        }

        // Redirects are only ever the login bounce; following them would turn
        // an expired session into a 200 login page.
        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoints: config.endpoints()?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_page(&self, url: &Url) -> std::result::Result<String, ApiError> {
        tracing::debug!(%url, "GET page");
        let response = self.client.get(url.clone()).send().await?;
        Ok(check_status(response)?.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> std::result::Result<T, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        decode(check_status(response)?).await
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
    ) -> std::result::Result<Response, ApiError> {
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        check_status(response)
    }
}

fn check_status(response: Response) -> std::result::Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        tracing::debug!(url = %response.url(), %status, %location, "redirected to login");
        Err(ApiError::LoginRedirect(location))
    } else {
        tracing::debug!(url = %response.url(), %status, "request rejected");
        Err(ApiError::Status(status.as_u16()))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

impl SheetsApi for HttpSheetsApi {
    async fn index_page(&self) -> std::result::Result<String, ApiError> {
        self.get_page(&self.endpoints.index).await
    }

    async fn settings_page(&self) -> std::result::Result<String, ApiError> {
        self.get_page(&self.endpoints.settings).await
    }

    async fn update_settings(&self, update: SettingsUpdate) -> std::result::Result<(), ApiError> {
        self.post_json(&self.endpoints.settings, &update).await?;
        Ok(())
    }

    async fn create_sheet(&self) -> std::result::Result<CreateResponse, ApiError> {
        self.get_json(&self.endpoints.create).await
    }

    async fn sync_sheet(&self, ssheet_id: &str) -> std::result::Result<SyncResponse, ApiError> {
        let body = SheetRef {
            ssheet_id: ssheet_id.to_string(),
        };
        let response = self.post_json(&self.endpoints.sync, &body).await?;
        decode(response).await
    }

    async fn delete_sheet(&self, ssheet_id: &str) -> std::result::Result<(), ApiError> {
        let body = SheetRef {
            ssheet_id: ssheet_id.to_string(),
        };
        self.post_json(&self.endpoints.delete, &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_session_cookie() {
        let config = ClientConfig {
            session_cookie: Some("abc".into()),
            ..Default::default()
        };
        let api = HttpSheetsApi::new(&config).unwrap();
        assert_eq!(api.endpoints().create.path(), "/create");
    }

    #[test]
    fn test_new_rejects_bad_cookie() {
        let config = ClientConfig {
            session_cookie: Some("line\nbreak".into()),
            ..Default::default()
        };
        assert!(matches!(HttpSheetsApi::new(&config), Err(Error::Config { .. })));
    }
}

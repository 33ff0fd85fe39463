use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

use crate::models::session::{ SessionData, SessionSummary };
use crate::store::{ validate_session_id, SessionStore, StoreError };

/// Remote backend for authenticated sessions: the CompareIntel API.
pub struct ApiSessionStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiSessionStore {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        ApiSessionStore {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {}", key));
        }
        req
    }
}

#[async_trait]
impl SessionStore for ApiSessionStore {
    async fn fetch_session(&self, session_id: &str) -> Result<SessionData, StoreError> {
        validate_session_id(session_id)?;
        let response = self.request(&format!("/api/sessions/{}", session_id)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(session_id.to_string())),
            status if status.is_success() => Ok(response.json::<SessionData>().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Api { status: status.as_u16(), body })
            }
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let response = self.request("/api/sessions").send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status: status.as_u16(), body });
        }
        Ok(response.json::<Vec<SessionSummary>>().await?)
    }
}

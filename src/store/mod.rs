mod api;
mod local;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use crate::models::session::{ SessionData, SessionSummary };

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session '{0}' not found")]
    NotFound(String),
    #[error("invalid session id '{0}'")]
    InvalidSessionId(String),
    #[error("session store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote store returned {status}: {body}")]
    Api {
        status: u16,
        body: String,
    },
    #[error("session store IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported store type: {0}")]
    UnsupportedStoreType(String),
}

/// A persistence backend for saved comparison sessions. Backends return
/// already-normalized `SessionData`; adapting each storage shape into the
/// common message model is the backend's job, not the reconstructor's.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn fetch_session(&self, session_id: &str) -> Result<SessionData, StoreError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError>;
}

pub fn create_session_store(args: &Args) -> Result<Arc<dyn SessionStore>, StoreError> {
    match args.store_type.to_lowercase().as_str() {
        "api" => {
            let store = api::ApiSessionStore::new(
                args.api_base_url.clone(),
                args.api_key.clone()
            );
            Ok(Arc::new(store))
        }
        "local" => {
            let store = local::LocalSessionStore::new(args.data_dir.clone());
            Ok(Arc::new(store))
        }
        other => Err(StoreError::UnsupportedStoreType(other.to_string())),
    }
}

pub fn initialize_session_store(args: &Args) -> Result<Arc<dyn SessionStore>, StoreError> {
    info!("Session store: {} ({})", args.store_type, match args.store_type.as_str() {
        "api" => args.api_base_url.as_str(),
        _ => args.data_dir.as_str(),
    });
    create_session_store(args)
}

pub(crate) fn validate_session_id(session_id: &str) -> Result<(), StoreError> {
    let ok = !session_id.is_empty()
        && session_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidSessionId(session_id.to_string()))
    }
}

pub use api::ApiSessionStore;
pub use local::LocalSessionStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_restricted_to_safe_characters() {
        assert!(validate_session_id("abc-123_X").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../etc/passwd").is_err());
        assert!(validate_session_id("a/b").is_err());
    }
}

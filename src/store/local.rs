use async_trait::async_trait;
use log::warn;
use std::path::{ Path, PathBuf };
use tokio::fs;

use crate::models::session::{ SessionData, SessionSummary };
use crate::store::{ validate_session_id, SessionStore, StoreError };

/// On-device backend for anonymous sessions: one JSON file per session id
/// under the data directory.
pub struct LocalSessionStore {
    data_dir: PathBuf,
}

impl LocalSessionStore {
    pub fn new(data_dir: String) -> Self {
        LocalSessionStore { data_dir: PathBuf::from(data_dir) }
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", session_id))
    }

    async fn read_session(&self, path: &Path) -> Result<SessionData, StoreError> {
        let raw = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl SessionStore for LocalSessionStore {
    async fn fetch_session(&self, session_id: &str) -> Result<SessionData, StoreError> {
        validate_session_id(session_id)?;
        let path = self.session_path(session_id);
        if !path.exists() {
            return Err(StoreError::NotFound(session_id.to_string()));
        }
        self.read_session(&path).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let mut summaries = Vec::new();
        let mut entries = match fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            // A missing data dir just means nothing saved yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(summaries);
            }
            Err(e) => {
                return Err(e.into());
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_session(&path).await {
                Ok(session) => summaries.push(summarize(&session)),
                Err(e) => {
                    warn!("Skipping unreadable session file {}: {}", path.display(), e);
                }
            }
        }

        summaries.sort_by_key(|s| std::cmp::Reverse(s.created_at.unwrap_or(0)));
        Ok(summaries)
    }
}

const TITLE_EXCERPT_LEN: usize = 80;

fn summarize(session: &SessionData) -> SessionSummary {
    let title: String = session.prompt.chars().take(TITLE_EXCERPT_LEN).collect();
    SessionSummary {
        id: session.id.clone(),
        title,
        created_at: session.messages.iter().filter_map(|m| m.created_at).min(),
    }
}

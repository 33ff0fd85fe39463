use serde::{ Serialize, Deserialize };

use crate::models::message::StoredMessage;

/// One saved comparison session as the persistence boundary returns it:
/// the free-text prompt, the participating model ids, and the flat
/// chronologically-unordered message list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub id: String,
    pub prompt: String,
    pub model_ids: Vec<String>,
    pub messages: Vec<StoredMessage>,
}

/// Listing entry for saved sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

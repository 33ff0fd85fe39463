use chrono::{ TimeZone, Utc };
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One persisted chat turn, as returned by every session store backend.
/// `model_id` is set only on assistant messages; `created_at` is unix millis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl StoredMessage {
    /// Sort key for chronological ordering. Messages without a timestamp
    /// sort to the front (epoch 0).
    pub fn sort_key(&self) -> i64 {
        self.created_at.unwrap_or(0)
    }
}

/// A render-ready transcript entry for one model pane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
}

impl DisplayMessage {
    pub fn from_stored(msg: &StoredMessage) -> Self {
        DisplayMessage {
            id: display_id(msg),
            role: msg.role,
            content: msg.content.clone(),
            timestamp: iso_timestamp(msg.created_at),
            input_tokens: msg.input_tokens,
            output_tokens: msg.output_tokens,
        }
    }
}

/// The final per-model transcript: only the rounds this model answered,
/// flattened into alternating user/assistant entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConversation {
    pub model_id: String,
    pub messages: Vec<DisplayMessage>,
    pub errored: bool,
}

/// Stable identifier for display: the persisted row id when present,
/// otherwise a timestamp+random composite.
fn display_id(msg: &StoredMessage) -> String {
    match msg.id {
        Some(id) => id.to_string(),
        None => format!("{}-{}", msg.created_at.unwrap_or(0), Uuid::new_v4().simple()),
    }
}

fn iso_timestamp(millis: Option<i64>) -> String {
    let millis = millis.unwrap_or(0);
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.to_rfc3339(),
        None => chrono::DateTime::<Utc>::UNIX_EPOCH.to_rfc3339(),
    }
}

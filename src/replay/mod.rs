use log::{ debug, warn };

use crate::models::message::{ DisplayMessage, MessageRole, ModelConversation, StoredMessage };

/// Two assistant replies from the same model with identical content and
/// timestamps closer than this are treated as a double-submission artifact.
pub const DUPLICATE_WINDOW_MS: i64 = 1000;

/// Reply contents matched (case-insensitive substring) to flag a model
/// pane as errored when no explicit success flag was persisted.
const ERROR_PHRASES: &[&str] = &[
    "an error occurred",
    "failed to get response",
    "failed to generate",
    "something went wrong",
    "rate limit exceeded",
    "request timed out",
];

/// One user prompt plus the assistant replies it elicited. Transient;
/// built during reconstruction and discarded after emission.
struct ConversationRound {
    user: StoredMessage,
    replies: Vec<StoredMessage>,
}

impl ConversationRound {
    fn new(user: StoredMessage) -> Self {
        ConversationRound { user, replies: Vec::new() }
    }

    fn is_duplicate(&self, candidate: &StoredMessage, window_ms: i64) -> bool {
        let candidate_ts = candidate.sort_key();
        self.replies.iter().any(|existing| {
            existing.model_id == candidate.model_id
                && existing.content == candidate.content
                && (existing.sort_key() - candidate_ts).abs() < window_ms
        })
    }

    fn reply_for(&self, model_id: &str) -> Option<&StoredMessage> {
        self.replies.iter().find(|r| r.model_id.as_deref() == Some(model_id))
    }
}

/// Rebuilds the per-model transcripts for a saved comparison session from
/// its flat message list. Always returns one entry per id in `model_ids`,
/// in the same order; a model that never answered gets an empty transcript
/// with its error flag set.
pub fn rebuild_conversations(
    messages: &[StoredMessage],
    model_ids: &[String]
) -> Vec<ModelConversation> {
    rebuild_conversations_with_window(messages, model_ids, DUPLICATE_WINDOW_MS)
}

pub fn rebuild_conversations_with_window(
    messages: &[StoredMessage],
    model_ids: &[String],
    duplicate_window_ms: i64
) -> Vec<ModelConversation> {
    let mut sorted: Vec<StoredMessage> = messages.to_vec();
    sorted.sort_by_key(|m| m.sort_key());

    let rounds = group_rounds(&sorted, duplicate_window_ms);

    model_ids
        .iter()
        .map(|model_id| {
            let mut entries = Vec::new();
            for round in &rounds {
                if let Some(reply) = round.reply_for(model_id) {
                    entries.push(DisplayMessage::from_stored(&round.user));
                    entries.push(DisplayMessage::from_stored(reply));
                }
            }
            ModelConversation {
                model_id: model_id.clone(),
                messages: entries,
                errored: derive_error_flag(model_id, &sorted),
            }
        })
        .collect()
}

/// Single linear pass over the time-sorted messages: each user message
/// opens a round, each attributable assistant message joins the open one.
fn group_rounds(sorted: &[StoredMessage], duplicate_window_ms: i64) -> Vec<ConversationRound> {
    let mut rounds: Vec<ConversationRound> = Vec::new();
    let mut current: Option<ConversationRound> = None;

    for msg in sorted {
        match msg.role {
            MessageRole::User => {
                if let Some(round) = current.take() {
                    rounds.push(round);
                }
                current = Some(ConversationRound::new(msg.clone()));
            }
            MessageRole::Assistant => {
                if msg.model_id.is_none() {
                    warn!("Dropping assistant message with no model id (id: {:?})", msg.id);
                    continue;
                }
                match current.as_mut() {
                    Some(round) => {
                        if round.is_duplicate(msg, duplicate_window_ms) {
                            debug!(
                                "Suppressing duplicate reply from {} within {}ms",
                                msg.model_id.as_deref().unwrap_or("?"),
                                duplicate_window_ms
                            );
                        } else {
                            round.replies.push(msg.clone());
                        }
                    }
                    None => {
                        warn!(
                            "Dropping assistant message with no preceding user message (model: {:?}, id: {:?})",
                            msg.model_id,
                            msg.id
                        );
                    }
                }
            }
        }
    }

    if let Some(round) = current.take() {
        rounds.push(round);
    }

    rounds
}

/// A model's pane is flagged as errored when it never replied, when its
/// latest reply carries an explicit `success: false`, or when the latest
/// reply content reads like one of the known failure messages.
///
/// Reads the flat message list rather than the rebuilt transcript so a
/// model whose only reply was suppressed as a duplicate still counts as
/// having answered.
pub fn derive_error_flag(model_id: &str, sorted: &[StoredMessage]) -> bool {
    let latest = sorted
        .iter()
        .filter(|m| m.role == MessageRole::Assistant && m.model_id.as_deref() == Some(model_id))
        .max_by_key(|m| m.sort_key());

    match latest {
        None => true,
        Some(msg) => {
            if msg.success == Some(false) {
                return true;
            }
            looks_like_error(&msg.content)
        }
    }
}

fn looks_like_error(content: &str) -> bool {
    let lowered = content.to_lowercase();
    ERROR_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(ts: i64, content: &str) -> StoredMessage {
        StoredMessage {
            role: MessageRole::User,
            content: content.to_string(),
            created_at: Some(ts),
            model_id: None,
            id: None,
            input_tokens: None,
            output_tokens: None,
            success: None,
        }
    }

    fn assistant(ts: i64, model: &str, content: &str) -> StoredMessage {
        StoredMessage {
            role: MessageRole::Assistant,
            content: content.to_string(),
            created_at: Some(ts),
            model_id: Some(model.to_string()),
            id: None,
            input_tokens: None,
            output_tokens: None,
            success: None,
        }
    }

    fn contents(conv: &ModelConversation) -> Vec<&str> {
        conv.messages.iter().map(|m| m.content.as_str()).collect()
    }

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rebuilds_parallel_transcripts_per_model() {
        let messages = vec![
            user(0, "Q1"),
            assistant(1, "model-a", "A1"),
            assistant(1, "model-b", "A1b"),
            user(2, "Q2"),
            assistant(3, "model-a", "A2"),
        ];
        let convs = rebuild_conversations(&messages, &models(&["model-a", "model-b"]));

        assert_eq!(convs.len(), 2);
        assert_eq!(contents(&convs[0]), vec!["Q1", "A1", "Q2", "A2"]);
        assert!(!convs[0].errored);
        // model-b never answered Q2, so its transcript omits that round
        // entirely rather than showing an unanswered prompt.
        assert_eq!(contents(&convs[1]), vec!["Q1", "A1b"]);
        assert!(!convs[1].errored);
    }

    #[test]
    fn shuffled_input_yields_same_transcripts() {
        // Persisted ids keep display ids deterministic across the two runs.
        let mut ordered = vec![
            user(10, "Q1"),
            assistant(20, "m", "A1"),
            user(30, "Q2"),
            assistant(40, "m", "A2"),
        ];
        for (i, msg) in ordered.iter_mut().enumerate() {
            msg.id = Some(i as i64 + 1);
        }
        let shuffled = vec![
            ordered[3].clone(),
            ordered[0].clone(),
            ordered[2].clone(),
            ordered[1].clone(),
        ];
        let ids = models(&["m"]);
        let from_ordered = rebuild_conversations(&ordered, &ids);
        let from_shuffled = rebuild_conversations(&shuffled, &ids);
        assert_eq!(from_ordered[0].messages, from_shuffled[0].messages);
    }

    #[test]
    fn transcripts_always_pair_user_and_assistant() {
        let messages = vec![
            user(0, "Q1"),
            assistant(1, "a", "A1"),
            user(2, "Q2"),
            user(4, "Q3"),
            assistant(5, "b", "A3"),
        ];
        for conv in rebuild_conversations(&messages, &models(&["a", "b"])) {
            assert_eq!(conv.messages.len() % 2, 0);
            for pair in conv.messages.chunks(2) {
                assert_eq!(pair[0].role, MessageRole::User);
                assert_eq!(pair[1].role, MessageRole::Assistant);
            }
        }
    }

    #[test]
    fn duplicate_replies_within_window_collapse() {
        let messages = vec![
            user(0, "Q"),
            assistant(1000, "m", "same answer"),
            assistant(1500, "m", "same answer"),
        ];
        let rounds = group_rounds(&messages, DUPLICATE_WINDOW_MS);
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].replies.len(), 1);
        let convs = rebuild_conversations(&messages, &models(&["m"]));
        assert_eq!(contents(&convs[0]), vec!["Q", "same answer"]);
    }

    #[test]
    fn duplicate_replies_outside_window_are_kept() {
        let messages = vec![
            user(0, "Q"),
            assistant(1000, "m", "same answer"),
            assistant(3000, "m", "same answer"),
        ];
        let rounds = group_rounds(&messages, DUPLICATE_WINDOW_MS);
        assert_eq!(rounds[0].replies.len(), 2);
    }

    #[test]
    fn same_content_from_different_models_is_not_a_duplicate() {
        let messages = vec![
            user(0, "Q"),
            assistant(1, "a", "42"),
            assistant(2, "b", "42"),
        ];
        let convs = rebuild_conversations(&messages, &models(&["a", "b"]));
        assert_eq!(contents(&convs[0]), vec!["Q", "42"]);
        assert_eq!(contents(&convs[1]), vec!["Q", "42"]);
    }

    #[test]
    fn orphan_assistant_message_is_dropped() {
        let messages = vec![
            assistant(0, "m", "ghost reply"),
            user(1, "Q"),
            assistant(2, "m", "A"),
        ];
        let convs = rebuild_conversations(&messages, &models(&["m"]));
        assert_eq!(contents(&convs[0]), vec!["Q", "A"]);
    }

    #[test]
    fn assistant_without_model_id_is_dropped() {
        let mut unattributed = assistant(1, "m", "A");
        unattributed.model_id = None;
        let messages = vec![user(0, "Q"), unattributed];
        let convs = rebuild_conversations(&messages, &models(&["m"]));
        assert!(convs[0].messages.is_empty());
        assert!(convs[0].errored);
    }

    #[test]
    fn silent_model_has_empty_transcript_and_error_flag() {
        let messages = vec![user(0, "Q"), assistant(1, "a", "A")];
        let convs = rebuild_conversations(&messages, &models(&["a", "b"]));
        assert!(!convs[0].errored);
        assert!(convs[1].messages.is_empty());
        assert!(convs[1].errored);
    }

    #[test]
    fn explicit_failure_flag_marks_model_errored() {
        let mut failed = assistant(1, "m", "partial output");
        failed.success = Some(false);
        let messages = vec![user(0, "Q"), failed];
        let convs = rebuild_conversations(&messages, &models(&["m"]));
        assert!(convs[0].errored);
    }

    #[test]
    fn error_phrase_in_latest_reply_marks_model_errored() {
        let messages = vec![
            user(0, "Q1"),
            assistant(1, "m", "fine answer"),
            user(2, "Q2"),
            assistant(3, "m", "Sorry, an error occurred while responding."),
        ];
        assert!(rebuild_conversations(&messages, &models(&["m"]))[0].errored);
    }

    #[test]
    fn error_phrase_in_older_reply_does_not_mark_errored() {
        let messages = vec![
            user(0, "Q1"),
            assistant(1, "m", "An error occurred."),
            user(2, "Q2"),
            assistant(3, "m", "recovered fine"),
        ];
        assert!(!rebuild_conversations(&messages, &models(&["m"]))[0].errored);
    }

    #[test]
    fn missing_timestamps_sort_to_front() {
        let mut early_user = user(0, "Q");
        early_user.created_at = None;
        let messages = vec![assistant(5, "m", "A"), early_user];
        let convs = rebuild_conversations(&messages, &models(&["m"]));
        assert_eq!(contents(&convs[0]), vec!["Q", "A"]);
    }

    #[test]
    fn token_counts_propagate_to_display_entries() {
        let mut reply = assistant(1, "m", "A");
        reply.input_tokens = Some(12);
        reply.output_tokens = Some(34);
        let messages = vec![user(0, "Q"), reply];
        let convs = rebuild_conversations(&messages, &models(&["m"]));
        assert_eq!(convs[0].messages[1].input_tokens, Some(12));
        assert_eq!(convs[0].messages[1].output_tokens, Some(34));
    }

    #[test]
    fn empty_input_yields_empty_flagged_conversations() {
        let convs = rebuild_conversations(&[], &models(&["m"]));
        assert_eq!(convs.len(), 1);
        assert!(convs[0].messages.is_empty());
        assert!(convs[0].errored);
    }
}

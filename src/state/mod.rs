//! Explicit state-transition functions for the comparison UI. Each state
//! change is a direct call from a user action; derived values are
//! recomputed on demand instead of cascading through effects.

/// Keeps the focused pane index valid when the pane count changes
/// (models added, removed, or a session with fewer panes loaded).
pub fn clamp_pane_index(current: usize, pane_count: usize) -> usize {
    if pane_count == 0 {
        0
    } else {
        current.min(pane_count - 1)
    }
}

/// Which models are picked for the next comparison. Selection is capped;
/// toggles past the cap are ignored, deselecting is always allowed.
#[derive(Clone, Debug)]
pub struct ModelSelection {
    selected: Vec<String>,
    max_models: usize,
}

impl ModelSelection {
    pub fn new(max_models: usize) -> Self {
        ModelSelection { selected: Vec::new(), max_models }
    }

    pub fn toggle(&mut self, model_id: &str) {
        if let Some(pos) = self.selected.iter().position(|m| m == model_id) {
            self.selected.remove(pos);
        } else if self.selected.len() < self.max_models {
            self.selected.push(model_id.to_string());
        }
    }

    pub fn replace_all(&mut self, model_ids: Vec<String>) {
        self.selected = model_ids;
        self.selected.truncate(self.max_models);
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, model_id: &str) -> bool {
        self.selected.iter().any(|m| m == model_id)
    }

    pub fn can_submit(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.max_models.saturating_sub(self.selected.len())
    }
}

/// Token-count notification level for the prompt box, derived from the
/// current estimate and the per-request limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenNotice {
    None,
    Approaching,
    Exceeded,
}

/// Warn once the estimate crosses this fraction of the limit.
const TOKEN_WARN_RATIO: f64 = 0.8;

pub fn token_notice(input_tokens: u32, limit: u32) -> TokenNotice {
    if limit == 0 || input_tokens > limit {
        return TokenNotice::Exceeded;
    }
    if (input_tokens as f64) >= (limit as f64) * TOKEN_WARN_RATIO {
        TokenNotice::Approaching
    } else {
        TokenNotice::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalKind {
    Settings,
    SaveSession,
    LoadSession,
    Share,
}

/// At most one modal is open at a time; opening another replaces it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModalState {
    open: Option<ModalKind>,
}

impl ModalState {
    pub fn open(&mut self, kind: ModalKind) {
        self.open = Some(kind);
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn current(&self) -> Option<ModalKind> {
        self.open
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.open == Some(kind)
    }
}

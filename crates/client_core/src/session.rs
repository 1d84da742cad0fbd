use shared::domain::{
    truncate_chars, AccountAddress, SessionSnapshot, MESSAGE_MAX_CHARS, NAME_MAX_CHARS,
};

/// Connection status and draft fields for the active user.
///
/// `generation` advances on every reset so that a connect or submit started
/// before a disconnect can tell, on completion, that its session is gone.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) address: Option<AccountAddress>,
    pub(crate) draft_name: String,
    pub(crate) draft_message: String,
    pub(crate) connecting: bool,
    pub(crate) submitting: bool,
    pub(crate) generation: u64,
}

impl SessionState {
    pub(crate) fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub(crate) fn mark_connected(&mut self, address: AccountAddress) {
        self.connecting = false;
        self.address = Some(address);
    }

    pub(crate) fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    pub(crate) fn set_draft_name(&mut self, value: &str) {
        self.draft_name = truncate_chars(value, NAME_MAX_CHARS);
    }

    pub(crate) fn set_draft_message(&mut self, value: &str) {
        self.draft_message = truncate_chars(value, MESSAGE_MAX_CHARS);
    }

    pub(crate) fn clear_drafts(&mut self) {
        self.draft_name.clear();
        self.draft_message.clear();
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connected: self.is_connected(),
            address: self.address.clone(),
            draft_name: self.draft_name.clone(),
            draft_message: self.draft_message.clone(),
            connecting: self.connecting,
            submitting: self.submitting,
        }
    }
}

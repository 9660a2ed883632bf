use std::collections::BTreeMap;

use uuid::Uuid;

use super::Message;

/// Data source name to the participant the user picked as themselves.
pub type IdentityBinding = BTreeMap<String, String>;

/// Candidate participant names per data source, as reported by the service.
pub type ParticipantsBySource = BTreeMap<String, Vec<String>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unbound,
    BoundEmpty,
    Active,
    AwaitingResponse,
}

/// One open, year-scoped conversation tab.
///
/// Fields are only mutated by `Sessions`. The `epoch` increases every time the
/// transcript is reset so that replies belonging to an older conversation can
/// be told apart from current ones.
#[derive(Clone, Debug)]
pub struct Session {
    id: String,
    year: i32,
    messages: Vec<Message>,
    selected_identities: IdentityBinding,
    awaiting_response: bool,
    epoch: u64,
    started: bool,
}

impl Session {
    pub fn new(year: i32) -> Session {
        return Session {
            id: Session::create_id(),
            year,
            messages: vec![],
            selected_identities: IdentityBinding::new(),
            awaiting_response: false,
            epoch: 0,
            started: false,
        };
    }

    pub fn create_id() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .take(2)
            .collect::<Vec<&str>>()
            .join("-");
    }

    pub fn id(&self) -> &str {
        return &self.id;
    }

    pub fn year(&self) -> i32 {
        return self.year;
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn selected_identities(&self) -> &IdentityBinding {
        return &self.selected_identities;
    }

    pub fn is_awaiting_response(&self) -> bool {
        return self.awaiting_response;
    }

    pub fn epoch(&self) -> u64 {
        return self.epoch;
    }

    pub fn is_bound(&self) -> bool {
        return !self.selected_identities.is_empty();
    }

    pub fn state(&self) -> SessionState {
        if !self.is_bound() {
            return SessionState::Unbound;
        }
        if self.awaiting_response {
            return SessionState::AwaitingResponse;
        }
        if self.messages.is_empty() {
            return SessionState::BoundEmpty;
        }

        return SessionState::Active;
    }

    /// Header label, e.g. `Alex (2020), alex#0001 (2020)`. Sources bound
    /// without a name are left out.
    pub fn persona_label(&self) -> String {
        let names = self
            .selected_identities
            .values()
            .filter(|name| return !name.is_empty())
            .map(|name| {
                return format!("{name} ({})", self.year);
            })
            .collect::<Vec<String>>();

        if names.is_empty() {
            return format!("You ({})", self.year);
        }

        return names.join(", ");
    }

    pub(crate) fn reset_for_year(&mut self, year: i32) {
        self.year = year;
        self.messages = vec![];
        self.selected_identities = IdentityBinding::new();
        self.epoch += 1;
        self.started = false;
    }

    pub(crate) fn bind(&mut self, binding: IdentityBinding) {
        self.selected_identities = binding;
        self.messages = vec![];
        self.epoch += 1;
        self.started = false;
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn set_awaiting_response(&mut self, awaiting: bool) {
        self.awaiting_response = awaiting;
    }

    pub(crate) fn is_started(&self) -> bool {
        return self.started;
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }
}

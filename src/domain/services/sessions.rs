#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use super::BindingError;
use super::PersonaBinder;
use crate::domain::models::Author;
use crate::domain::models::ChatTurn;
use crate::domain::models::Message;
use crate::domain::models::PendingBinding;
use crate::domain::models::Session;
use crate::domain::models::StartTurn;

pub const DEFAULT_MAX_SESSIONS: usize = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    Default,
    Conversation,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Maximum of {0} tabs reached.")]
    AtCapacity(usize),
    #[error("No session found for id {0}")]
    NotFound(String),
    #[error("Cannot close the last tab.")]
    LastSession,
    #[error("Select your persona before chatting.")]
    Unbound,
    #[error("A persona is already selected for {0}. Change the year to pick another one.")]
    AlreadyBound(i32),
    #[error("Still waiting on a response for this tab.")]
    Busy,
    #[error("Message is empty.")]
    EmptyMessage,
    #[error("The persona selection was made for {0}, but this tab has moved on.")]
    Stale(i32),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Owns every open conversation tab and is the only place their state is
/// changed.
///
/// Remote work is split in two halves around each call: a `begin_*` method
/// validates and records the local side (optimistic message, awaiting flag)
/// and hands back a turn describing the request, and a `complete_*` method
/// applies the outcome. A completion whose epoch no longer matches the
/// session, because the year changed or the persona was rebound meanwhile,
/// only releases the awaiting flag.
pub struct Sessions {
    records: Vec<Session>,
    active_id: Option<String>,
    max_sessions: usize,
    view: View,
}

impl Default for Sessions {
    fn default() -> Sessions {
        return Sessions::new(DEFAULT_MAX_SESSIONS);
    }
}

impl Sessions {
    pub fn new(max_sessions: usize) -> Sessions {
        return Sessions {
            records: vec![],
            active_id: None,
            max_sessions: max_sessions.max(1),
            view: View::Default,
        };
    }

    pub fn len(&self) -> usize {
        return self.records.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.records.is_empty();
    }

    pub fn max_sessions(&self) -> usize {
        return self.max_sessions;
    }

    pub fn view(&self) -> View {
        return self.view;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        return self.records.iter();
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        return self.records.iter().find(|session| return session.id() == id);
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Session, SessionError> {
        return self
            .records
            .iter_mut()
            .find(|session| return session.id() == id)
            .ok_or_else(|| return SessionError::NotFound(id.to_string()));
    }

    pub fn active_id(&self) -> Option<&str> {
        return self.active_id.as_deref();
    }

    pub fn active(&self) -> Option<&Session> {
        return self.active_id.as_deref().and_then(|id| return self.get(id));
    }

    pub fn active_index(&self) -> Option<usize> {
        let id = self.active_id.as_deref()?;
        return self.records.iter().position(|session| return session.id() == id);
    }

    pub fn create(&mut self, year: i32) -> Result<String, SessionError> {
        if self.records.len() >= self.max_sessions {
            tracing::debug!(max = self.max_sessions, "Session ceiling reached");
            return Err(SessionError::AtCapacity(self.max_sessions));
        }

        let session = Session::new(year);
        let id = session.id().to_string();
        self.records.push(session);
        self.active_id = Some(id.clone());
        self.view = View::Conversation;

        tracing::debug!(id = id, year = year, "Created session");
        return Ok(id);
    }

    /// Switches to the first tab already showing `year`, or opens a new one.
    pub fn open_year(&mut self, year: i32) -> Result<String, SessionError> {
        let existing = self
            .records
            .iter()
            .find(|session| return session.year() == year)
            .map(|session| return session.id().to_string());

        if let Some(id) = existing {
            self.switch_to(&id);
            return Ok(id);
        }

        return self.create(year);
    }

    pub fn switch_to(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        self.active_id = Some(id.to_string());
        self.view = View::Conversation;
        return true;
    }

    /// Activates the tab `offset` positions away from the active one,
    /// wrapping around the ends.
    pub fn cycle(&mut self, offset: isize) -> bool {
        if self.records.is_empty() {
            return false;
        }

        let len = self.records.len() as isize;
        let current = self.active_index().unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        let id = self.records[next].id().to_string();

        return self.switch_to(&id);
    }

    pub fn close(&mut self, id: &str) -> Result<(), SessionError> {
        let idx = self
            .records
            .iter()
            .position(|session| return session.id() == id)
            .ok_or_else(|| return SessionError::NotFound(id.to_string()))?;

        if self.records.len() == 1 {
            return Err(SessionError::LastSession);
        }

        self.records.remove(idx);

        if self.active_id.as_deref() == Some(id) {
            if self.records.is_empty() {
                self.active_id = None;
                self.view = View::Default;
            } else {
                let next = idx.saturating_sub(1).min(self.records.len() - 1);
                self.active_id = Some(self.records[next].id().to_string());
            }
        }

        tracing::debug!(id = id, "Closed session");
        return Ok(());
    }

    pub fn change_year(&mut self, id: &str, year: i32) -> Result<(), SessionError> {
        let session = self.get_mut(id)?;
        session.reset_for_year(year);

        tracing::debug!(id = id, year = year, "Changed session year");
        return Ok(());
    }

    /// Validates the binder's picks for the session. The binding is not
    /// stored until `commit_binding` runs with the service's acknowledgment.
    pub fn begin_binding(
        &mut self,
        id: &str,
        binder: &PersonaBinder,
    ) -> Result<PendingBinding, SessionError> {
        let session = self.get_mut(id)?;
        if session.is_bound() {
            return Err(SessionError::AlreadyBound(session.year()));
        }
        if session.is_awaiting_response() {
            return Err(SessionError::Busy);
        }
        if binder.year() != session.year() {
            return Err(SessionError::Stale(binder.year()));
        }

        let binding = binder.confirm()?;
        session.set_awaiting_response(true);

        return Ok(PendingBinding {
            session_id: id.to_string(),
            epoch: session.epoch(),
            year: session.year(),
            binding,
        });
    }

    pub fn commit_binding(&mut self, pending: PendingBinding) -> Result<(), SessionError> {
        let session = self.get_mut(&pending.session_id)?;
        session.set_awaiting_response(false);

        if session.epoch() != pending.epoch || session.year() != pending.year {
            return Err(SessionError::Stale(pending.year));
        }

        session.bind(pending.binding);
        tracing::debug!(id = pending.session_id, year = pending.year, "Bound identities");
        return Ok(());
    }

    /// Drops a binding the service refused. The session keeps the state it
    /// had before `begin_binding`.
    pub fn abort_binding(&mut self, pending: &PendingBinding) {
        if let Ok(session) = self.get_mut(&pending.session_id) {
            session.set_awaiting_response(false);
        }
    }

    /// Returns the start request for the session if it is bound, has an empty
    /// transcript and has not been started under its current binding yet.
    pub fn begin_start(&mut self, id: &str) -> Option<StartTurn> {
        let session = self.get_mut(id).ok()?;
        if !session.is_bound()
            || !session.messages().is_empty()
            || session.is_awaiting_response()
            || session.is_started()
        {
            return None;
        }

        session.mark_started();
        session.set_awaiting_response(true);

        return Some(StartTurn {
            session_id: id.to_string(),
            epoch: session.epoch(),
            year: session.year(),
        });
    }

    pub fn complete_start(&mut self, turn: &StartTurn, failure: Option<Message>) {
        let session = match self.get_mut(&turn.session_id) {
            Ok(session) => session,
            Err(_) => return,
        };
        session.set_awaiting_response(false);

        if session.epoch() != turn.epoch {
            tracing::debug!(id = turn.session_id, "Discarding stale start result");
            return;
        }

        if let Some(message) = failure {
            session.push(message);
        }
    }

    /// Appends the user's message and marks the session as awaiting a reply.
    pub fn begin_send(&mut self, id: &str, text: &str) -> Result<ChatTurn, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let session = self.get_mut(id)?;
        if !session.is_bound() {
            return Err(SessionError::Unbound);
        }
        if session.is_awaiting_response() {
            return Err(SessionError::Busy);
        }

        session.push(Message::new(Author::User, text));
        session.set_awaiting_response(true);

        return Ok(ChatTurn {
            session_id: id.to_string(),
            epoch: session.epoch(),
            year: session.year(),
            text: text.to_string(),
        });
    }

    pub fn complete_send(&mut self, turn: &ChatTurn, reply: Message) {
        let session = match self.get_mut(&turn.session_id) {
            Ok(session) => session,
            Err(_) => return,
        };
        session.set_awaiting_response(false);

        if session.epoch() != turn.epoch {
            tracing::debug!(id = turn.session_id, "Discarding stale chat reply");
            return;
        }

        session.push(reply);
    }
}

#[cfg(test)]
#[path = "exchange_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;

use super::PersonaBinder;
use super::Sessions;
use crate::domain::models::Author;
use crate::domain::models::ChatTurn;
use crate::domain::models::Message;
use crate::domain::models::PendingBinding;
use crate::domain::models::RemoteArc;
use crate::domain::models::RemoteError;
use crate::domain::models::StartTurn;

pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_millis(50_000);

/// Runs the remote half of every per-session request. Methods taking a turn
/// only talk to the service and return what should land in the transcript,
/// which lets the UI loop keep several sessions in flight at once. The
/// `*_with` helpers wrap the whole begin, call, complete cycle for callers
/// that handle one session at a time.
#[derive(Clone)]
pub struct Exchange {
    remote: RemoteArc,
    chat_timeout: Duration,
}

impl Exchange {
    pub fn new(remote: RemoteArc, chat_timeout: Duration) -> Exchange {
        return Exchange {
            remote,
            chat_timeout,
        };
    }

    /// Sends the turn's message and builds the reply bubble. Failures become a
    /// system message, the request future is dropped once the timeout
    /// elapses so a late answer can never be applied.
    pub async fn round_trip(&self, turn: &ChatTurn) -> Message {
        let res = tokio::time::timeout(
            self.chat_timeout,
            self.remote.send_chat(turn.year, &turn.text),
        )
        .await
        .unwrap_or(Err(RemoteError::Timeout));

        match res {
            Ok(reply) => {
                return Message::new(Author::Ai, &reply.response);
            }
            Err(RemoteError::Rejected(err)) => {
                tracing::error!(year = turn.year, error = err, "Chat request rejected");
                return Message::system(&format!("Error: Could not get response. {err}"));
            }
            Err(RemoteError::Transport(err)) => {
                tracing::error!(year = turn.year, error = err, "Chat request failed");
                return Message::system(&format!(
                    "Error: Network error sending message. {err}"
                ));
            }
            Err(RemoteError::Timeout) => {
                tracing::error!(
                    year = turn.year,
                    timeout_ms = self.chat_timeout.as_millis() as u64,
                    "Chat request timed out"
                );
                return Message::system("Error: Request timed out. Please try again.");
            }
        }
    }

    /// Asks the service to prepare the year's conversation. Returns the system
    /// message to show when that fails.
    pub async fn prepare(&self, turn: &StartTurn) -> Option<Message> {
        let year = turn.year;
        match self.remote.start_chat(year).await {
            Ok(ack) => {
                tracing::debug!(year = year, message = ack.message, "Chat session started");
                return None;
            }
            Err(RemoteError::Transport(err)) => {
                tracing::error!(year = year, error = err, "Failed to reach service");
                return Some(Message::system(&format!(
                    "Error: Network error starting chat session for {year}. {err}"
                )));
            }
            Err(err) => {
                tracing::error!(year = year, error = ?err, "Failed to start chat session");
                return Some(Message::system(&format!(
                    "Error: Could not start chat session for {year}. {err}"
                )));
            }
        }
    }

    /// Tells the service who the user is in each source. Returns the notice
    /// to surface when the binding was refused.
    pub async fn notify_binding(&self, pending: &PendingBinding) -> Option<String> {
        match self
            .remote
            .set_user_names(pending.year, &pending.binding)
            .await
        {
            Ok(ack) => {
                tracing::debug!(year = pending.year, message = ack.message, "User names set");
                return None;
            }
            Err(RemoteError::Transport(err)) => {
                return Some(format!("Network error setting user names: {err}"));
            }
            Err(err) => {
                return Some(format!("Error setting user names: {err}"));
            }
        }
    }

    pub async fn send_with(&self, sessions: &mut Sessions, id: &str, text: &str) -> Result<()> {
        let turn = sessions.begin_send(id, text)?;
        let reply = self.round_trip(&turn).await;
        sessions.complete_send(&turn, reply);

        return Ok(());
    }

    /// Returns false when the session did not need starting.
    pub async fn start_with(&self, sessions: &mut Sessions, id: &str) -> bool {
        let turn = match sessions.begin_start(id) {
            Some(turn) => turn,
            None => return false,
        };

        let failure = self.prepare(&turn).await;
        sessions.complete_start(&turn, failure);

        return true;
    }

    /// Validates, notifies and commits a binding. A refused notification
    /// leaves the session unbound and comes back as the error.
    pub async fn bind_with(
        &self,
        sessions: &mut Sessions,
        id: &str,
        binder: &PersonaBinder,
    ) -> Result<()> {
        let pending = sessions.begin_binding(id, binder)?;

        if let Some(notice) = self.notify_binding(&pending).await {
            sessions.abort_binding(&pending);
            bail!(notice);
        }

        sessions.commit_binding(pending)?;
        return Ok(());
    }
}


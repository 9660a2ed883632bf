use super::ChatTurn;
use super::PendingBinding;
use super::StartTurn;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Drops whatever request is still in flight for a closed session.
    AbandonSession(String),
    BindIdentities(PendingBinding),
    LoadAvailableYears(),
    LoadParticipants(String, u64, i32),
    RequestProcessing(),
    SendMessage(ChatTurn),
    StartSession(StartTurn),
}

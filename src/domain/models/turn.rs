use super::IdentityBinding;

/// An outbound chat message whose user bubble is already in the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub session_id: String,
    pub epoch: u64,
    pub year: i32,
    pub text: String,
}

/// A request to prepare the remote conversation context for a bound session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartTurn {
    pub session_id: String,
    pub epoch: u64,
    pub year: i32,
}

/// A validated identity binding waiting for the service to acknowledge it.
/// Nothing is written to the session until the acknowledgment arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBinding {
    pub session_id: String,
    pub epoch: u64,
    pub year: i32,
    pub binding: IdentityBinding,
}

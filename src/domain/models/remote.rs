use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::IdentityBinding;
use super::ParticipantsBySource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartChatRequest {
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub year: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNamesRequest {
    pub year: i32,
    pub selected_user_names: IdentityBinding,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    #[serde(default)]
    pub participants_by_source: ParticipantsBySource,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingReport {
    #[serde(default)]
    pub available_years: Vec<i32>,
    #[serde(default)]
    pub unprocessed_files: Vec<String>,
}

impl ProcessingReport {
    pub fn latest_year(&self) -> Option<i32> {
        return self.available_years.iter().max().copied();
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed.
    #[error("{0}")]
    Transport(String),
    #[error("Request timed out")]
    Timeout,
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// The data processing and chat service the application talks to.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Prepares the conversation context for a year. Requires user names to
    /// have been set for that year beforehand.
    async fn start_chat(&self, year: i32) -> RemoteResult<Acknowledgement>;

    /// Sends one user message to the year's conversation and waits for the
    /// persona's reply. Implementations do not time out on their own, callers
    /// bound the wait.
    async fn send_chat(&self, year: i32, message: &str) -> RemoteResult<ChatResponse>;

    async fn set_user_names(
        &self,
        year: i32,
        selected_user_names: &IdentityBinding,
    ) -> RemoteResult<Acknowledgement>;

    async fn available_years(&self) -> RemoteResult<Vec<i32>>;

    async fn participants(&self, year: i32) -> RemoteResult<ParticipantsResponse>;

    async fn process_data(&self) -> RemoteResult<ProcessingReport>;

    async fn processed_files(&self) -> RemoteResult<BTreeMap<String, Vec<String>>>;

    async fn clear_uploaded_files(&self) -> RemoteResult<Acknowledgement>;
}

pub type RemoteArc = Arc<dyn Remote>;

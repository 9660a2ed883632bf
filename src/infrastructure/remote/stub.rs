use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::models::Acknowledgement;
use crate::domain::models::ChatResponse;
use crate::domain::models::IdentityBinding;
use crate::domain::models::ParticipantsBySource;
use crate::domain::models::ParticipantsResponse;
use crate::domain::models::ProcessingReport;
use crate::domain::models::Remote;
use crate::domain::models::RemoteError;
use crate::domain::models::RemoteResult;

/// Scripted service used by domain tests. Every call is recorded as
/// `name:argument` in `calls`.
pub struct StubRemote {
    pub chat: RemoteResult<String>,
    pub chat_delay: Duration,
    pub start: RemoteResult<String>,
    pub user_names: RemoteResult<String>,
    pub years: RemoteResult<Vec<i32>>,
    pub participants: RemoteResult<ParticipantsBySource>,
    pub processing: RemoteResult<ProcessingReport>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for StubRemote {
    fn default() -> StubRemote {
        let mut participants = ParticipantsBySource::new();
        participants.insert(
            "whatsapp".to_string(),
            vec!["Alex".to_string(), "Sam".to_string()],
        );

        return StubRemote {
            chat: Ok("hi".to_string()),
            chat_delay: Duration::ZERO,
            start: Ok("Chat session started.".to_string()),
            user_names: Ok("User names set.".to_string()),
            years: Ok(vec![2019, 2020]),
            participants: Ok(participants),
            processing: Ok(ProcessingReport {
                available_years: vec![2019, 2020],
                unprocessed_files: vec![],
            }),
            calls: Mutex::new(vec![]),
        };
    }
}

impl StubRemote {
    pub fn calls(&self) -> Vec<String> {
        return self.calls.lock().unwrap().clone();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn ack(res: &RemoteResult<String>) -> RemoteResult<Acknowledgement> {
    return res.clone().map(|message| return Acknowledgement { message });
}

#[async_trait]
impl Remote for StubRemote {
    async fn start_chat(&self, year: i32) -> RemoteResult<Acknowledgement> {
        self.record(format!("start_chat:{year}"));
        return ack(&self.start);
    }

    async fn send_chat(&self, year: i32, message: &str) -> RemoteResult<ChatResponse> {
        self.record(format!("send_chat:{year}:{message}"));
        if !self.chat_delay.is_zero() {
            tokio::time::sleep(self.chat_delay).await;
        }

        return self
            .chat
            .clone()
            .map(|response| return ChatResponse { response });
    }

    async fn set_user_names(
        &self,
        year: i32,
        selected_user_names: &IdentityBinding,
    ) -> RemoteResult<Acknowledgement> {
        let names = selected_user_names
            .iter()
            .map(|(source, name)| return format!("{source}={name}"))
            .collect::<Vec<String>>()
            .join(",");
        self.record(format!("set_user_names:{year}:{names}"));
        return ack(&self.user_names);
    }

    async fn available_years(&self) -> RemoteResult<Vec<i32>> {
        self.record("available_years".to_string());
        return self.years.clone();
    }

    async fn participants(&self, year: i32) -> RemoteResult<ParticipantsResponse> {
        self.record(format!("participants:{year}"));
        return self
            .participants
            .clone()
            .map(|participants_by_source| {
                return ParticipantsResponse {
                    participants_by_source,
                };
            });
    }

    async fn process_data(&self) -> RemoteResult<ProcessingReport> {
        self.record("process_data".to_string());
        return self.processing.clone();
    }

    async fn processed_files(&self) -> RemoteResult<BTreeMap<String, Vec<String>>> {
        self.record("processed_files".to_string());
        return Err(RemoteError::Rejected("not scripted".to_string()));
    }

    async fn clear_uploaded_files(&self) -> RemoteResult<Acknowledgement> {
        self.record("clear_uploaded_files".to_string());
        return Ok(Acknowledgement::default());
    }
}

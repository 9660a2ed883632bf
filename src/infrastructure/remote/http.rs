#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Acknowledgement;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatResponse;
use crate::domain::models::ErrorResponse;
use crate::domain::models::IdentityBinding;
use crate::domain::models::ParticipantsResponse;
use crate::domain::models::ProcessingReport;
use crate::domain::models::Remote;
use crate::domain::models::RemoteError;
use crate::domain::models::RemoteResult;
use crate::domain::models::StartChatRequest;
use crate::domain::models::UserNamesRequest;

fn convert_err(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::Timeout;
    }
    return RemoteError::Transport(err.to_string());
}

/// Reads a JSON body, turning a non-success status into the service's
/// `{"error": ...}` text.
async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> RemoteResult<T> {
    let status = res.status();
    let body = res.text().await.map_err(convert_err)?;

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body = body, "Request rejected");
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => err.error,
            Err(_) => format!("status {code}", code = status.as_u16()),
        };
        return Err(RemoteError::Rejected(message));
    }

    return serde_json::from_str::<T>(&body)
        .map_err(|err| return RemoteError::Transport(format!("Invalid response body: {err}")));
}

/// Talks to the processing and chat service over its JSON API.
pub struct HttpRemote {
    url: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpRemote {
    pub fn new(url: &str, request_timeout: Duration) -> HttpRemote {
        return HttpRemote {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            request_timeout,
        };
    }

    pub fn from_config() -> Result<HttpRemote> {
        let timeout = Config::get(ConfigKey::RequestTimeout).parse::<u64>()?;
        return Ok(HttpRemote::new(
            &Config::get(ConfigKey::ApiURL),
            Duration::from_millis(timeout),
        ));
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.url);
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let res = self
            .client
            .get(self.endpoint(path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(convert_err)?;

        return decode(res).await;
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> RemoteResult<T> {
        let mut req = self.client.post(self.endpoint(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let res = req.send().await.map_err(convert_err)?;
        return decode(res).await;
    }
}

fn to_value<T: serde::Serialize>(body: &T) -> RemoteResult<serde_json::Value> {
    return serde_json::to_value(body)
        .map_err(|err| return RemoteError::Transport(err.to_string()));
}

#[async_trait]
impl Remote for HttpRemote {
    async fn start_chat(&self, year: i32) -> RemoteResult<Acknowledgement> {
        let body = to_value(&StartChatRequest { year })?;
        return self
            .post("/api/start_chat", Some(&body), Some(self.request_timeout))
            .await;
    }

    async fn send_chat(&self, year: i32, message: &str) -> RemoteResult<ChatResponse> {
        let body = to_value(&ChatRequest {
            year,
            message: message.to_string(),
        })?;
        tracing::debug!(year = year, "Sending chat message");

        return self.post("/api/chat", Some(&body), None).await;
    }

    async fn set_user_names(
        &self,
        year: i32,
        selected_user_names: &IdentityBinding,
    ) -> RemoteResult<Acknowledgement> {
        let body = to_value(&UserNamesRequest {
            year,
            selected_user_names: selected_user_names.clone(),
        })?;

        return self
            .post("/api/set_user_names", Some(&body), Some(self.request_timeout))
            .await;
    }

    async fn available_years(&self) -> RemoteResult<Vec<i32>> {
        return self.get("/api/get_available_years").await;
    }

    async fn participants(&self, year: i32) -> RemoteResult<ParticipantsResponse> {
        return self.get(&format!("/api/get_participants/{year}")).await;
    }

    async fn process_data(&self) -> RemoteResult<ProcessingReport> {
        // Processing can run for minutes on large exports.
        return self.post("/api/process_data", None, None).await;
    }

    async fn processed_files(&self) -> RemoteResult<BTreeMap<String, Vec<String>>> {
        let body: serde_json::Value = self.get("/api/get_processed_files").await?;

        let mut files = BTreeMap::new();
        if let serde_json::Value::Object(map) = body {
            for (source, names) in map {
                if let serde_json::Value::Array(names) = names {
                    let names = names
                        .iter()
                        .filter_map(|name| return name.as_str().map(str::to_string))
                        .collect();
                    files.insert(source, names);
                }
            }
        }

        return Ok(files);
    }

    async fn clear_uploaded_files(&self) -> RemoteResult<Acknowledgement> {
        return self
            .post("/api/clear_uploaded_files", None, Some(self.request_timeout))
            .await;
    }
}

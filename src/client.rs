use crate::models::{Alarm, AlarmDraft, AlarmIdBody, ErrorBody};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error("empty response from server")]
    EmptyResponse,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::EmptyResponse => None,
        }
    }
}

pub trait AlarmApi: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<Alarm>, ClientError>> + Send;

    fn create(&self, draft: &AlarmDraft) -> impl Future<Output = Result<i64, ClientError>> + Send;

    fn update(&self, alarm: &Alarm) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn remove(&self, id: i64) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Option<serde_json::Value>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let json = serde_json::from_slice::<serde_json::Value>(&bytes).ok();
        debug!(%status, body_len = bytes.len(), "api response");

        if !status.is_success() {
            return Err(error_from_body(status, json));
        }
        Ok(json)
    }

    async fn send_for<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let json = self.send(request).await?.ok_or(ClientError::EmptyResponse)?;
        serde_json::from_value(json).map_err(|_| ClientError::EmptyResponse)
    }
}

fn error_from_body(status: StatusCode, json: Option<serde_json::Value>) -> ClientError {
    let message = json
        .and_then(|value| serde_json::from_value::<ErrorBody>(value).ok())
        .map(|body| body.error)
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"));
    ClientError::Http { status, message }
}

impl AlarmApi for ApiClient {
    async fn list(&self) -> Result<Vec<Alarm>, ClientError> {
        self.send_for(self.http.get(self.url("/api/alarm"))).await
    }

    async fn create(&self, draft: &AlarmDraft) -> Result<i64, ClientError> {
        let body: AlarmIdBody = self
            .send_for(self.http.post(self.url("/api/alarm")).json(draft))
            .await?;
        Ok(body.id)
    }

    async fn update(&self, alarm: &Alarm) -> Result<(), ClientError> {
        self.send(self.http.put(self.url("/api/alarm")).json(alarm))
            .await
            .map(drop)
    }

    async fn remove(&self, id: i64) -> Result<(), ClientError> {
        self.send(self.http.delete(self.url("/api/alarm")).json(&AlarmIdBody { id }))
            .await
            .map(drop)
    }

    async fn stop(&self) -> Result<(), ClientError> {
        self.send(self.http.get(self.url("/api/stop"))).await.map(drop)
    }
}

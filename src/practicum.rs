use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use tracing::{info, instrument};

use crate::error::{BotError, BotResult};
use crate::model::{Homework, HomeworkStatus};

/// Source of homework status payloads.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch the raw JSON payload for everything updated since `timestamp`.
    async fn get_api_answer(&self, timestamp: i64) -> BotResult<Value>;
}

#[derive(Clone)]
pub struct PracticumClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    pub fn new(endpoint: Url, token: String) -> reqwest::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("homework-watchbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Human readable request description for logs and error reports.
    /// The token is never included.
    fn describe(&self, timestamp: i64) -> String {
        format!(
            "GET {}, Authorization: OAuth [REDACTED], from_date={}",
            self.endpoint, timestamp
        )
    }
}

pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    #[instrument(skip_all)]
    async fn get_api_answer(&self, timestamp: i64) -> BotResult<Value> {
        let timestamp = if timestamp == 0 {
            now_timestamp()
        } else {
            timestamp
        };
        let request = self.describe(timestamp);
        info!(%request, "requesting homework statuses");

        let transport = |err: reqwest::Error, status: Option<StatusCode>| BotError::InvalidResponse {
            request: request.clone(),
            status: status.map(|s| s.as_u16()),
            reason: err.to_string(),
            body: String::new(),
        };

        let res = self
            .http
            .get(self.endpoint.clone())
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", timestamp)])
            .send()
            .await
            .map_err(|e| transport(e, None))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| transport(e, Some(status)))?;
        if status != StatusCode::OK {
            return Err(BotError::InvalidResponse {
                request,
                status: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| BotError::InvalidResponse {
            request,
            status: Some(status.as_u16()),
            reason: format!("invalid JSON: {e}"),
            body: text,
        })
    }
}

/// Validate the payload shape and hand back the `homeworks` list.
#[instrument(skip_all)]
pub fn check_response(response: &Value) -> BotResult<&Vec<Value>> {
    info!("checking API response shape");
    let map = response.as_object().ok_or(BotError::NotAMapping)?;
    if !map.contains_key("homeworks") {
        return Err(BotError::EmptyResponse("homeworks"));
    }
    if !map.contains_key("current_date") {
        return Err(BotError::EmptyResponse("current_date"));
    }
    map["homeworks"].as_array().ok_or(BotError::NotAList)
}

/// Turn one homework record into the chat message announcing its status.
///
/// Membership in the verdict table is checked before the lookup, so an
/// unexpected status yields [`BotError::UnknownStatus`] naming the value.
#[instrument(skip_all)]
pub fn parse_status(homework: &Value) -> BotResult<String> {
    info!("extracting homework status");
    let name = homework
        .get("homework_name")
        .ok_or(BotError::MissingKey("homework_name"))?;
    let status = homework
        .get("status")
        .ok_or(BotError::MissingKey("status"))?;
    let name = name.as_str().ok_or(BotError::WrongType("homework_name"))?;
    let status = status.as_str().ok_or(BotError::WrongType("status"))?;
    let status =
        HomeworkStatus::parse(status).ok_or_else(|| BotError::UnknownStatus(status.to_string()))?;

    Ok(Homework {
        homework_name: name.to_string(),
        status,
    }
    .status_message())
}

//! HTTP gateway to the remote policy chatbot backend.
//!
//! The backend's response shape has drifted between deployments (`answer`
//! vs `response`, several `remaining_docs` entry shapes), so everything
//! is normalized into [`NormalizedAnswer`] here and the rest of the app
//! never sees the raw wire format.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Shown when the body carries neither `answer` nor `response`.
pub const NO_ANSWER_FALLBACK: &str = "[오류] 답변이 없습니다.";
/// Shown as an assistant message when the backend cannot be reached.
pub const UNREACHABLE_FALLBACK: &str = "[오류] 서버와 통신할 수 없습니다.";
/// Placeholder title for related documents without a usable name.
const DOC_TITLE_FALLBACK: &str = "정책 정보";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("backend returned HTTP {0}")]
    BackendUnavailable(u16),
    #[error("could not reach the chatbot backend")]
    NetworkUnreachable,
}

/// Canonical gateway output, regardless of which raw shape was received.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnswer {
    pub text: String,
    pub documents: Vec<RelatedDocument>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedDocument {
    pub title: String,
    pub url: Option<String>,
}

/// Raw `/chat` response body as observed from the deployed backends.
#[derive(Debug, Deserialize)]
pub struct RawChatResponse {
    pub answer: Option<String>,
    pub response: Option<String>,
    #[serde(default)]
    pub remaining_docs: Vec<RawDoc>,
}

/// One `remaining_docs` entry. The backend sends either a bare string
/// (category/id/content excerpt) or an object with some subset of
/// title/name/url fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawDoc {
    Title(String),
    Object {
        title: Option<String>,
        name: Option<String>,
        url: Option<String>,
    },
}

impl RelatedDocument {
    fn from_raw(raw: RawDoc) -> Self {
        match raw {
            RawDoc::Title(title) => Self { title, url: None },
            RawDoc::Object { title, name, url } => Self {
                title: title
                    .or(name)
                    .unwrap_or_else(|| DOC_TITLE_FALLBACK.to_string()),
                // the backend sends url: "" when no link was extracted
                url: url.filter(|u| !u.is_empty()),
            },
        }
    }
}

/// Normalize a raw body into the gateway's canonical output.
pub fn normalize(raw: RawChatResponse) -> NormalizedAnswer {
    let text = raw
        .answer
        .or(raw.response)
        .unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string());
    let documents = raw
        .remaining_docs
        .into_iter()
        .map(RelatedDocument::from_raw)
        .collect();
    NormalizedAnswer { text, documents }
}

/// Sends one request per user turn to the backend `/chat` endpoint.
#[derive(Debug)]
pub struct BackendGateway {
    client: reqwest::Client,
    base_url: String,
}

impl BackendGateway {
    pub fn new(base_url: String) -> color_eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Exchange one user turn for a normalized answer.
    pub async fn send_turn(
        &self,
        session_id: &str,
        user_message: &str,
    ) -> Result<NormalizedAnswer, GatewayError> {
        let payload = serde_json::json!({
            "session_id": session_id,
            "user_message": user_message,
        });

        let url = format!("{}/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("chat request failed: {e}");
                GatewayError::NetworkUnreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("backend returned HTTP {status}");
            return Err(GatewayError::BackendUnavailable(status.as_u16()));
        }

        // An unparseable body means the exchange never completed usefully,
        // same as a dropped connection from the caller's point of view.
        let raw: RawChatResponse = response.json().await.map_err(|e| {
            tracing::warn!("could not decode chat response: {e}");
            GatewayError::NetworkUnreachable
        })?;

        Ok(normalize(raw))
    }
}

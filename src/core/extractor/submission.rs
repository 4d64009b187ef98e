//! Character Submission
//!
//! The single outbound call made by the extractor: "create character" with the
//! finalized sheet. [`CharacterSink`] is the seam; [`HttpCharacterClient`] posts
//! JSON to the game's REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{Ability, Rank, Role, SpiritKind};
use crate::config::ApiConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by server{}: {message}", status_suffix(.status))]
    Rejected { status: Option<u16>, message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        SubmissionError::Transport(err.to_string())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of the "create character" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    pub name: String,
    pub role: Role,
    pub mental_rank: Rank,
    pub physical_rank: Rank,
    pub gold: u32,
    pub ability: Ability,
    pub spirit_name: String,
    pub spirit_type: SpiritKind,
}

/// Outcome of a "create character" call that the server accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCharacterResponse {
    pub success: bool,
    pub message: Option<String>,
    /// Server id of the new character, numeric ids rendered as text
    pub character_id: Option<String>,
}

impl CreateCharacterResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
            character_id: None,
        }
    }

    /// Read a 2xx body. Only an explicit `"success": false` is a failure;
    /// empty, non-JSON or oddly shaped bodies are accepted as they are.
    pub fn from_body(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return Self::accepted();
        };

        Self {
            success: value.get("success").and_then(|v| v.as_bool()).unwrap_or(true),
            message: value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            character_id: ["characterId", "id"]
                .iter()
                .find_map(|key| id_text(value.get(*key)?)),
        }
    }
}

fn id_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Default for CreateCharacterResponse {
    fn default() -> Self {
        Self::accepted()
    }
}

// ============================================================================
// Sink Trait
// ============================================================================

/// Destination for finalized sheets
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterSink: Send + Sync {
    /// Persist one character. Returns an error for transport failures and
    /// for any response that does not signal success.
    async fn create_character(
        &self,
        request: &CreateCharacterRequest,
    ) -> Result<CreateCharacterResponse, SubmissionError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// REST implementation of [`CharacterSink`]
pub struct HttpCharacterClient {
    client: Client,
    endpoint: String,
}

impl HttpCharacterClient {
    pub fn new(config: &ApiConfig) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.create_character_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CharacterSink for HttpCharacterClient {
    async fn create_character(
        &self,
        request: &CreateCharacterRequest,
    ) -> Result<CreateCharacterResponse, SubmissionError> {
        debug!(endpoint = %self.endpoint, name = %request.name, "Submitting character");

        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(status = status.as_u16(), %message, "Character creation rejected");
            return Err(SubmissionError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed = CreateCharacterResponse::from_body(&body);
        if !parsed.success {
            let message = parsed
                .message
                .clone()
                .unwrap_or_else(|| "server reported failure".to_string());
            warn!(status = status.as_u16(), %message, "Character creation reported failure");
            return Err(SubmissionError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        Ok(parsed)
    }
}

/// Pull a human-readable reason out of an error body
fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/*
 * Responsibility
 * - レスポンス envelope `{ "data": ..., "error": { "message": ... } }` の型
 * - success は data のみ、failure は error のみをシリアライズする
 * - 受信側はどちらのフィールドが欠けていても (null でも) 受け付ける
 */
use serde::{Deserialize, Serialize};

/// Standard wrapper around every API response body.
///
/// Only one of `data` / `error` is meaningful for a given exchange; the other
/// is omitted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    // Missing message deserializes as blank so callers can reject it uniformly.
    #[serde(default)]
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn with(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ApiError {
                message: message.into(),
            }),
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// The error message, if one is present and not blank.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.trim().is_empty())
    }
}

//! Response envelope shared by every endpoint

use serde::{Deserialize, Serialize};

/// `{ message, data, status, timestamp }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default = "Option::default")]
    pub data: Option<T>,

    #[serde(default, deserialize_with = "super::de::lenient_status")]
    pub status: Option<u16>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Server message, ignoring empty strings
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Error body; the backend uses `message`, Spring's default handler `error`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ApiErrorBody {
    /// Extracts the backend's message from a raw response body, if it has one.
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .map(|parsed| parsed.message)
            .filter(|message| !message.trim().is_empty())
    }
}

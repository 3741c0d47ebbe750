use serde::{Deserialize, Serialize};

/// Acknowledgement body shared by the action endpoints
///
/// Every endpoint replies with a message plus a boolean error indicator.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub message: String,
    pub error: bool,
}

impl ActionResponse {
    /// Successful acknowledgement
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
        }
    }
}

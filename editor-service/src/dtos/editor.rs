use serde::{Deserialize, Serialize};

/// Save notification posted by the document server.
///
/// `url` and `key` are only present for statuses that carry a document to
/// persist; their absence is validated by the save pipeline, not here.
#[derive(Debug, Deserialize)]
pub struct CallbackPayload {
    #[serde(default)]
    pub status: i32,
    pub url: Option<String>,
    pub key: Option<String>,
}

/// In-band acknowledgment the document server expects.
///
/// The callback endpoint always answers HTTP 200; failures are reported in
/// the body because the document server retries on its own schedule and has
/// no use for transport-level error statuses.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackAck {
    pub error: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CallbackAck {
    pub fn ok() -> Self {
        Self {
            error: 0,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: 1,
            message: Some(message.into()),
        }
    }
}

/// Response of the token endpoint: the signed session descriptor plus the
/// proxied access URL the editor widget should load the document from.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTicket {
    pub token: String,
    pub access_url: String,
}

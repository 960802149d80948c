use serde::Deserialize;
use serde_json::Value;

/// Standard registry response envelope.
///
/// Every endpoint wraps its payload in `result` and carries request metadata
/// in `params`. Error responses reuse the same envelope with `params.status`
/// holding a machine-readable code and `params.errmsg` the display text.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub params: Option<ResponseParams>,
    #[serde(default)]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errmsg: Option<String>,
}

impl ResponseEnvelope {
    /// Error code carried by this envelope, if any.
    pub fn status_code(&self) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.status.as_deref())
    }

    /// Human-readable error message carried by this envelope, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.errmsg.as_deref())
    }
}

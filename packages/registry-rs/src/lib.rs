//! Thin HTTP client for the portal registry API.
//!
//! Covers the three endpoints the contact-verification flow talks to: user
//! lookup by identifier key, OTP generation, and tenant branding info. All
//! payloads travel in the registry's standard envelope (see [`models`]).

pub mod models;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::ResponseEnvelope;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry answered with a structured error envelope.
    #[error("registry error {code}: {message}")]
    Api { code: String, message: String },

    /// The request never produced a usable response.
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the envelope contract.
    #[error("unexpected registry response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Base URL of the registry, e.g. `https://portal.example.org`.
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RegistryService {
    options: RegistryOptions,
    client: Client,
}

impl RegistryService {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    /// Look up a user by identifier key (`"<type>/<value>"`, e.g.
    /// `"phone/9876543210"`).
    ///
    /// Returns the raw profile object from `result.response`. The registry
    /// reports "no such user" as an empty object rather than a 404, so an
    /// empty map is a valid, successful answer.
    pub async fn get_user_by_key(&self, key: &str) -> Result<Value, RegistryError> {
        let url = format!("{}/v1/user/get/{}", self.options.base_url, key);

        let response = self.client.get(&url).send().await?;
        let envelope = Self::unwrap_envelope(response).await?;

        let profile = envelope
            .result
            .and_then(|mut result| result.get_mut("response").map(Value::take))
            .unwrap_or_else(|| json!({}));
        Ok(profile)
    }

    /// Ask the registry to generate and deliver an OTP for the given
    /// identifier. `kind` is the wire slug, `"phone"` or `"email"`.
    pub async fn generate_otp(&self, key: &str, kind: &str) -> Result<(), RegistryError> {
        let url = format!("{}/v1/otp/generate", self.options.base_url);
        let body = json!({
            "request": {
                "key": key,
                "type": kind,
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;
        Self::unwrap_envelope(response).await?;
        Ok(())
    }

    /// Fetch tenant branding info (`result` object with `logo`,
    /// `titleName`, ...).
    pub async fn tenant_info(&self) -> Result<Value, RegistryError> {
        let url = format!("{}/v1/tenant/info", self.options.base_url);

        let response = self.client.get(&url).send().await?;
        let envelope = Self::unwrap_envelope(response).await?;

        envelope
            .result
            .ok_or_else(|| RegistryError::Malformed("tenant info carried no result".to_string()))
    }

    /// Decode the standard envelope, converting error responses into
    /// [`RegistryError::Api`] with the server's code and message.
    async fn unwrap_envelope(
        response: reqwest::Response,
    ) -> Result<ResponseEnvelope, RegistryError> {
        let status = response.status();
        let body = response.text().await?;
        let envelope: Option<ResponseEnvelope> = serde_json::from_str(&body).ok();

        if status.is_success() {
            return envelope.ok_or_else(|| {
                RegistryError::Malformed(format!("undecodable success body: {}", body))
            });
        }

        let envelope = envelope.unwrap_or(ResponseEnvelope {
            params: None,
            result: None,
        });
        Err(RegistryError::Api {
            code: envelope
                .status_code()
                .unwrap_or("SERVER_ERROR")
                .to_string(),
            message: envelope
                .error_message()
                .unwrap_or(status.as_str())
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_surfaces_error_params() {
        let body = r#"{
            "params": { "status": "PHONE_ALREADY_IN_USE", "errmsg": "Phone already in use" },
            "result": {}
        }"#;
        let envelope: ResponseEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.status_code(), Some("PHONE_ALREADY_IN_USE"));
        assert_eq!(envelope.error_message(), Some("Phone already in use"));
    }

    #[test]
    fn envelope_tolerates_missing_params() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{ "result": { "response": {} } }"#).unwrap();
        assert_eq!(envelope.status_code(), None);
        assert!(envelope.result.is_some());
    }
}

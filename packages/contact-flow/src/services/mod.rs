//! Collaborator seams for the contact verification flow.
//!
//! The flow only ever talks to three remote contracts: a user lookup, an OTP
//! issuer and a tenant info provider. Everything here is transport-agnostic;
//! [`registry`](crate::services::registry) adapts the portal registry client
//! onto these traits.

pub mod registry;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::flow::form::IdentifierKind;

/// Account disallowed from further OTP issuance.
pub const USER_ACCOUNT_BLOCKED: &str = "USER_ACCOUNT_BLOCKED";
/// Phone already belongs to a different account.
pub const PHONE_ALREADY_IN_USE: &str = "PHONE_ALREADY_IN_USE";
/// Email already belongs to a different account.
pub const EMAIL_IN_USE: &str = "EMAIL_IN_USE";
/// Too many OTP requests for this identifier.
pub const ERROR_RATE_LIMIT_EXCEEDED: &str = "ERROR_RATE_LIMIT_EXCEEDED";

/// Structured remote failure. The flow's logic dispatches on `code` only;
/// `message` is display copy supplied by the server.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Profile of an already-registered user.
///
/// The registry returns free-form profile documents; only the id is given a
/// type, the rest rides along untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub fields: Map<String, Value>,
}

impl UserProfile {
    /// Decode a raw profile object. The registry reports "no such user" as
    /// an empty object, which maps to `None`; so does any document without a
    /// usable id.
    pub fn from_value(profile: Value) -> Option<Self> {
        let Value::Object(fields) = profile else {
            return None;
        };
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        Some(Self { id, fields })
    }
}

/// Tenant branding read once during initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantData {
    pub logo: Option<String>,
    pub title_name: Option<String>,
}

/// Payload of an OTP generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRequest {
    pub key: String,
    pub kind: IdentifierKind,
}

#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Look up a user by `"<kind>/<value>"` key. `Ok(None)` means the
    /// identifier is not registered.
    async fn get_user_by_key(&self, key: &str) -> Result<Option<UserProfile>, ApiError>;
}

#[async_trait]
pub trait OtpService: Send + Sync {
    /// Ask for an OTP challenge to be generated and delivered.
    async fn generate_otp(&self, request: &OtpRequest) -> Result<(), ApiError>;
}

#[async_trait]
pub trait TenantProvider: Send + Sync {
    async fn tenant_info(&self) -> Result<TenantData, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_profile_object_means_not_found() {
        assert_eq!(UserProfile::from_value(json!({})), None);
    }

    #[test]
    fn profile_without_id_means_not_found() {
        assert_eq!(
            UserProfile::from_value(json!({ "firstName": "Asha" })),
            None
        );
    }

    #[test]
    fn profile_with_id_decodes_and_keeps_extra_fields() {
        let id = "6d4da241-a31b-4041-bbdb-dd3a898b3f85";
        let profile =
            UserProfile::from_value(json!({ "id": id, "firstName": "Asha" })).unwrap();
        assert_eq!(profile.id, Uuid::parse_str(id).unwrap());
        assert_eq!(profile.fields.get("firstName"), Some(&json!("Asha")));
    }
}

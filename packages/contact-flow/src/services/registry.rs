//! Adapters from the portal registry client onto the flow's service traits.

use async_trait::async_trait;
use registry::{RegistryError, RegistryOptions, RegistryService};
use serde_json::Value;

use super::{
    ApiError, OtpRequest, OtpService, TenantData, TenantProvider, UserLookup, UserProfile,
};

/// Registry-backed implementation of all three collaborator traits.
#[derive(Debug, Clone)]
pub struct RegistryBackend {
    service: RegistryService,
}

impl RegistryBackend {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            service: RegistryService::new(options),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Api { code, message } => ApiError { code, message },
            RegistryError::Transport(inner) => {
                ApiError::new("CONNECTION_ERROR", inner.to_string())
            }
            RegistryError::Malformed(detail) => ApiError::new("INVALID_RESPONSE", detail),
        }
    }
}

#[async_trait]
impl UserLookup for RegistryBackend {
    async fn get_user_by_key(&self, key: &str) -> Result<Option<UserProfile>, ApiError> {
        let profile = self.service.get_user_by_key(key).await?;
        Ok(UserProfile::from_value(profile))
    }
}

#[async_trait]
impl OtpService for RegistryBackend {
    async fn generate_otp(&self, request: &OtpRequest) -> Result<(), ApiError> {
        self.service
            .generate_otp(&request.key, request.kind.slug())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TenantProvider for RegistryBackend {
    async fn tenant_info(&self) -> Result<TenantData, ApiError> {
        let info = self.service.tenant_info().await?;
        Ok(TenantData {
            logo: string_field(&info, "logo"),
            title_name: string_field(&info, "titleName"),
        })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

//! Contact verification flow.
//!
//! A user supplies a phone number or email; the flow validates it, checks
//! whether it already belongs to an account, requests an OTP challenge, and
//! on verified OTP success hands back a redirect target carrying the
//! verified identifier (or the existing user's id).

pub mod config;
pub mod error;
pub mod flow;
pub mod services;

pub use config::Config;
pub use error::FlowError;
pub use flow::driver::{FlowDriver, FlowHandle, DEBOUNCE_DELAY};
pub use flow::form::{ContactForm, IdentifierKind};
pub use flow::redirect::CONTACT_VERIFIED_PATH;
pub use flow::{ContactVerificationFlow, FlowState, OtpChallengeContext, SubmitOutcome};
pub use services::{
    ApiError, OtpRequest, OtpService, TenantData, TenantProvider, UserLookup, UserProfile,
};

//! The contact verification flow.
//!
//! Control runs linearly: raw input → validator → debounced existence check
//! → (submit enabled) → OTP challenge → external OTP entry → outcome
//! handling. The flow owns all of its mutable state; collaborators are
//! reached only through the traits in [`crate::services`].

pub mod driver;
pub mod events;
pub mod form;
pub mod messages;
pub mod redirect;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::services::{
    ApiError, OtpRequest, OtpService, TenantData, TenantProvider, UserLookup, UserProfile,
    USER_ACCOUNT_BLOCKED,
};
use form::{ContactForm, IdentifierKind};
use messages::{challenge_failure_message, messages_for};

/// Snapshot of the flow's user-visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowState {
    pub submit_enabled: bool,
    pub otp_visible: bool,
    pub user_blocked: bool,
}

/// Everything the OTP entry step needs, derived from the form and the
/// message catalog at challenge time. Discarded on reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallengeContext {
    pub kind: IdentifierKind,
    pub value: String,
    pub instructions: &'static str,
    pub retry_message: &'static str,
    pub wrong_otp_message: &'static str,
}

impl OtpChallengeContext {
    fn for_form(form: &ContactForm) -> Self {
        let messages = messages_for(form.kind);
        Self {
            kind: form.kind,
            value: form.value.clone(),
            instructions: messages.instructions,
            retry_message: messages.retry_message,
            wrong_otp_message: messages.wrong_otp_message,
        }
    }
}

/// Result of a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The OTP challenge was issued; the OTP step is now visible.
    ChallengeIssued(OtpChallengeContext),
    /// Issuance failed; `message` is ready for display. The form stays
    /// interactive and the OTP step stays hidden.
    Rejected { message: String },
    /// Submit was not available (validation pending, blocked account, or
    /// OTP step already visible). Nothing happened.
    Ignored,
}

/// State machine driving contact verification.
///
/// Lifecycle is explicit and two-phase: [`initialize`](Self::initialize)
/// loads static context, [`start`](Self::start) arms the reactive input
/// subscription. Input events are reported via
/// [`input_changed`](Self::input_changed); the existence check itself is
/// dispatched by the driver after the debounce delay, through
/// [`begin_lookup`](Self::begin_lookup) / [`apply_lookup`](Self::apply_lookup).
pub struct ContactVerificationFlow {
    form: ContactForm,
    user_details: Option<UserProfile>,
    user_blocked: bool,
    submit_enabled: bool,
    otp_visible: bool,
    armed: bool,
    tenant: Option<TenantData>,
    route_query: Vec<(String, String)>,
    // Bumped on every input change and reset; stale lookup responses are
    // recognized and discarded by comparing against it.
    generation: u64,
    users: Arc<dyn UserLookup>,
    otp: Arc<dyn OtpService>,
}

impl ContactVerificationFlow {
    pub fn new(
        users: Arc<dyn UserLookup>,
        otp: Arc<dyn OtpService>,
        route_query: Vec<(String, String)>,
    ) -> Self {
        Self {
            form: ContactForm::default(),
            user_details: None,
            user_blocked: false,
            submit_enabled: false,
            otp_visible: false,
            armed: false,
            tenant: None,
            route_query,
            generation: 0,
            users,
            otp,
        }
    }

    /// Phase one: load tenant branding. Reads the provider once; repeated
    /// calls and provider errors leave the stored value untouched.
    pub async fn initialize(&mut self, tenants: &dyn TenantProvider) {
        if self.tenant.is_some() {
            return;
        }
        match tenants.tenant_info().await {
            Ok(tenant) => self.tenant = Some(tenant),
            Err(err) => debug!("tenant info unavailable: {}", err),
        }
    }

    /// Phase two: arm the reactive input subscription. Called once the
    /// presentation layer is ready to emit input events.
    pub fn start(&mut self) {
        self.armed = true;
    }

    pub fn state(&self) -> FlowState {
        FlowState {
            submit_enabled: self.submit_enabled,
            otp_visible: self.otp_visible,
            user_blocked: self.user_blocked,
        }
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn tenant(&self) -> Option<&TenantData> {
        self.tenant.as_ref()
    }

    pub fn user_details(&self) -> Option<&UserProfile> {
        self.user_details.as_ref()
    }

    /// Record an input change.
    ///
    /// Submit is disabled until the next existence check completes. A fresh
    /// identifier clears the blocked flag and any stored profile. Returns
    /// `true` when the new value is valid and the armed flow wants a
    /// debounced existence check scheduled; invalid input never triggers a
    /// downstream call. Ignored entirely while the OTP step is visible.
    pub fn input_changed(&mut self, value: &str, kind: IdentifierKind) -> bool {
        if self.otp_visible {
            debug!("input change ignored while OTP step is visible");
            return false;
        }
        if value == self.form.value && kind == self.form.kind {
            return false;
        }

        self.user_blocked = false;
        self.user_details = None;
        self.form.value = value.to_string();
        self.form.kind = kind;
        self.generation += 1;
        self.submit_enabled = false;

        self.armed && self.form.is_valid()
    }

    /// Snapshot the pending existence check, if one should run now.
    /// Returns the generation to tag the response with plus the lookup key.
    pub fn begin_lookup(&self) -> Option<(u64, String)> {
        if !self.armed || self.otp_visible || !self.form.is_valid() {
            return None;
        }
        Some((self.generation, self.form.lookup_key()))
    }

    /// Handle to the user lookup service, for dispatching checks off the
    /// flow's own borrow.
    pub fn user_lookup(&self) -> Arc<dyn UserLookup> {
        Arc::clone(&self.users)
    }

    /// Apply the outcome of an existence check dispatched at `generation`.
    ///
    /// Responses for a superseded input are discarded outright, so a late
    /// arrival can neither grant submit nor set the blocked flag.
    pub fn apply_lookup(
        &mut self,
        generation: u64,
        result: Result<Option<UserProfile>, ApiError>,
    ) {
        if generation != self.generation || self.otp_visible {
            debug!(generation, current = self.generation, "discarding stale lookup response");
            return;
        }
        match result {
            Ok(profile) => {
                self.user_details = profile;
                self.submit_enabled = true;
            }
            Err(err) if err.code == USER_ACCOUNT_BLOCKED => {
                info!(key = %self.form.lookup_key(), "account blocked, submit stays disabled");
                self.user_blocked = true;
            }
            Err(err) => {
                // Fail open: a lookup error must not keep the user from
                // requesting an OTP.
                warn!("existence check failed ({}), proceeding anyway", err);
                self.submit_enabled = true;
            }
        }
    }

    /// Explicit submit. Issues at most one OTP generation request; retries
    /// are user-initiated re-submissions.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.submit_enabled || self.otp_visible {
            return SubmitOutcome::Ignored;
        }

        let request = OtpRequest {
            key: self.form.value.clone(),
            kind: self.form.kind,
        };
        match self.otp.generate_otp(&request).await {
            Ok(()) => {
                info!(kind = request.kind.slug(), "OTP challenge issued");
                let context = OtpChallengeContext::for_form(&self.form);
                self.otp_visible = true;
                // Input re-validation is suspended until the OTP step
                // resolves one way or the other.
                self.armed = false;
                SubmitOutcome::ChallengeIssued(context)
            }
            Err(err) => {
                warn!(code = %err.code, "OTP generation failed");
                SubmitOutcome::Rejected {
                    message: challenge_failure_message(&err),
                }
            }
        }
    }

    /// External OTP entry reported failure: hide the OTP step, reset the
    /// form to its empty phone default, then re-arm. The re-arm happens
    /// strictly after the reset so no check can race the stale value.
    pub fn otp_validation_failed(&mut self) {
        self.otp_visible = false;
        self.reset(IdentifierKind::Phone);
        self.armed = true;
    }

    /// External OTP entry reported success: build the redirect target for a
    /// full-document navigation.
    ///
    /// An existing user redirects with their id; a fresh identifier carries
    /// its kind and value instead. Empty values are dropped from the query.
    pub fn otp_validation_succeeded(&self) -> String {
        let query: Vec<(String, String)> = match &self.user_details {
            Some(profile) => vec![("userId".to_string(), profile.id.to_string())],
            None => vec![
                ("type".to_string(), self.form.kind.slug().to_string()),
                ("value".to_string(), self.form.value.clone()),
            ],
        };
        redirect::verified_redirect(&self.route_query, &query)
    }

    /// Reset the form and every per-identifier flag. Pending lookup
    /// responses become stale.
    pub fn reset(&mut self, kind: IdentifierKind) {
        self.submit_enabled = false;
        self.form.reset(kind);
        self.user_details = None;
        self.user_blocked = false;
        self.generation += 1;
    }
}

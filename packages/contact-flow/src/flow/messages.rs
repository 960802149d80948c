//! Static instruction and error copy, keyed by identifier kind.

use crate::flow::form::IdentifierKind;
use crate::services::{ApiError, EMAIL_IN_USE, ERROR_RATE_LIMIT_EXCEEDED, PHONE_ALREADY_IN_USE};

/// Fallback shown when OTP issuance fails with a code outside the allow-list.
pub const GENERIC_CHALLENGE_FAILURE: &str =
    "We could not send you a verification code. Please try again after some time.";

/// Copy shown around the OTP entry step for one identifier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSet {
    pub instructions: &'static str,
    pub retry_message: &'static str,
    pub wrong_otp_message: &'static str,
}

pub fn messages_for(kind: IdentifierKind) -> MessageSet {
    match kind {
        IdentifierKind::Phone => MessageSet {
            instructions: "Enter the OTP sent to your mobile number to verify it.",
            retry_message: "Unable to verify your mobile number. Please try again.",
            wrong_otp_message: "You have entered an incorrect OTP for your mobile number.",
        },
        IdentifierKind::Email => MessageSet {
            instructions: "Enter the OTP sent to your email address to verify it.",
            retry_message: "Unable to verify your email address. Please try again.",
            wrong_otp_message: "You have entered an incorrect OTP for your email address.",
        },
    }
}

/// Map an OTP-issuance failure to the message shown to the user.
///
/// Server copy is trusted verbatim only for the allow-listed codes; every
/// other code collapses to [`GENERIC_CHALLENGE_FAILURE`].
pub fn challenge_failure_message(err: &ApiError) -> String {
    match err.code.as_str() {
        PHONE_ALREADY_IN_USE | EMAIL_IN_USE | ERROR_RATE_LIMIT_EXCEEDED => err.message.clone(),
        _ => GENERIC_CHALLENGE_FAILURE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_listed_codes_surface_server_copy() {
        for code in [PHONE_ALREADY_IN_USE, EMAIL_IN_USE, ERROR_RATE_LIMIT_EXCEEDED] {
            let err = ApiError {
                code: code.to_string(),
                message: "server says no".to_string(),
            };
            assert_eq!(challenge_failure_message(&err), "server says no");
        }
    }

    #[test]
    fn unknown_codes_collapse_to_generic_copy() {
        let err = ApiError {
            code: "SOMETHING_ELSE".to_string(),
            message: "internal detail that must not leak".to_string(),
        };
        assert_eq!(challenge_failure_message(&err), GENERIC_CHALLENGE_FAILURE);
    }

    #[test]
    fn message_sets_differ_by_kind() {
        assert_ne!(
            messages_for(IdentifierKind::Phone),
            messages_for(IdentifierKind::Email)
        );
    }
}

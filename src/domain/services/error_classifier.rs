use serde::Serialize;

use crate::domain::DomainError;

/// Externally visible failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ConfigurationError,
    InvalidRequest,
    AuthenticationFailed,
    RateLimited,
    ProviderUnavailable,
    RequestRejected,
    ProviderError,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::ConfigurationError => 500,
            ErrorCode::InvalidRequest => 400,
            ErrorCode::AuthenticationFailed => 401,
            ErrorCode::RateLimited => 429,
            ErrorCode::ProviderUnavailable => 503,
            ErrorCode::RequestRejected => 400,
            ErrorCode::ProviderError => 502,
            ErrorCode::InternalError => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationError => "configuration_error",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::AuthenticationFailed => "authentication_failed",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::ProviderUnavailable => "provider_unavailable",
            ErrorCode::RequestRejected => "request_rejected",
            ErrorCode::ProviderError => "provider_error",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

/// A failure as the caller sees it: status, code and a sanitized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    #[serde(skip)]
    pub status: u16,
    pub code: ErrorCode,
    #[serde(rename = "detail")]
    pub message: String,
}

/// Map a failure onto the closed set of caller-facing outcomes.
///
/// Local faults (configuration, I/O, internal) only ever yield generic text;
/// their detail belongs in the log.
pub fn classify(error: &DomainError) -> ClassifiedError {
    let (code, message) = match error {
        DomainError::Configuration(_) => (
            ErrorCode::ConfigurationError,
            "The server configuration is invalid. Contact the administrator.".to_string(),
        ),
        DomainError::InvalidRequest(detail) => {
            (ErrorCode::InvalidRequest, format!("Invalid request: {detail}"))
        }
        DomainError::Authentication(_) => (
            ErrorCode::AuthenticationFailed,
            "Authentication with the completion provider failed. Check the API key.".to_string(),
        ),
        DomainError::RateLimited(_) => (
            ErrorCode::RateLimited,
            "The completion provider rate limit was reached. Wait a moment and try again."
                .to_string(),
        ),
        DomainError::Unavailable(_) => (
            ErrorCode::ProviderUnavailable,
            "Could not connect to the completion provider. Check the network and try again."
                .to_string(),
        ),
        DomainError::Rejected(detail) => {
            (ErrorCode::RequestRejected, format!("Request rejected: {detail}"))
        }
        DomainError::Provider(detail) => (
            ErrorCode::ProviderError,
            format!("Completion provider error: {detail}"),
        ),
        DomainError::IoError(_) | DomainError::Internal(_) => (
            ErrorCode::InternalError,
            "An unexpected server error occurred.".to_string(),
        ),
    };

    ClassifiedError {
        status: code.status(),
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_maps_to_401() {
        let classified = classify(&DomainError::authentication("invalid api key gsk_abc"));
        assert_eq!(classified.status, 401);
        assert_eq!(classified.code, ErrorCode::AuthenticationFailed);
        assert!(!classified.message.contains("gsk_abc"));
    }

    #[test]
    fn transient_failures_are_distinguished() {
        assert_eq!(classify(&DomainError::rate_limited("slow down")).status, 429);
        assert_eq!(classify(&DomainError::unavailable("refused")).status, 503);
    }

    #[test]
    fn rejection_carries_provider_reason() {
        let classified = classify(&DomainError::rejected("model `nope` does not exist"));
        assert_eq!(classified.status, 400);
        assert!(classified.message.contains("model `nope` does not exist"));
    }

    #[test]
    fn local_faults_never_leak_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "/etc/secret unreadable");
        let classified = classify(&DomainError::from(io));
        assert_eq!(classified.code, ErrorCode::InternalError);
        assert!(!classified.message.contains("secret"));

        let config = classify(&DomainError::configuration("main_chat section missing in /srv/cfg"));
        assert_eq!(config.status, 500);
        assert!(!config.message.contains("/srv/cfg"));
    }

    #[test]
    fn serializes_detail_and_code() {
        let body = serde_json::to_value(classify(&DomainError::provider("boom"))).unwrap();
        assert_eq!(body["code"], "provider_error");
        assert_eq!(body["detail"], "Completion provider error: boom");
        assert!(body.get("status").is_none());
    }
}

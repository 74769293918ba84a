use thiserror::Error;

use crate::parsing::ExtractionError;
use crate::services::BackendError;

/// Everything that can go wrong turning an utterance into food items.
/// Nothing else crosses the parser boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing or invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend credential is not configured")]
    Configuration,

    #[error("{}", upstream_message(.status))]
    Upstream {
        status: Option<u16>,
        details: String,
    },

    #[error("Could not parse food data from AI response. Please try again or rephrase your input.")]
    ExtractionFailure,

    #[error("No foods found in response")]
    NoFoodsFound,
}

impl ParseError {
    /// Short machine-oriented reason, stable across releases.
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::InvalidInput(_) => "invalid_input",
            ParseError::Configuration => "missing_credential",
            ParseError::Upstream { .. } => "upstream_error",
            ParseError::ExtractionFailure => "unparseable_reply",
            ParseError::NoFoodsFound => "no_foods_found",
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            ParseError::Upstream { details, .. } => Some(details.as_str()),
            _ => None,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ParseError::InvalidInput(_) => 400,
            ParseError::Configuration => 500,
            ParseError::Upstream { .. } | ParseError::ExtractionFailure => 502,
            ParseError::NoFoodsFound => 422,
        }
    }

    /// Only bad input is fixable by the caller; the rest may succeed on retry
    /// or need an operator.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ParseError::InvalidInput(_))
    }
}

fn upstream_message(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("Text-generation backend error (status {})", code),
        None => "Text-generation backend error".to_string(),
    }
}

impl From<BackendError> for ParseError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::MissingCredential => ParseError::Configuration,
            BackendError::Status { status, body } => ParseError::Upstream {
                status: Some(status),
                details: body,
            },
            BackendError::Transport(details) | BackendError::MalformedEnvelope(details) => {
                ParseError::Upstream {
                    status: None,
                    details,
                }
            }
        }
    }
}

impl From<ExtractionError> for ParseError {
    fn from(_: ExtractionError) -> Self {
        ParseError::ExtractionFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_are_distinct() {
        let errors = [
            ParseError::InvalidInput("empty".to_string()),
            ParseError::Configuration,
            ParseError::Upstream { status: Some(500), details: "boom".to_string() },
            ParseError::ExtractionFailure,
            ParseError::NoFoodsFound,
        ];
        let mut reasons: Vec<&str> = errors.iter().map(ParseError::reason).collect();
        reasons.sort();
        reasons.dedup();

        assert_eq!(reasons.len(), errors.len());
    }

    #[test]
    fn test_backend_error_mapping() {
        assert_eq!(ParseError::from(BackendError::MissingCredential), ParseError::Configuration);

        let err = ParseError::from(BackendError::Status {
            status: 429,
            body: "rate limited".to_string(),
        });
        assert_eq!(err.reason(), "upstream_error");
        assert_eq!(err.details(), Some("rate limited"));
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "Text-generation backend error (status 429)");

        let err = ParseError::from(BackendError::Transport("connection refused".to_string()));
        assert_eq!(
            err,
            ParseError::Upstream { status: None, details: "connection refused".to_string() }
        );
    }

    #[test]
    fn test_configuration_is_not_a_caller_error() {
        assert!(ParseError::InvalidInput("x".to_string()).is_caller_error());
        assert!(!ParseError::Configuration.is_caller_error());
        assert_eq!(ParseError::Configuration.status_code(), 500);
        assert_eq!(ParseError::InvalidInput("x".to_string()).status_code(), 400);
    }
}

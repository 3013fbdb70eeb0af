//! Error types and handling for the travel agent tools
//!
//! Two families live here. [`TravelAgentError`] covers setup problems
//! (configuration, HTTP client construction, logging) and is returned as a
//! normal `Result`. [`ToolError`] is the per-call failure taxonomy; it never
//! leaves a tool as an `Err`, its message becomes the `"error"` entry of the
//! tool result instead.

use thiserror::Error;

/// Main error type for setting up the tools
#[derive(Error, Debug)]
pub enum TravelAgentError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP client construction errors
    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// Tracing subscriber installation errors
    #[error("Logging error: {message}")]
    Logging { message: String },
}

impl TravelAgentError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new logging error
    pub fn logging<S: Into<String>>(message: S) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelAgentError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            TravelAgentError::Http { .. } => {
                "Unable to set up the HTTP client for external services.".to_string()
            }
            TravelAgentError::Logging { message } => message.clone(),
        }
    }
}

/// Failure categories a tool call can end in.
///
/// `Display` is the exact text handed back to the agent host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A required argument was absent or blank
    #[error("{0}")]
    MissingInput(String),

    /// Free text could not be mapped to an airport code
    #[error(
        "Could not determine a valid airport code for '{location}'. Please ask the user to provide a 3-letter airport code (e.g., LHR, BCN)."
    )]
    UnresolvedLocation { location: String },

    /// A date argument matched none of the accepted formats
    #[error(
        "Failed to convert one or more dates to the required YYYY-MM-DD format. Please ask the user to provide a simple date format (e.g., 'October 12, 2025')."
    )]
    InvalidDate { input: String },

    /// The upstream API answered with a 4xx status
    #[error("{0}")]
    UpstreamRejected(String),

    /// Network failure, 5xx status or an undecodable body
    #[error("{0}")]
    Transport(String),

    /// The encyclopedia has no page for the query
    #[error("Could not find a Wikipedia page for '{query}'. Please try a different name.")]
    NotFound { query: String },

    /// The query hit a disambiguation page and the fallback failed
    #[error("{}", ambiguous_message(.query, .candidates))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },

    /// Anything else, with the underlying cause
    #[error("An unexpected error occurred while fetching information: {0}")]
    Unexpected(String),
}

impl ToolError {
    pub fn missing<S: Into<String>>(message: S) -> Self {
        Self::MissingInput(message.into())
    }
}

fn ambiguous_message(query: &str, candidates: &[String]) -> String {
    if candidates.is_empty() {
        format!(
            "Multiple matches found for '{query}', but unable to resolve. Please try a more specific query."
        )
    } else {
        format!(
            "Multiple matches found for '{query}' (e.g., {}), but unable to resolve. Please try a more specific query.",
            candidates.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TravelAgentError::config("missing API key");
        assert!(matches!(config_err, TravelAgentError::Config { .. }));

        let logging_err = TravelAgentError::logging("already installed");
        assert!(matches!(logging_err, TravelAgentError::Logging { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TravelAgentError::config("bad url");
        assert!(config_err.user_message().contains("Configuration error"));
        assert!(config_err.user_message().contains("bad url"));

        let logging_err = TravelAgentError::logging("subscriber already set");
        assert_eq!(logging_err.user_message(), "subscriber already set");
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = ToolError::Ambiguous {
            query: "Mercury".to_string(),
            candidates: vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Multiple matches found for 'Mercury' (e.g., Mercury (planet), Mercury (element)), but unable to resolve. Please try a more specific query."
        );
    }

    #[test]
    fn test_ambiguous_message_without_candidates() {
        let err = ToolError::Ambiguous {
            query: "Mercury".to_string(),
            candidates: Vec::new(),
        };
        assert!(err.to_string().starts_with("Multiple matches found for 'Mercury', but"));
    }

    #[test]
    fn test_unresolved_location_names_input() {
        let err = ToolError::UnresolvedLocation {
            location: "Atlantis".to_string(),
        };
        assert!(err.to_string().contains("'Atlantis'"));
        assert!(err.to_string().contains("3-letter airport code"));
    }
}

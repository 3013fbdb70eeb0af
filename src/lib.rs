//! Travel agent tools
//!
//! Callback functions an LLM agent host can expose to a conversational travel
//! assistant: flight and hotel search, destination descriptions and booking
//! links. The host owns the model and the dialogue; this crate only turns
//! tool calls into validated upstream requests and JSON results.

pub mod booking;
pub mod config;
pub mod dates;
pub mod description;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod search;
pub mod tools;

// Re-export core types for public API
pub use booking::{BookingLink, BookingLinkBuilder};
pub use config::TravelAgentConfig;
pub use dates::{DateParseError, normalize_date};
pub use description::{DescriptionClient, Encyclopedia, LookupError, WikipediaClient};
pub use error::{ToolError, TravelAgentError};
pub use location_resolver::{LocationResolver, ResolvedLocation};
pub use search::{SearchClient, SearchParameters, SearchTransport, SerpApiTransport, TransportError};
pub use tools::{ToolDefinition, ToolResult, TravelTools};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelAgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

//! Booking deep links
//!
//! Nothing is booked here; the link sends the user to an external site where
//! they pick dates and pay.

use serde::Serialize;

use crate::config::BookingConfig;
use crate::error::ToolError;

pub const BOOKING_INSTRUCTIONS: &str = "Please note that the user will need to select the dates and complete the booking process on the external site.";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookingLink {
    pub booking_url: String,
    pub instructions: String,
}

pub struct BookingLinkBuilder {
    base_url: String,
}

impl BookingLinkBuilder {
    #[must_use]
    pub fn new(config: &BookingConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the link for a carrier + flight number code such as `BA-452`.
    /// The code is not checked against any schedule.
    pub fn build(&self, flight_code: Option<&str>) -> Result<BookingLink, ToolError> {
        let Some(code) = flight_code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Err(ToolError::missing(
                "A flight code is required to generate the booking link.",
            ));
        };

        Ok(BookingLink {
            booking_url: format!("{}/code/{}", self.base_url, urlencoding::encode(code)),
            instructions: BOOKING_INSTRUCTIONS.to_string(),
        })
    }
}

impl Default for BookingLinkBuilder {
    fn default() -> Self {
        Self::new(&BookingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_link_for_flight_code() {
        let link = BookingLinkBuilder::default().build(Some("BA-452")).unwrap();
        assert_eq!(link.booking_url, "https://www.airpaz.com/en/flight/code/BA-452");
        assert!(link.booking_url.ends_with("/code/BA-452"));
        assert_eq!(link.instructions, BOOKING_INSTRUCTIONS);
    }

    #[test]
    fn test_empty_code_is_an_error() {
        let builder = BookingLinkBuilder::default();
        for code in [None, Some(""), Some("   ")] {
            let err = builder.build(code).unwrap_err();
            assert!(matches!(err, ToolError::MissingInput(_)));
            assert!(err.to_string().contains("flight code is required"));
        }
    }

    #[test]
    fn test_code_is_path_encoded() {
        let link = BookingLinkBuilder::default().build(Some("BA 452")).unwrap();
        assert!(link.booking_url.ends_with("/code/BA%20452"));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let builder = BookingLinkBuilder::new(&BookingConfig {
            base_url: "https://booking.example.com/flight/".to_string(),
        });
        let link = builder.build(Some("LH-1")).unwrap();
        assert_eq!(link.booking_url, "https://booking.example.com/flight/code/LH-1");
    }
}

//! Location Resolution Module
//!
//! This module maps free-text origins and destinations (city names, airport
//! names or ready-made codes) onto the 3-letter airport codes the flight
//! search expects.

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

/// Lowercase city/airport name to airport code, built once per process
static AIRPORT_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("london heathrow", "LHR"),
        ("london gatwick", "LGW"),
        ("london luton", "LTN"),
        ("barcelona", "BCN"),
        ("chicago", "ORD"),
        ("new york", "JFK"),
        ("paris", "CDG"),
        ("tokyo", "NRT"),
        ("bucharest", "OTP"),
        ("belgrade", "BEG"),
        ("abu dhabi", "AUH"),
        ("berlin", "BER"),
        ("warsaw", "WAW"),
        ("krakow", "KRK"),
        ("astana", "NQZ"),
        ("beijing", "PEK"),
        ("austin", "AUS"),
        ("ljubljana", "LJU"),
        ("rome", "FCO"),
        ("athens", "ATH"),
        ("hong kong", "HKG"),
        ("montreal", "YUL"),
        ("sydney", "SYD"),
        ("auckland", "AKL"),
        ("marrakech", "RAK"),
        ("doha", "DOH"),
        ("cape town", "CPT"),
        ("gdansk", "GDN"),
        ("riga", "RIX"),
        ("vilnius", "VNO"),
        ("tallinn", "TLL"),
        ("helsinki", "HEL"),
        ("sibiu", "SBZ"),
        ("vienna", "VIE"),
        ("shanghai", "PVG"),
        ("dubai", "DXB"),
        ("singapore", "SIN"),
        ("frankfurt", "FRA"),
        ("madrid", "MAD"),
        ("lisbon", "LIS"),
        ("mexico city", "MEX"),
        ("buenos aires", "EZE"),
        ("rio de janeiro", "GIG"),
        ("cairo", "CAI"),
    ]
    .into_iter()
    .collect()
});

/// Outcome of resolving a location string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation {
    /// A 3-letter airport code
    Code(String),
    /// No code could be found; carries the caller's text unchanged
    Unresolved(String),
}

impl ResolvedLocation {
    /// The airport code, if resolution succeeded
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            ResolvedLocation::Code(code) => Some(code),
            ResolvedLocation::Unresolved(_) => None,
        }
    }

}

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a location input into an airport code.
    ///
    /// Anything that already looks like a code (three letters) is trusted and
    /// upper-cased without consulting the table; it is not checked against a
    /// real airport registry.
    pub fn resolve(location: &str) -> ResolvedLocation {
        let normalized = location.trim().to_lowercase();

        let resolved = if looks_like_airport_code(&normalized) {
            ResolvedLocation::Code(normalized.to_uppercase())
        } else {
            match Self::lookup(&normalized) {
                Some(code) => ResolvedLocation::Code(code.to_string()),
                None => ResolvedLocation::Unresolved(location.to_string()),
            }
        };

        debug!("Resolved location {:?} to {:?}", location, resolved);
        resolved
    }

    /// Look up a lowercase name in the static table
    fn lookup(name: &str) -> Option<&'static str> {
        AIRPORT_CODES.get(name).copied()
    }
}

fn looks_like_airport_code(normalized: &str) -> bool {
    normalized.len() == 3 && normalized.chars().all(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("LHR", "LHR")]
    #[case("lhr", "LHR")]
    #[case("  bcn ", "BCN")]
    #[case("london heathrow", "LHR")]
    #[case("London Heathrow", "LHR")]
    #[case("  Barcelona  ", "BCN")]
    #[case("Rio de Janeiro", "GIG")]
    #[case("new york", "JFK")]
    fn test_resolves_known_locations(#[case] input: &str, #[case] expected: &str) {
        let resolved = LocationResolver::resolve(input);
        assert_eq!(resolved, ResolvedLocation::Code(expected.to_string()));
        assert_eq!(resolved.code(), Some(expected));
    }

    #[test]
    fn test_unknown_location_round_trips() {
        let resolved = LocationResolver::resolve("Atlantis");
        assert_eq!(resolved, ResolvedLocation::Unresolved("Atlantis".to_string()));
        assert_eq!(resolved.code(), None);
    }

    #[test]
    fn test_three_letters_bypass_the_table() {
        // Not a real airport, but it looks like a code so it is trusted
        let resolved = LocationResolver::resolve("xyz");
        assert_eq!(resolved.code(), Some("XYZ"));
    }

    #[rstest]
    #[case("L1R")]
    #[case("LH")]
    #[case("Oslo")]
    fn test_code_like_but_invalid_inputs_stay_unresolved(#[case] input: &str) {
        assert_eq!(LocationResolver::resolve(input).code(), None);
    }

    #[test]
    fn test_table_is_loaded() {
        assert_eq!(AIRPORT_CODES.len(), 44);
        assert_eq!(LocationResolver::lookup("cairo"), Some("CAI"));
        assert_eq!(LocationResolver::lookup("Cairo"), None);
    }
}

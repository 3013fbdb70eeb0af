//! Flight and hotel search through SerpApi
//!
//! Both searches validate and normalize their inputs first, so bad input never
//! costs an API call. The transport is a trait so the parameter building and
//! error translation can be exercised without the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::SearchConfig;
use crate::dates::normalize_date_canonical;
use crate::error::ToolError;
use crate::location_resolver::{LocationResolver, ResolvedLocation};

/// The two SerpApi engines the tools use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Flights,
    Hotels,
}

impl SearchKind {
    #[must_use]
    pub fn engine(self) -> &'static str {
        match self {
            SearchKind::Flights => "google_flights",
            SearchKind::Hotels => "google_hotels",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SearchKind::Flights => "Flight",
            SearchKind::Hotels => "Hotel",
        }
    }
}

/// Query parameters for one search request, in insertion order.
///
/// Optional inputs that were not supplied are simply never pushed, so the
/// request carries no empty or null placeholders. The API key is added by
/// the transport and never appears here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParameters {
    pairs: Vec<(String, String)>,
}

impl SearchParameters {
    fn new(kind: SearchKind) -> Self {
        let mut params = Self::default();
        params.push("engine", kind.engine());
        params
    }

    pub fn push(&mut self, key: &str, value: impl ToString) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    pub fn push_opt(&mut self, key: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Transport-level failure of a search request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// No response was received at all
    #[error("{0}")]
    Connection(String),

    /// A response arrived but its body was not JSON
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("no SerpApi API key configured")]
    MissingApiKey,
}

impl TransportError {
    fn is_client_error(&self) -> bool {
        matches!(self, TransportError::Status { status, .. } if (400..500).contains(status))
    }
}

/// Something that can execute a search request and return the JSON body
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn get_json(&self, params: &SearchParameters) -> std::result::Result<Value, TransportError>;
}

/// SerpApi over HTTPS
pub struct SerpApiTransport {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SerpApiTransport {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("travel-agent-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl SearchTransport for SerpApiTransport {
    async fn get_json(&self, params: &SearchParameters) -> std::result::Result<Value, TransportError> {
        let api_key = self.api_key.as_deref().ok_or(TransportError::MissingApiKey)?;

        debug!("SerpApi request to {} with {:?}", self.base_url, params.pairs());

        let response = self
            .client
            .get(&self.base_url)
            .query(params.pairs())
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// A validated flight request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRequest {
    pub departure_id: String,
    pub arrival_id: String,
    pub params: SearchParameters,
}

/// Settings shared by every request
#[derive(Debug, Clone)]
struct Locale {
    language: String,
    region: String,
    currency: String,
}

/// Flight and hotel search client
pub struct SearchClient {
    transport: Arc<dyn SearchTransport>,
    locale: Locale,
}

impl SearchClient {
    /// Create a client talking to SerpApi
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let transport = SerpApiTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn SearchTransport>, config: &SearchConfig) -> Self {
        Self {
            transport,
            locale: Locale {
                language: config.language.clone(),
                region: config.region.clone(),
                currency: config.currency.clone(),
            },
        }
    }

    /// Validate flight inputs and assemble the request parameters
    pub fn flight_request(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
        departure_date: Option<&str>,
        return_date: Option<&str>,
    ) -> std::result::Result<FlightRequest, ToolError> {
        let (Some(origin), Some(destination)) = (non_blank(origin), non_blank(destination)) else {
            return Err(ToolError::missing(
                "Please provide both origin and destination airports or cities.",
            ));
        };

        let departure_id = airport_code(origin)?;
        let arrival_id = airport_code(destination)?;

        let outbound_date = normalize_date_canonical(departure_date).map_err(invalid_date)?;
        let return_date = normalize_date_canonical(return_date).map_err(invalid_date)?;

        let mut params = SearchParameters::new(SearchKind::Flights);
        self.push_locale(&mut params);
        params.push("departure_id", &departure_id);
        params.push("arrival_id", &arrival_id);
        params.push_opt("outbound_date", outbound_date);
        params.push_opt("return_date", return_date);

        Ok(FlightRequest {
            departure_id,
            arrival_id,
            params,
        })
    }

    /// Search flights between two locations
    #[instrument(skip(self))]
    pub async fn search_flights(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
        departure_date: Option<&str>,
        return_date: Option<&str>,
    ) -> std::result::Result<Value, ToolError> {
        let request = self.flight_request(origin, destination, departure_date, return_date)?;
        info!(
            "Searching flights {} -> {}",
            request.departure_id, request.arrival_id
        );

        self.transport
            .get_json(&request.params)
            .await
            .map_err(|e| {
                let detail = format!(
                    "Ensure the airport codes ({} to {}) are valid and the dates are in the correct format.",
                    request.departure_id, request.arrival_id
                );
                translate(SearchKind::Flights, e, &detail)
            })
    }

    /// Validate hotel inputs and assemble the request parameters
    pub fn hotel_parameters(
        &self,
        query: Option<&str>,
        check_in_date: Option<&str>,
        check_out_date: Option<&str>,
        adults: Option<u32>,
        children: Option<u32>,
    ) -> std::result::Result<SearchParameters, ToolError> {
        let Some(query) = non_blank(query) else {
            return Err(ToolError::missing(
                "A search query (location) is required to find hotels.",
            ));
        };

        let (Some(check_in), Some(check_out)) = (non_blank(check_in_date), non_blank(check_out_date))
        else {
            return Err(ToolError::missing(
                "Both check-in and check-out dates are required for a hotel search.",
            ));
        };

        let check_in = normalize_date_canonical(Some(check_in)).map_err(invalid_date)?;
        let check_out = normalize_date_canonical(Some(check_out)).map_err(invalid_date)?;

        let mut params = SearchParameters::new(SearchKind::Hotels);
        params.push("q", query.trim());
        self.push_locale(&mut params);
        params.push_opt("check_in_date", check_in);
        params.push_opt("check_out_date", check_out);
        params.push_opt("adults", adults);
        params.push_opt("children", children);
        Ok(params)
    }

    /// Search hotels for a location and stay
    #[instrument(skip(self))]
    pub async fn search_hotels(
        &self,
        query: Option<&str>,
        check_in_date: Option<&str>,
        check_out_date: Option<&str>,
        adults: Option<u32>,
        children: Option<u32>,
    ) -> std::result::Result<Value, ToolError> {
        let params = self.hotel_parameters(query, check_in_date, check_out_date, adults, children)?;
        info!("Searching hotels for {:?}", params.get("q"));

        self.transport.get_json(&params).await.map_err(|e| {
            translate(
                SearchKind::Hotels,
                e,
                "Ensure the location query is simple and valid and dates are YYYY-MM-DD.",
            )
        })
    }

    fn push_locale(&self, params: &mut SearchParameters) {
        params.push("hl", &self.locale.language);
        params.push("gl", &self.locale.region);
        params.push("currency", &self.locale.currency);
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn airport_code(location: &str) -> std::result::Result<String, ToolError> {
    match LocationResolver::resolve(location) {
        ResolvedLocation::Code(code) => Ok(code),
        ResolvedLocation::Unresolved(original) => {
            warn!("No airport code for {:?}", original);
            Err(ToolError::UnresolvedLocation { location: original })
        }
    }
}

fn invalid_date(err: crate::dates::DateParseError) -> ToolError {
    warn!("{}", err);
    ToolError::InvalidDate { input: err.input }
}

/// Map a transport failure to the message shown to the agent.
///
/// Only a 4xx gets the targeted hint; everything else, including failures
/// where no response was ever received, reports the underlying cause.
fn translate(kind: SearchKind, err: TransportError, detail: &str) -> ToolError {
    warn!("{} search failed: {}", kind.label(), err);
    let rejected = err.is_client_error();
    match err {
        TransportError::Status { status, .. } if rejected => ToolError::UpstreamRejected(format!(
            "{} search failed. SerpApi returned {status}. {detail}",
            kind.label()
        )),
        other => ToolError::Transport(format!(
            "{} search failed due to API connection error: {other}",
            kind.label()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every request and answers with a canned result
    struct RecordingTransport {
        requests: Mutex<Vec<SearchParameters>>,
        response: std::result::Result<Value, TransportError>,
    }

    impl RecordingTransport {
        fn answering(response: std::result::Result<Value, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response,
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last(&self) -> SearchParameters {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl SearchTransport for RecordingTransport {
        async fn get_json(
            &self,
            params: &SearchParameters,
        ) -> std::result::Result<Value, TransportError> {
            self.requests.lock().unwrap().push(params.clone());
            self.response.clone()
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> SearchClient {
        SearchClient::with_transport(transport, &SearchConfig::default())
    }

    #[test]
    fn test_flight_request_parameters() {
        let client = client(RecordingTransport::answering(Ok(Value::Null)));
        let request = client
            .flight_request(
                Some("London Heathrow"),
                Some("Barcelona"),
                Some("October 12, 2025"),
                None,
            )
            .unwrap();

        assert_eq!(request.departure_id, "LHR");
        assert_eq!(request.arrival_id, "BCN");
        assert_eq!(request.params.get("engine"), Some("google_flights"));
        assert_eq!(request.params.get("hl"), Some("en"));
        assert_eq!(request.params.get("gl"), Some("us"));
        assert_eq!(request.params.get("departure_id"), Some("LHR"));
        assert_eq!(request.params.get("arrival_id"), Some("BCN"));
        assert_eq!(request.params.get("outbound_date"), Some("2025-10-12"));
        assert!(!request.params.contains("return_date"));
        assert!(!request.params.contains("api_key"));
    }

    #[tokio::test]
    async fn test_missing_origin_skips_network() {
        let transport = RecordingTransport::answering(Ok(Value::Null));
        let client = client(transport.clone());

        let err = client
            .search_flights(None, Some("BCN"), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::MissingInput(_)));
        assert!(err.to_string().contains("both origin and destination"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_destination_is_missing() {
        let transport = RecordingTransport::answering(Ok(Value::Null));
        let err = client(transport.clone())
            .search_flights(Some("LHR"), Some("   "), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingInput(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unresolved_city_is_rejected() {
        let transport = RecordingTransport::answering(Ok(Value::Null));
        let err = client(transport.clone())
            .search_flights(Some("Atlantis"), Some("BCN"), None, None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ToolError::UnresolvedLocation {
                location: "Atlantis".to_string()
            }
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_return_date_is_rejected() {
        let transport = RecordingTransport::answering(Ok(Value::Null));
        let err = client(transport.clone())
            .search_flights(Some("LHR"), Some("BCN"), Some("2025-10-12"), Some("next Tuesday"))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidDate { ref input } if input == "next Tuesday"));
        assert!(err.to_string().contains("simple date format"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_flight_success_passes_body_through() {
        let body = serde_json::json!({"best_flights": [{"price": 120}]});
        let transport = RecordingTransport::answering(Ok(body.clone()));
        let result = client(transport.clone())
            .search_flights(Some("lhr"), Some("paris"), Some("12th October 2025"), Some("10/19/2025"))
            .await
            .unwrap();

        assert_eq!(result, body);
        let sent = transport.last();
        assert_eq!(sent.get("arrival_id"), Some("CDG"));
        assert_eq!(sent.get("outbound_date"), Some("2025-10-12"));
        assert_eq!(sent.get("return_date"), Some("2025-10-19"));
    }

    #[tokio::test]
    async fn test_flight_client_error_names_codes() {
        let transport = RecordingTransport::answering(Err(TransportError::Status {
            status: 400,
            body: "bad request".to_string(),
        }));
        let err = client(transport)
            .search_flights(Some("London Heathrow"), Some("BCN"), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::UpstreamRejected(_)));
        assert!(err.to_string().contains("(LHR to BCN)"));
        assert!(err.to_string().contains("returned 400"));
    }

    #[tokio::test]
    async fn test_connection_failure_reports_cause() {
        let transport = RecordingTransport::answering(Err(TransportError::Connection(
            "connection refused".to_string(),
        )));
        let err = client(transport)
            .search_flights(Some("LHR"), Some("BCN"), None, None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ToolError::Transport(
                "Flight search failed due to API connection error: connection refused".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_server_error_is_generic() {
        let transport = RecordingTransport::answering(Err(TransportError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }));
        let err = client(transport)
            .search_hotels(Some("Paris"), Some("2025-10-12"), Some("2025-10-14"), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Transport(_)));
        assert!(err.to_string().starts_with("Hotel search failed due to API connection error"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_hotel_parameters_omit_absent_guests() {
        let client = client(RecordingTransport::answering(Ok(Value::Null)));
        let params = client
            .hotel_parameters(Some("  Paris, France "), Some("October 12, 2025"), Some("14 Oct 2025"), None, None)
            .unwrap();

        assert_eq!(params.get("engine"), Some("google_hotels"));
        assert_eq!(params.get("q"), Some("Paris, France"));
        assert_eq!(params.get("check_in_date"), Some("2025-10-12"));
        assert_eq!(params.get("check_out_date"), Some("2025-10-14"));
        assert!(!params.contains("adults"));
        assert!(!params.contains("children"));
    }

    #[test]
    fn test_hotel_parameters_keep_explicit_zero_children() {
        let client = client(RecordingTransport::answering(Ok(Value::Null)));
        let params = client
            .hotel_parameters(Some("Bali"), Some("2025-10-11"), Some("2025-10-12"), Some(2), Some(0))
            .unwrap();
        assert_eq!(params.get("adults"), Some("2"));
        assert_eq!(params.get("children"), Some("0"));
    }

    #[tokio::test]
    async fn test_hotels_require_query_and_both_dates() {
        let transport = RecordingTransport::answering(Ok(Value::Null));
        let client = client(transport.clone());

        let err = client
            .search_hotels(Some(""), Some("2025-10-11"), Some("2025-10-12"), None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("query (location) is required"));

        let err = client
            .search_hotels(Some("Bali"), Some("2025-10-11"), None, None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Both check-in and check-out dates"));

        let err = client
            .search_hotels(Some("Bali"), Some("soon"), Some("2025-10-12"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidDate { .. }));

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_hotel_client_error_wording() {
        let transport = RecordingTransport::answering(Err(TransportError::Status {
            status: 404,
            body: String::new(),
        }));
        let err = client(transport)
            .search_hotels(Some("Bali"), Some("2025-10-11"), Some("2025-10-12"), Some(2), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UpstreamRejected(_)));
        assert!(err.to_string().contains("Hotel search failed. SerpApi returned 404"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let transport = SerpApiTransport::new(&SearchConfig::default()).unwrap();
        let client = SearchClient::with_transport(Arc::new(transport), &SearchConfig::default());
        let err = client
            .search_flights(Some("LHR"), Some("BCN"), None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no SerpApi API key configured"));
    }
}

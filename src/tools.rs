//! Tool entry points for the agent host
//!
//! The host sees four functions, each taking JSON arguments and returning a
//! JSON object. Every outcome, including bad arguments and upstream failures,
//! comes back as a [`ToolResult`]; nothing here returns `Err` or panics.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::Result;
use crate::booking::BookingLinkBuilder;
use crate::config::TravelAgentConfig;
use crate::description::DescriptionClient;
use crate::error::ToolError;
use crate::search::SearchClient;

pub const GET_FLIGHTS: &str = "get_flights";
pub const BOOK_FLIGHT: &str = "book_flight";
pub const GET_HOTELS: &str = "get_hotels";
pub const DESTINATION_DESCRIPTION: &str = "destination_description";

/// Uniform tool return value: a payload object or `{"error": message}`
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Map<String, Value>),
    Error(String),
}

impl ToolResult {
    /// Wrap a payload; anything that is not an object goes under `content`
    #[must_use]
    pub fn success(payload: Value) -> Self {
        match payload {
            Value::Object(map) => ToolResult::Success(map),
            other => {
                let mut map = Map::new();
                map.insert("content".to_string(), other);
                ToolResult::Success(map)
            }
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResult::Error(message) => Some(message),
            ToolResult::Success(_) => None,
        }
    }

    /// A field of the success payload
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            ToolResult::Success(map) => map.get(key),
            ToolResult::Error(_) => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            ToolResult::Success(map) => Value::Object(map),
            ToolResult::Error(message) => json!({ "error": message }),
        }
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ToolResult::Success(map) => map.serialize(serializer),
            ToolResult::Error(message) => {
                let mut map = Map::new();
                map.insert("error".to_string(), Value::String(message.clone()));
                map.serialize(serializer)
            }
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::Error(err.to_string())
    }
}

impl<T: Serialize> From<std::result::Result<T, ToolError>> for ToolResult {
    fn from(result: std::result::Result<T, ToolError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(value) => ToolResult::success(value),
                Err(e) => ToolError::Unexpected(e.to_string()).into(),
            },
            Err(err) => err.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetFlightsArgs {
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookFlightArgs {
    pub flight_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetHotelsArgs {
    pub query: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DestinationDescriptionArgs {
    pub query: Option<String>,
}

/// Name, description and JSON-schema parameters of one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The four travel tools behind one handle
pub struct TravelTools {
    search: SearchClient,
    description: DescriptionClient,
    booking: BookingLinkBuilder,
}

impl TravelTools {
    pub fn new(search: SearchClient, description: DescriptionClient, booking: BookingLinkBuilder) -> Self {
        Self {
            search,
            description,
            booking,
        }
    }

    /// Build the production clients from configuration
    pub fn from_config(config: &TravelAgentConfig) -> Result<Self> {
        Ok(Self::new(
            SearchClient::new(&config.search)?,
            DescriptionClient::new(&config.encyclopedia)?,
            BookingLinkBuilder::new(&config.booking),
        ))
    }

    /// Search flights; airport codes preferred, known city names are mapped
    pub async fn get_flights(&self, args: GetFlightsArgs) -> ToolResult {
        self.search
            .search_flights(
                args.origin_name.as_deref(),
                args.destination_name.as_deref(),
                args.departure_date.as_deref(),
                args.return_date.as_deref(),
            )
            .await
            .into()
    }

    /// Deep link for a flight the user picked from the search results
    pub fn book_flight(&self, args: BookFlightArgs) -> ToolResult {
        self.booking.build(args.flight_code.as_deref()).into()
    }

    pub async fn get_hotels(&self, args: GetHotelsArgs) -> ToolResult {
        self.search
            .search_hotels(
                args.query.as_deref(),
                args.check_in_date.as_deref(),
                args.check_out_date.as_deref(),
                args.adults,
                args.children,
            )
            .await
            .into()
    }

    pub async fn destination_description(&self, args: DestinationDescriptionArgs) -> ToolResult {
        self.description
            .get_description(args.query.as_deref().unwrap_or_default())
            .await
            .map(|content| json!({ "content": content }))
            .into()
    }

    /// Dispatch a host call by tool name.
    ///
    /// `arguments` may be a JSON object or a string holding one, as some
    /// hosts forward the model's raw argument text.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult {
        info!("Tool call {}", name);

        let arguments = match arguments {
            Value::String(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => return invalid_arguments(name, &e),
            },
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        match name {
            GET_FLIGHTS => match serde_json::from_value(arguments) {
                Ok(args) => self.get_flights(args).await,
                Err(e) => invalid_arguments(name, &e),
            },
            BOOK_FLIGHT => match serde_json::from_value(arguments) {
                Ok(args) => self.book_flight(args),
                Err(e) => invalid_arguments(name, &e),
            },
            GET_HOTELS => match serde_json::from_value(arguments) {
                Ok(args) => self.get_hotels(args).await,
                Err(e) => invalid_arguments(name, &e),
            },
            DESTINATION_DESCRIPTION => match serde_json::from_value(arguments) {
                Ok(args) => self.destination_description(args).await,
                Err(e) => invalid_arguments(name, &e),
            },
            unknown => {
                warn!("Unknown tool {:?}", unknown);
                ToolResult::Error(format!("Unknown tool '{unknown}'."))
            }
        }
    }

    /// Definitions to register with the agent host
    #[must_use]
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: GET_FLIGHTS.to_string(),
                description: "Searches Google Flights for flights between two places. Airport codes are preferred, but common city names (e.g. 'Barcelona') are mapped to their primary airport. Dates are converted to YYYY-MM-DD automatically.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "origin_name": { "type": "string", "description": "Origin airport code or city (e.g. 'LHR', 'London Heathrow')" },
                        "destination_name": { "type": "string", "description": "Destination airport code or city (e.g. 'BCN', 'Barcelona')" },
                        "departure_date": { "type": "string", "description": "Outbound date (e.g. 'October 12, 2025')" },
                        "return_date": { "type": "string", "description": "Return date; omit for one-way searches" }
                    },
                    "required": ["origin_name", "destination_name"]
                }),
            },
            ToolDefinition {
                name: BOOK_FLIGHT.to_string(),
                description: "Generates a booking URL for a flight the user selected from the get_flights results. The user completes the booking on the external site.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "flight_code": { "type": "string", "description": "Carrier code followed by the flight number (e.g. 'BA-452')" }
                    },
                    "required": ["flight_code"]
                }),
            },
            ToolDefinition {
                name: GET_HOTELS.to_string(),
                description: "Searches Google Hotels for a location and stay. If flight dates are already known, use the outbound date as check-in and the return date as check-out.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Simple location string (e.g. 'Paris, France')" },
                        "check_in_date": { "type": "string", "description": "Check-in date" },
                        "check_out_date": { "type": "string", "description": "Check-out date" },
                        "adults": { "type": "integer", "minimum": 0 },
                        "children": { "type": "integer", "minimum": 0 }
                    },
                    "required": ["query", "check_in_date", "check_out_date"]
                }),
            },
            ToolDefinition {
                name: DESTINATION_DESCRIPTION.to_string(),
                description: "Returns the full Wikipedia article for a destination so questions about it (currency, cuisine, climate) can be answered.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Destination name (e.g. 'Lisbon')" }
                    },
                    "required": ["query"]
                }),
            },
        ]
    }
}

fn invalid_arguments(name: &str, err: &serde_json::Error) -> ToolResult {
    warn!("Invalid arguments for {}: {}", name, err);
    ToolResult::Error(format!("Invalid arguments for '{name}': {err}"))
}

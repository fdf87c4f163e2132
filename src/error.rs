/// Everything that can go wrong talking to CityBus or reading its payloads.
///
/// Lookups that find nothing return `None`, they never produce one of these.
#[derive(thiserror::Error, Debug)]
pub enum CityBusError {
    #[error("error requesting {endpoint}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("error parsing the response of {endpoint} \n{body}")]
    MalformedResponse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("route {route} has no patterns")]
    EmptyPatternList { route: String },

    #[error("invalid departure time {value:?}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("invalid search pattern")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T, E = CityBusError> = std::result::Result<T, E>;

use chrono::TimeDelta;
use chrono_tz::Tz;

pub const DEFAULT_API_URL: &str = "https://bus.gocitybus.com";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en";

/// Settings for talking to a CityBus deployment.
///
/// `Default` points at the Lafayette, Indiana agency.
#[derive(Clone, Debug)]
pub struct CityBusConfig {
    /// Scheme and host, no trailing slash
    pub api_url: String,
    /// How old a snapshot may get before callers should refresh it.
    /// Nothing refreshes automatically.
    pub refresh_interval: TimeDelta,
    pub accept_language: String,
    /// Departure times without an offset are read in this zone
    pub timezone: Tz,
}

impl CityBusConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_refresh_interval(mut self, refresh_interval: TimeDelta) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn with_accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

impl Default for CityBusConfig {
    fn default() -> Self {
        CityBusConfig {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval: TimeDelta::minutes(10),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timezone: chrono_tz::America::Indiana::Indianapolis,
        }
    }
}

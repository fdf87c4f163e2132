//! Responsible for talking to the CityBus web API
use reqwest::{
    Client, Response,
    header::{ACCEPT_LANGUAGE, CONTENT_LENGTH},
};
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info, info_span};

use crate::{
    config::CityBusConfig,
    error::{CityBusError, Result},
    model::{
        BusStop, Route,
        citybus_api_model::{
            CityBusBaseData, CityBusStop, CityBusStopEstimates, StopEstimatesRequest,
        },
    },
};

pub const ALL_BUS_STOPS: &str = "/Home/GetAllBusStops";
pub const BASE_DATA: &str = "/RouteMap/GetBaseData/";
pub const STOP_ESTIMATES: &str = "/Schedule/GetStopEstimates";

/// Thin typed wrapper over the three endpoints. One request per call, no retries.
#[derive(Clone, Debug)]
pub struct CityBusClient {
    http: Client,
    config: CityBusConfig,
}

impl CityBusClient {
    pub fn new(config: CityBusConfig) -> Self {
        CityBusClient {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &CityBusConfig {
        &self.config
    }

    #[tracing::instrument(err, skip(self))]
    pub async fn fetch_stops(&self) -> Result<Vec<BusStop>> {
        let response = self
            .http
            .get(self.config.endpoint(ALL_BUS_STOPS))
            .send()
            .instrument(info_span!("Fetching stops"))
            .await
            .and_then(Response::error_for_status)
            .map_err(transport(ALL_BUS_STOPS))?;

        let stops: Vec<CityBusStop> = read_json(ALL_BUS_STOPS, response).await?;

        info!("got {} stops", stops.len());

        Ok(stops.into_iter().map(BusStop::from).collect())
    }

    #[tracing::instrument(err, skip(self))]
    pub async fn fetch_routes(&self) -> Result<Vec<Route>> {
        let response = self
            .http
            .post(self.config.endpoint(BASE_DATA))
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .header(CONTENT_LENGTH, "0")
            .send()
            .instrument(info_span!("Fetching routes"))
            .await
            .and_then(Response::error_for_status)
            .map_err(transport(BASE_DATA))?;

        let base_data: CityBusBaseData = read_json(BASE_DATA, response).await?;

        info!("got {} routes", base_data.routes.len());

        base_data
            .routes
            .into_iter()
            .map(Route::try_from_citybus_route)
            .collect()
    }

    /// Raw schedule estimates for one stop, realtime and static entries alike
    #[tracing::instrument(err, skip(self))]
    pub async fn fetch_stop_estimates(&self, stop_code: &str) -> Result<CityBusStopEstimates> {
        let response = self
            .http
            .post(self.config.endpoint(STOP_ESTIMATES))
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .json(&StopEstimatesRequest { stop_code })
            .send()
            .instrument(info_span!("Fetching stop estimates"))
            .await
            .and_then(Response::error_for_status)
            .map_err(transport(STOP_ESTIMATES))?;

        let estimates: CityBusStopEstimates = read_json(STOP_ESTIMATES, response).await?;

        debug!(
            "got {} route schedules for stop {}",
            estimates.route_stop_schedules.len(),
            stop_code
        );

        Ok(estimates)
    }
}

fn transport(endpoint: &'static str) -> impl FnOnce(reqwest::Error) -> CityBusError {
    move |source| CityBusError::Transport { endpoint, source }
}

async fn read_json<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T> {
    let body = response
        .text()
        .instrument(info_span!("Reading body of response"))
        .await
        .map_err(transport(endpoint))?;

    serde_json::from_str(&body).map_err(|source| CityBusError::MalformedResponse {
        endpoint,
        source,
        body,
    })
}

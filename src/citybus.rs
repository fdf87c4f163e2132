use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    client::CityBusClient,
    config::CityBusConfig,
    error::Result,
    eta::StopEtas,
    model::{BusStop, Route},
    snapshot::{RouteLookup, Snapshot},
};

/// Entry point of the library. Holds the latest snapshot of stops and routes
/// and answers lookups from it. Only ETA queries go back to the network.
#[derive(Debug)]
pub struct CityBus {
    client: CityBusClient,
    snapshot: Snapshot,
}

impl CityBus {
    /// Connects with `config` and loads the first snapshot
    pub async fn new(config: CityBusConfig) -> Result<Self> {
        CityBus::with_client(CityBusClient::new(config)).await
    }

    pub async fn with_client(client: CityBusClient) -> Result<Self> {
        let snapshot = fetch_snapshot(&client).await?;

        Ok(CityBus { client, snapshot })
    }

    /// Replaces the snapshot with fresh stops and routes.
    /// On error the previous snapshot is kept as is.
    #[tracing::instrument(err, skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        self.snapshot = fetch_snapshot(&self.client).await?;

        Ok(())
    }

    /// Refreshes only when the snapshot is older than the configured interval.
    /// Returns whether a refresh happened.
    pub async fn refresh_if_stale(&mut self) -> Result<bool> {
        if !self.is_stale() {
            return Ok(false);
        }

        self.refresh().await?;

        Ok(true)
    }

    pub fn is_stale(&self) -> bool {
        self.snapshot
            .is_stale(Utc::now(), self.client.config().refresh_interval)
    }

    pub fn last_refreshed(&self) -> DateTime<Utc> {
        self.snapshot.refreshed_at()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn client(&self) -> &CityBusClient {
        &self.client
    }

    pub fn stops(&self) -> &[BusStop] {
        self.snapshot.stops()
    }

    pub fn routes(&self) -> &[Route] {
        self.snapshot.routes()
    }

    pub fn get_stop(&self, stop_id: &str) -> Option<&BusStop> {
        self.snapshot.get_stop(stop_id)
    }

    pub fn search_stops<'a>(
        &'a self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = &'a BusStop> + use<'a>> {
        self.snapshot.search_stops(pattern)
    }

    pub fn get_route(&self, lookup: RouteLookup<'_>) -> Option<&Route> {
        self.snapshot.get_route(lookup)
    }

    pub fn search_routes<'a>(
        &'a self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = &'a Route> + use<'a>> {
        self.snapshot.search_routes(pattern)
    }

    /// Live departures for a stop. `None` when the stop isn't in the snapshot,
    /// in which case nothing is requested.
    pub async fn get_etas(&self, stop_id: &str) -> Result<Option<StopEtas<'_>>> {
        let Some(stop) = self.snapshot.get_stop(stop_id) else {
            debug!("stop {stop_id} isn't in the snapshot");
            return Ok(None);
        };

        let etas = stop.fetch_etas(&self.client, &self.snapshot).await?;

        Ok(Some(etas))
    }
}

/// Stops first, then routes. Nothing is published unless both succeed.
async fn fetch_snapshot(client: &CityBusClient) -> Result<Snapshot> {
    let stops = client.fetch_stops().await?;
    let routes = client.fetch_routes().await?;

    info!(
        "snapshot refreshed with {} stops and {} routes",
        stops.len(),
        routes.len()
    );

    Ok(Snapshot::new(stops, routes, Utc::now()))
}

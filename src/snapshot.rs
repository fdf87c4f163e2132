//! Point in time copy of every stop and route
use chrono::{DateTime, TimeDelta, Utc};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::{
    error::Result,
    model::{BusStop, Route},
};

/// How to pick a single route
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteLookup<'a> {
    /// The rider-facing code, like "4B"
    ShortName(&'a str),
    /// The internal route key
    Uuid(&'a str),
}

/// Stops and routes as they were at `refreshed_at`.
///
/// Both lists always come from the same refresh.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    stops: Vec<BusStop>,
    routes: Vec<Route>,
    refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(stops: Vec<BusStop>, routes: Vec<Route>, refreshed_at: DateTime<Utc>) -> Self {
        Snapshot {
            stops,
            routes,
            refreshed_at,
        }
    }

    pub fn stops(&self) -> &[BusStop] {
        &self.stops
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    /// True once the snapshot is older than `interval`. Purely advisory.
    pub fn is_stale(&self, now: DateTime<Utc>, interval: TimeDelta) -> bool {
        now - self.refreshed_at > interval
    }

    pub fn get_stop(&self, stop_id: &str) -> Option<&BusStop> {
        self.stops.iter().find(|s| s.id == stop_id)
    }

    /// Stops whose name matches `pattern`, ignoring case, in snapshot order
    pub fn search_stops<'a>(
        &'a self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = &'a BusStop> + use<'a>> {
        let re = search_regex(pattern)?;

        Ok(self.stops.iter().filter(move |s| re.is_match(&s.name)))
    }

    pub fn get_route(&self, lookup: RouteLookup<'_>) -> Option<&Route> {
        match lookup {
            RouteLookup::ShortName(short_name) => {
                self.routes.iter().find(|r| r.short_name == short_name)
            }
            RouteLookup::Uuid(id) => self.routes.iter().find(|r| r.id == id),
        }
    }

    /// Routes whose name or short name matches `pattern`, ignoring case, in snapshot order
    pub fn search_routes<'a>(
        &'a self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = &'a Route> + use<'a>> {
        let re = search_regex(pattern)?;

        Ok(self
            .routes
            .iter()
            .filter(move |r| re.is_match(&r.name) || re.is_match(&r.short_name)))
    }
}

fn search_regex(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

#[cfg(test)]
pub(crate) fn fixture_snapshot() -> Snapshot {
    use crate::model::citybus_api_model::{CityBusBaseData, CityBusStop};

    let stops: Vec<CityBusStop> = serde_json::from_str(include_str!(
        "../documentation/example_responses/GetAllBusStops.json"
    ))
    .unwrap();
    let base_data: CityBusBaseData = serde_json::from_str(include_str!(
        "../documentation/example_responses/GetBaseData.json"
    ))
    .unwrap();

    Snapshot::new(
        stops.into_iter().map(BusStop::from).collect(),
        base_data
            .routes
            .into_iter()
            .map(|r| Route::try_from_citybus_route(r).unwrap())
            .collect(),
        Utc::now(),
    )
}

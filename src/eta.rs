//! Live departures for a stop, joined against the route snapshot
use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    client::CityBusClient,
    error::{CityBusError, Result},
    model::{BusStop, Eta, citybus_api_model::CityBusStopEstimates},
    snapshot::{RouteLookup, Snapshot},
};

/// Realtime departures for one stop, earliest first.
#[derive(Clone, Debug, Serialize)]
pub struct StopEtas<'a> {
    pub etas: Vec<Eta<'a>>,
    /// Route short names of realtime entries whose route isn't in the snapshot,
    /// one per skipped entry
    pub unresolved: Vec<String>,
}

impl<'a> StopEtas<'a> {
    /// Keeps only the realtime entries and resolves their routes by short name.
    /// Entries for routes missing from `snapshot` are skipped and reported.
    pub fn resolve(
        estimates: CityBusStopEstimates,
        snapshot: &'a Snapshot,
        timezone: Tz,
    ) -> Result<Self> {
        let mut etas = vec![];
        let mut unresolved = vec![];

        for schedule in estimates.route_stop_schedules {
            let route = snapshot.get_route(RouteLookup::ShortName(&schedule.route_number));

            for stop_time in schedule.stop_times.into_iter().filter(|t| t.is_realtime) {
                let Some(route) = route else {
                    warn!(
                        "route {} isn't in the snapshot, skipping its departure at {}",
                        schedule.route_number, stop_time.estimated_depart_time
                    );
                    unresolved.push(schedule.route_number.clone());
                    continue;
                };

                etas.push(Eta {
                    route,
                    departing: parse_departure(&stop_time.estimated_depart_time, timezone)?,
                });
            }
        }

        etas.sort_by(|a, b| a.departing.cmp(&b.departing));

        debug!("resolved {} etas, skipped {}", etas.len(), unresolved.len());

        Ok(StopEtas { etas, unresolved })
    }

    pub fn skipped(&self) -> usize {
        self.unresolved.len()
    }
}

impl BusStop {
    /// Asks CityBus for the live estimates at this stop
    #[tracing::instrument(err, skip(self, client, snapshot), fields(stop_id = %self.id))]
    pub async fn fetch_etas<'a>(
        &self,
        client: &CityBusClient,
        snapshot: &'a Snapshot,
    ) -> Result<StopEtas<'a>> {
        let estimates = client.fetch_stop_estimates(&self.id).await?;

        StopEtas::resolve(estimates, snapshot, client.config().timezone)
    }
}

// ISO-8601 forms accepted on top of RFC 3339
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Reads an ISO-8601 departure time. An explicit offset wins, otherwise the time is local to `timezone`.
///
/// Seconds are optional and the date and time may be split by a space instead of `T`.
pub fn parse_departure(value: &str, timezone: Tz) -> Result<DateTime<Tz>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.with_timezone(&timezone));
    }

    if let Some(with_offset) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Ok(with_offset.with_timezone(&timezone));
    }

    let mut last_error = None;
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDateTime::parse_from_str(value, format)
                .map_err(|e| last_error = Some(e))
                .ok()
        })
        .ok_or_else(|| CityBusError::InvalidTimestamp {
            value: value.to_string(),
            source: last_error,
        })?;

    // earliest() picks the first of the two readings during the DST fall back hour
    naive
        .and_local_timezone(timezone)
        .earliest()
        .ok_or_else(|| CityBusError::InvalidTimestamp {
            value: value.to_string(),
            source: None,
        })
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use chrono_tz::America::Indiana::Indianapolis;
    use itertools::Itertools;

    use super::*;
    use crate::snapshot::fixture_snapshot;

    fn estimates(json: &str) -> CityBusStopEstimates {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolve_fixture() -> Result<(), anyhow::Error> {
        let snapshot = fixture_snapshot();
        let json = include_str!("../documentation/example_responses/GetStopEstimates.json");

        let stop_etas = StopEtas::resolve(estimates(json), &snapshot, Indianapolis)?;

        let lines = stop_etas
            .etas
            .iter()
            .map(|e| {
                (
                    e.departing.format("%H:%M:%S").to_string(),
                    e.route.short_name.as_str(),
                )
            })
            .collect_vec();
        assert_eq!(
            lines,
            vec![
                ("07:58:30".to_string(), "4B"),
                ("08:05:00".to_string(), "1B"),
                ("08:40:00".to_string(), "4B"),
            ]
        );
        assert_eq!(stop_etas.skipped(), 0);

        Ok(())
    }

    #[test]
    fn test_static_entries_are_dropped() -> Result<(), anyhow::Error> {
        let snapshot = fixture_snapshot();
        let json = r##"{"routeStopSchedules": [{"routeNumber": "1B", "stopTimes": [
            {"isRealtime": true, "estimatedDepartTime": "2024-01-01T08:05:00"},
            {"isRealtime": false, "estimatedDepartTime": "2024-01-01T08:00:00"}
        ]}]}"##;

        let stop_etas = StopEtas::resolve(estimates(json), &snapshot, Indianapolis)?;

        assert_eq!(stop_etas.etas.len(), 1);
        assert_eq!(stop_etas.etas[0].departing.hour(), 8);
        assert_eq!(stop_etas.etas[0].departing.minute(), 5);

        Ok(())
    }

    #[test]
    fn test_unknown_route_is_skipped() -> Result<(), anyhow::Error> {
        let snapshot = fixture_snapshot();
        let json = r##"{"routeStopSchedules": [
            {"routeNumber": "99", "stopTimes": [
                {"isRealtime": true, "estimatedDepartTime": "2024-01-01T07:00:00"},
                {"isRealtime": true, "estimatedDepartTime": "2024-01-01T07:30:00"},
                {"isRealtime": false, "estimatedDepartTime": "2024-01-01T07:45:00"}
            ]},
            {"routeNumber": "13", "stopTimes": [
                {"isRealtime": true, "estimatedDepartTime": "2024-01-01T09:00:00"}
            ]}
        ]}"##;

        let stop_etas = StopEtas::resolve(estimates(json), &snapshot, Indianapolis)?;

        assert_eq!(stop_etas.etas.len(), 1);
        assert_eq!(stop_etas.etas[0].route.name, "Silver Loop");
        assert_eq!(stop_etas.unresolved, vec!["99", "99"]);
        assert_eq!(stop_etas.skipped(), 2);

        Ok(())
    }

    #[test]
    fn test_bad_realtime_timestamp_fails() {
        let snapshot = fixture_snapshot();
        let json = r##"{"routeStopSchedules": [{"routeNumber": "1B", "stopTimes": [
            {"isRealtime": true, "estimatedDepartTime": "soon"}
        ]}]}"##;

        let res = StopEtas::resolve(estimates(json), &snapshot, Indianapolis);

        assert!(matches!(res, Err(CityBusError::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_loose_realtime_timestamps_resolve() -> Result<(), anyhow::Error> {
        let snapshot = fixture_snapshot();
        let json = r##"{"routeStopSchedules": [{"routeNumber": "1B", "stopTimes": [
            {"isRealtime": true, "estimatedDepartTime": "2024-01-01 08:20"},
            {"isRealtime": true, "estimatedDepartTime": "2024-01-01T08:05"},
            {"isRealtime": true, "estimatedDepartTime": "2024-01-01T08:10:00-0500"}
        ]}]}"##;

        let stop_etas = StopEtas::resolve(estimates(json), &snapshot, Indianapolis)?;

        let times = stop_etas
            .etas
            .iter()
            .map(|e| e.departing.format("%H:%M").to_string())
            .collect_vec();
        assert_eq!(times, vec!["08:05", "08:10", "08:20"]);

        Ok(())
    }

    #[test]
    fn test_bad_static_timestamp_is_ignored() -> Result<(), anyhow::Error> {
        let snapshot = fixture_snapshot();
        let json = r##"{"routeStopSchedules": [{"routeNumber": "1B", "stopTimes": [
            {"isRealtime": false, "estimatedDepartTime": "soon"}
        ]}]}"##;

        let stop_etas = StopEtas::resolve(estimates(json), &snapshot, Indianapolis)?;

        assert!(stop_etas.etas.is_empty());

        Ok(())
    }

    #[test]
    fn test_parse_departure() -> Result<(), anyhow::Error> {
        let local = parse_departure("2024-01-01T08:05:00", Indianapolis)?;
        assert_eq!(local.format("%H:%M").to_string(), "08:05");
        assert_eq!(local.to_rfc3339(), "2024-01-01T08:05:00-05:00");

        let fractional = parse_departure("2024-07-01T17:45:12.5", Indianapolis)?;
        assert_eq!(fractional.to_rfc3339(), "2024-07-01T17:45:12.500-04:00");

        let utc = parse_departure("2024-01-01T13:05:00Z", Indianapolis)?;
        assert_eq!(utc, local);

        assert!(matches!(
            parse_departure("08:05", Indianapolis),
            Err(CityBusError::InvalidTimestamp { source: Some(_), .. })
        ));
        assert!(parse_departure("2024-01-01", Indianapolis).is_err());

        Ok(())
    }

    #[test]
    fn test_parse_departure_loose_iso_forms() -> Result<(), anyhow::Error> {
        let expected = parse_departure("2024-01-01T08:05:00", Indianapolis)?;

        for value in [
            "2024-01-01T08:05",
            "2024-01-01 08:05:00",
            "2024-01-01 08:05",
            "2024-01-01T08:05:00-0500",
            "2024-01-01 08:05:00-05:00",
            "2024-01-01T13:05:00+0000",
        ] {
            assert_eq!(parse_departure(value, Indianapolis)?, expected, "{value}");
        }

        let precise = parse_departure("2024-01-01T08:05:00.1234567", Indianapolis)?;
        assert_eq!(precise.format("%H:%M:%S").to_string(), "08:05:00");

        Ok(())
    }
}

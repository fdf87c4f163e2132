use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

use super::citybus_api_model::{CityBusPattern, CityBusRoute, CityBusStop};
use crate::{
    error::CityBusError,
    utils::{color_blocks, parse_hex_color, strip_bus_suffix},
};

/// One directional branch of a route
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteSegment {
    pub id: String,
    pub is_active: bool,
    pub destination: String,
    pub direction_id: String,
}

impl From<CityBusPattern> for RouteSegment {
    fn from(value: CityBusPattern) -> Self {
        RouteSegment {
            id: value.key,
            is_active: value.is_display,
            destination: value.destination,
            direction_id: value.direction.key,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    /// Internal uuid
    pub id: String,
    pub name: String,
    /// What riders call the route, like "4B"
    pub short_name: String,
    /// Never empty
    pub segments: Vec<RouteSegment>,
    /// Hex RGB, taken from the first segment
    pub color: String,
}

impl Route {
    pub fn try_from_citybus_route(value: CityBusRoute) -> Result<Self, CityBusError> {
        let color = value
            .pattern_list
            .first()
            .ok_or_else(|| CityBusError::EmptyPatternList {
                route: value.key.clone(),
            })?
            .line_color
            .clone();

        Ok(Route {
            id: value.key,
            name: value.name,
            short_name: value.short_name,
            segments: value.pattern_list.into_iter().map(RouteSegment::from).collect(),
            color,
        })
    }

    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }

    /// A terminal color swatch in the route color
    pub fn swatch(&self) -> String {
        color_blocks(&self.color)
    }
}

impl TryFrom<CityBusRoute> for Route {
    type Error = CityBusError;

    fn try_from(value: CityBusRoute) -> Result<Self, Self::Error> {
        Route::try_from_citybus_route(value)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{: >6} {}", self.swatch(), self.short_name, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BusStop {
    /// The stop code riders see, not the internal uuid
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<CityBusStop> for BusStop {
    fn from(value: CityBusStop) -> Self {
        BusStop {
            id: value.stop_code,
            name: strip_bus_suffix(&value.stop_name),
            lat: value.latitude,
            lon: value.longitude,
        }
    }
}

impl fmt::Display for BusStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{: <10} {}", self.id, self.name)
    }
}

/// A live departure estimate. Borrows its route from the snapshot it was resolved against.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Eta<'a> {
    pub route: &'a Route,
    pub departing: DateTime<Tz>,
}

impl fmt::Display for Eta<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{: >6} {}",
            self.departing.format("%H:%M"),
            self.route.swatch(),
            self.route.short_name,
            self.route.name
        )
    }
}

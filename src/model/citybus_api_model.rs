use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of `GET /Home/GetAllBusStops`
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CityBusStop {
    pub stop_code: String,
    /// Usually carries a `": BUS<code>"` suffix that isn't meant for riders
    pub stop_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of `POST /RouteMap/GetBaseData/`
#[derive(Debug, Deserialize, Serialize)]
pub struct CityBusBaseData {
    pub routes: Vec<CityBusRoute>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CityBusRoute {
    pub key: String,
    pub name: String,
    pub short_name: String,
    /// Directional branches. The first one holds the route color.
    pub pattern_list: Vec<CityBusPattern>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CityBusPattern {
    pub key: String,
    pub is_display: bool,
    #[serde(deserialize_with = "destination_name")]
    pub destination: String,
    pub direction: CityBusDirection,
    /// Hex RGB like `#5CB8B2`
    pub line_color: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CityBusDirection {
    pub key: String,
}

/// Body sent to `POST /Schedule/GetStopEstimates`
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopEstimatesRequest<'a> {
    pub stop_code: &'a str,
}

/// Body of `POST /Schedule/GetStopEstimates`
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityBusStopEstimates {
    pub route_stop_schedules: Vec<CityBusRouteStopSchedule>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityBusRouteStopSchedule {
    /// The route short name, not its key
    pub route_number: String,
    pub stop_times: Vec<CityBusStopTime>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityBusStopTime {
    /// false means the entry comes from the static timetable
    pub is_realtime: bool,
    /// ISO-8601, normally without an offset
    pub estimated_depart_time: String,
}

// The destination is a plain string in every response seen so far, but the
// field is typed loosely on the API side. Objects are reduced to their name.
fn destination_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    let name = match value {
        Value::String(s) => s,
        Value::Object(ref map) => match map.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => value.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    };

    Ok(name)
}

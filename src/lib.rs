//! Client for the CityBus (Lafayette, Indiana) web API.
//!
//! [`CityBus`] keeps a snapshot of every stop and route, answers lookups and
//! searches from it, and joins live arrival estimates against it.

pub mod citybus;
pub mod client;
pub mod config;
pub mod error;
pub mod eta;
pub mod model;
pub mod snapshot;
pub mod utils;

pub use citybus::CityBus;
pub use client::CityBusClient;
pub use config::CityBusConfig;
pub use error::CityBusError;
pub use eta::StopEtas;
pub use model::{BusStop, Eta, Route, RouteSegment};
pub use snapshot::{RouteLookup, Snapshot};

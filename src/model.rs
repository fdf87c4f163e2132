pub mod citybus_api_model;
pub mod transit;

pub use transit::*;

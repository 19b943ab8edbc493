pub mod config;
pub mod csv;
pub mod save;

pub use config::{load_flight_config, load_vehicle, load_vehicles};
pub use save::ShipSave;

use std::fs::File;
use std::path::Path;

use crate::dynamics::FlightConfig;
use crate::error::ConfigError;
use crate::vehicle::VehicleSpec;

/// Load flight constants. Missing keys keep their defaults.
pub fn load_flight_config<P: AsRef<Path>>(path: P) -> Result<FlightConfig, ConfigError> {
    let reader = File::open(path)?;
    Ok(serde_yaml::from_reader(reader)?)
}

/// Load and validate a single vehicle class.
pub fn load_vehicle<P: AsRef<Path>>(path: P) -> Result<VehicleSpec, ConfigError> {
    let reader = File::open(path)?;
    let spec: VehicleSpec = serde_yaml::from_reader(reader)?;
    spec.validate()?;
    Ok(spec)
}

/// Load and validate a list of vehicle classes.
pub fn load_vehicles<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleSpec>, ConfigError> {
    let reader = File::open(path)?;
    let specs: Vec<VehicleSpec> = serde_yaml::from_reader(reader)?;
    for spec in &specs {
        spec.validate()?;
    }
    Ok(specs)
}

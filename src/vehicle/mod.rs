pub mod thruster;
pub mod spec;
pub mod presets;

pub use spec::{VehicleSpec, VehicleSpecBuilder};
pub use thruster::{Engine, Thruster, ThrusterKind, ThrusterSpec};

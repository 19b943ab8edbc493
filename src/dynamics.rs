pub mod state;
pub mod body;
pub mod accumulator;

pub use accumulator::{ForceAccumulator, StepAcceleration};
pub use body::{FreeBody, RigidBody};
pub use state::{FlightConfig, Kinematics, SimConfig};

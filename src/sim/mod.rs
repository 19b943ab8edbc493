pub mod event;
pub mod runner;
pub mod world;

pub use event::{EventKind, EventLog, FlightEvent};
pub use runner::{run_until_idle, step, Sample};
pub use world::{SimWorld, World};

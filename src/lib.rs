pub mod dock;
pub mod dynamics;
pub mod error;
pub mod gnc;
pub mod io;
pub mod logging;
pub mod nav;
pub mod pilot;
pub mod ship;
pub mod sim;
pub mod vehicle;

pub use error::{ConfigError, DockError, NavError};
pub use ship::Ship;

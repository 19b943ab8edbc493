pub mod obstacle;
pub mod path;

pub use obstacle::{scan, EntitySnapshot, ObstacleCandidate};
pub use path::{facing, plan};

pub mod command;
pub mod queue;

pub use command::{Command, CommandKind, PilotMode};
pub use queue::{CommandQueue, ModeChange};

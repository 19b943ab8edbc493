use std::fmt;

use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Navigation commands
// ---------------------------------------------------------------------------

/// One queued autonomous navigation intent. Targets are world frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MoveTo { target: Vector3<f64> },
    BrakeLinear,
    RotateTo { target: UnitQuaternion<f64> },
    BrakeAngular,
    DockAt { station: String, slot: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MoveTo,
    BrakeLinear,
    RotateTo,
    BrakeAngular,
    DockAt,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::MoveTo { .. } => CommandKind::MoveTo,
            Command::BrakeLinear => CommandKind::BrakeLinear,
            Command::RotateTo { .. } => CommandKind::RotateTo,
            Command::BrakeAngular => CommandKind::BrakeAngular,
            Command::DockAt { .. } => CommandKind::DockAt,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandKind::MoveTo => "move-to",
            CommandKind::BrakeLinear => "brake-linear",
            CommandKind::RotateTo => "rotate-to",
            CommandKind::BrakeAngular => "brake-angular",
            CommandKind::DockAt => "dock-at",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Pilot mode
// ---------------------------------------------------------------------------

/// Top-level control authority of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PilotMode {
    #[default]
    Manual,
    Gliding,
    AutoPilot,
    Docked,
}

impl PilotMode {
    /// Manual and gliding both take direct input and ignore the queue.
    pub fn is_manual(self) -> bool {
        matches!(self, PilotMode::Manual | PilotMode::Gliding)
    }

    pub fn is_gliding(self) -> bool {
        self == PilotMode::Gliding
    }

    pub fn is_autopilot(self) -> bool {
        self == PilotMode::AutoPilot
    }

    pub fn is_docked(self) -> bool {
        self == PilotMode::Docked
    }
}

impl fmt::Display for PilotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PilotMode::Manual => "manual",
            PilotMode::Gliding => "gliding",
            PilotMode::AutoPilot => "autopilot",
            PilotMode::Docked => "docked",
        };
        f.write_str(s)
    }
}

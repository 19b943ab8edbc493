use crate::pilot::{CommandKind, PilotMode};

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Kinds of flight events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    CommandPushed(CommandKind),
    CommandCleared(CommandKind),
    ModeChanged { from: PilotMode, to: PilotMode },
    /// RotateTo started diverging and switched to braking.
    PilotError,
    Docked { station: String, slot: u32 },
    Undocked { station: String },
    DockDenied { station: String },
    PlanningFailed,
}

/// A discrete event recorded by a ship.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: EventKind,
}

/// Ordered event log, drained by the caller.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<FlightEvent>,
}

impl EventLog {
    pub fn push(&mut self, time: f64, kind: EventKind) {
        self.events.push(FlightEvent { time, kind });
    }

    pub fn drain(&mut self) -> Vec<FlightEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlightEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_log() {
        let mut log = EventLog::default();
        log.push(0.0, EventKind::PilotError);
        log.push(0.5, EventKind::CommandPushed(CommandKind::MoveTo));
        assert_eq!(log.len(), 2);
        let events = log.drain();
        assert_eq!(events[1].kind, EventKind::CommandPushed(CommandKind::MoveTo));
        assert!(log.is_empty());
    }
}

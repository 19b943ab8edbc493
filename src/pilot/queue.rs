use std::collections::VecDeque;

use tracing::debug;

use super::command::{Command, PilotMode};

// ---------------------------------------------------------------------------
// Command queue + pilot state machine
// ---------------------------------------------------------------------------

/// Strict FIFO of pending commands together with the pilot mode it drives.
/// The head of the queue is the active command.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    mode: PilotMode,
    commands: VecDeque<Command>,
}

/// A pilot mode transition, reported so callers can trace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: PilotMode,
    pub to: PilotMode,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PilotMode {
        self.mode
    }

    /// Switch mode; returns the transition if the mode actually changed.
    pub fn set_mode(&mut self, mode: PilotMode) -> Option<ModeChange> {
        if self.mode == mode {
            return None;
        }
        let change = ModeChange { from: self.mode, to: mode };
        debug!(from = %change.from, to = %change.to, "pilot mode changed");
        self.mode = mode;
        Some(change)
    }

    /// Append to the tail and hand control to the autopilot.
    pub fn enqueue(&mut self, command: Command) -> Option<ModeChange> {
        debug!(kind = %command.kind(), pending = self.commands.len() + 1, "pushed command");
        self.commands.push_back(command);
        self.set_mode(PilotMode::AutoPilot)
    }

    /// Remove the head. Dequeuing an empty queue is a no-op.
    pub fn dequeue(&mut self) -> Option<Command> {
        let cmd = self.commands.pop_front();
        match &cmd {
            Some(c) => debug!(kind = %c.kind(), pending = self.commands.len(), "cleared command"),
            None => debug!("cleared command: queue already empty"),
        }
        cmd
    }

    pub fn peek(&self) -> Option<&Command> {
        self.commands.front()
    }

    /// Drop every pending command. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let n = self.commands.len();
        self.commands.clear();
        if n > 0 {
            debug!(discarded = n, "command queue cleared");
        }
        n
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}

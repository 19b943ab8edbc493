use nalgebra::{UnitQuaternion, Vector3};

use crate::dynamics::{FlightConfig, Kinematics};
use crate::pilot::Command;
use crate::vehicle::VehicleSpec;

/// A command reached its goal this tick. The ship applies the snap to the
/// body and dequeues the command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Snap onto the target point and zero linear velocity.
    Arrived { position: Vector3<f64> },
    /// Zero linear velocity.
    Stopped,
    /// Snap onto the target orientation and zero angular velocity.
    Aligned { orientation: UnitQuaternion<f64> },
    /// Zero angular velocity.
    Steadied,
}

/// Per-tick controller result. Targets are vehicle-local.
#[derive(Debug, Clone, PartialEq)]
pub struct AttitudeOutput {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
    pub completion: Option<Completion>,
    /// Remaining rotation grew since last tick; the output is a brake.
    pub diverging: bool,
    /// Residual spin is below the negligible rate: zero angular velocity
    /// without completing the command.
    pub cancel_spin: bool,
}

impl AttitudeOutput {
    /// Zero targets, nothing completed.
    pub fn hold() -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
            completion: None,
            diverging: false,
            cancel_spin: false,
        }
    }
}

/// Trait for autopilot controllers.
///
/// Implement this to plug a different command-following law into a ship.
pub trait Controller {
    /// Compute local velocity targets for the active command.
    fn update(
        &mut self,
        command: &Command,
        kin: &Kinematics,
        spec: &VehicleSpec,
        cfg: &FlightConfig,
    ) -> AttitudeOutput;

    /// Forget per-command state. Called whenever the active command changes.
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

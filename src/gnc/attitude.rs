use std::f64::consts::TAU;

use nalgebra::{UnitQuaternion, Vector3};
use tracing::trace;

use super::controller::{AttitudeOutput, Completion, Controller};
use crate::dynamics::{FlightConfig, Kinematics};
use crate::pilot::Command;
use crate::vehicle::VehicleSpec;

/// Remaining-angle value meaning "no previous tick".
const NO_PREVIOUS_ANGLE: f64 = TAU;

// ---------------------------------------------------------------------------
// Proportional pursuit with stop-distance braking
// ---------------------------------------------------------------------------

/// Default autopilot: pursue the target proportionally, brake once inside the
/// stop distance, snap when within the dead zone.
///
/// Holds the previous tick's remaining rotation angle for the active
/// `RotateTo`. One controller per ship.
#[derive(Debug, Clone)]
pub struct AttitudeController {
    previous_angle: f64,
}

impl Default for AttitudeController {
    fn default() -> Self {
        Self::new()
    }
}

impl AttitudeController {
    pub fn new() -> Self {
        Self { previous_angle: NO_PREVIOUS_ANGLE }
    }

    pub fn move_to(
        &mut self,
        target: &Vector3<f64>,
        kin: &Kinematics,
        spec: &VehicleSpec,
        cfg: &FlightConfig,
    ) -> AttitudeOutput {
        let mut offset = kin.to_local(&(target - kin.pos));
        if !spec.can_move_vertical {
            offset.z = 0.0;
        }
        let distance = offset.norm();
        let speed = kin.speed();

        let mut out = AttitudeOutput::hold();
        if distance < cfg.dead_distance && speed < spec.negligible_speed(cfg.negligible_speed_ratio) {
            out.completion = Some(Completion::Arrived { position: *target });
        } else if distance > spec.linear_stop_distance(speed) {
            out.linear = offset;
        }
        out
    }

    pub fn brake_linear(&mut self, kin: &Kinematics, spec: &VehicleSpec, cfg: &FlightConfig) -> AttitudeOutput {
        let mut out = AttitudeOutput::hold();
        if kin.speed() < spec.negligible_speed(cfg.negligible_speed_ratio) {
            out.completion = Some(Completion::Stopped);
        }
        out
    }

    pub fn rotate_to(
        &mut self,
        target: &UnitQuaternion<f64>,
        kin: &Kinematics,
        spec: &VehicleSpec,
        cfg: &FlightConfig,
    ) -> AttitudeOutput {
        let delta = kin.quat.inverse() * target;
        let remaining = delta.angle();
        let diverging = remaining > self.previous_angle;
        self.previous_angle = remaining;

        let stop = spec.angular_stop_distance(kin.angular_speed());
        let mut out = AttitudeOutput::hold();
        if remaining < cfg.dead_angle && stop < cfg.dead_angle {
            self.previous_angle = NO_PREVIOUS_ANGLE;
            out.completion = Some(Completion::Aligned { orientation: *target });
        } else if diverging {
            trace!(remaining, "rotation diverging, braking");
            out.diverging = true;
            // Spin this slow sits inside the allocator dead band
            out.cancel_spin = kin.angular_speed() < spec.negligible_angular_speed(cfg.negligible_speed_ratio);
        } else if remaining > stop {
            out.angular = delta.scaled_axis();
        }
        out
    }

    pub fn brake_angular(&mut self, kin: &Kinematics, spec: &VehicleSpec, cfg: &FlightConfig) -> AttitudeOutput {
        let mut out = AttitudeOutput::hold();
        if kin.angular_speed() < spec.negligible_angular_speed(cfg.negligible_speed_ratio) {
            out.completion = Some(Completion::Steadied);
        }
        out
    }
}

impl Controller for AttitudeController {
    fn update(
        &mut self,
        command: &Command,
        kin: &Kinematics,
        spec: &VehicleSpec,
        cfg: &FlightConfig,
    ) -> AttitudeOutput {
        match command {
            Command::MoveTo { target } => self.move_to(target, kin, spec, cfg),
            Command::BrakeLinear => self.brake_linear(kin, spec, cfg),
            Command::RotateTo { target } => self.rotate_to(target, kin, spec, cfg),
            Command::BrakeAngular => self.brake_angular(kin, spec, cfg),
            // Docking is confirmed by the ship, not flown
            Command::DockAt { .. } => AttitudeOutput::hold(),
        }
    }

    fn reset(&mut self) {
        self.previous_angle = NO_PREVIOUS_ANGLE;
    }

    fn name(&self) -> &str {
        "pursuit"
    }
}

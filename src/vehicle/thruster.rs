use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Thruster capability
// ---------------------------------------------------------------------------

/// What the thrust allocator needs from an actuator.
///
/// Axis and location are world frame and valid for the current tick.
pub trait Engine {
    /// Unit vector along which the thruster pushes the vehicle.
    fn thrust_axis(&self) -> Vector3<f64>;
    /// Maximum thrust, N.
    fn max_thrust(&self) -> f64;
    /// World-space mount point.
    fn mount_location(&self) -> Vector3<f64>;
    fn set_target_linear_ratio(&mut self, ratio: f64);
    fn set_target_angular_ratio(&mut self, ratio: f64);
    /// Whether the engine follows the angular ratio at all.
    fn steers(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrusterKind {
    /// Reaction-control thruster: used for both translation and attitude.
    Rcs,
    /// Main drive: follows linear commands and the manual boost only.
    Orbital,
}

// ---------------------------------------------------------------------------
// Thruster definition (vehicle frame)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrusterSpec {
    pub name: String,
    pub kind: ThrusterKind,
    pub axis: Vector3<f64>,    // local push direction
    pub mount: Vector3<f64>,   // m, local mount point
    pub max_thrust: f64,       // N
}

// ---------------------------------------------------------------------------
// Mounted thruster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Thruster {
    pub spec: ThrusterSpec,
    local_axis: Vector3<f64>,
    world_axis: Vector3<f64>,
    world_mount: Vector3<f64>,
    linear_ratio: f64,
    angular_ratio: f64,
    boost: bool,
}

impl Thruster {
    pub fn new(spec: ThrusterSpec) -> Result<Self, ConfigError> {
        let local_axis = spec.axis.try_normalize(1e-9).ok_or_else(|| {
            ConfigError::InvalidVehicle {
                name: spec.name.clone(),
                reason: "thruster axis has zero length".into(),
            }
        })?;
        if !(spec.max_thrust >= 0.0) {
            return Err(ConfigError::InvalidVehicle {
                name: spec.name.clone(),
                reason: format!("negative max thrust {}", spec.max_thrust),
            });
        }
        Ok(Self {
            world_axis: local_axis,
            world_mount: spec.mount,
            local_axis,
            spec,
            linear_ratio: 0.0,
            angular_ratio: 0.0,
            boost: false,
        })
    }

    pub fn kind(&self) -> ThrusterKind {
        self.spec.kind
    }

    /// Re-derive world axis and mount point from the vehicle pose.
    pub fn update_frame(&mut self, pos: &Vector3<f64>, quat: &UnitQuaternion<f64>) {
        self.world_axis = quat * self.local_axis;
        self.world_mount = pos + quat * self.spec.mount;
    }

    pub fn linear_ratio(&self) -> f64 {
        self.linear_ratio
    }

    pub fn angular_ratio(&self) -> f64 {
        self.angular_ratio
    }

    /// Combined allocator command: linear plus angular ratio, not re-clamped.
    pub fn command(&self) -> f64 {
        match self.spec.kind {
            ThrusterKind::Rcs => self.linear_ratio + self.angular_ratio,
            ThrusterKind::Orbital => self.linear_ratio,
        }
    }

    /// Manual full-thrust override. Only main drives respond.
    pub fn set_boost(&mut self, on: bool) {
        self.boost = on && self.spec.kind == ThrusterKind::Orbital;
    }

    /// Fraction of max thrust actually produced. A thruster only pushes along
    /// its axis, so the output saturates to [0, 1].
    pub fn output_ratio(&self) -> f64 {
        if self.boost {
            1.0
        } else {
            self.command().clamp(0.0, 1.0)
        }
    }

    /// World-frame force produced this tick.
    pub fn force(&self) -> Vector3<f64> {
        self.world_axis * (self.spec.max_thrust * self.output_ratio())
    }

    pub fn reset(&mut self) {
        self.linear_ratio = 0.0;
        self.angular_ratio = 0.0;
    }
}

impl Engine for Thruster {
    fn thrust_axis(&self) -> Vector3<f64> {
        self.world_axis
    }

    fn max_thrust(&self) -> f64 {
        self.spec.max_thrust
    }

    fn mount_location(&self) -> Vector3<f64> {
        self.world_mount
    }

    fn set_target_linear_ratio(&mut self, ratio: f64) {
        self.linear_ratio = ratio;
    }

    fn set_target_angular_ratio(&mut self, ratio: f64) {
        self.angular_ratio = ratio;
    }

    fn steers(&self) -> bool {
        self.spec.kind == ThrusterKind::Rcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn rcs(axis: Vector3<f64>, mount: Vector3<f64>) -> Thruster {
        Thruster::new(ThrusterSpec {
            name: "t".into(),
            kind: ThrusterKind::Rcs,
            axis,
            mount,
            max_thrust: 100.0,
        })
        .unwrap()
    }

    #[test]
    fn axis_is_normalized() {
        let t = rcs(Vector3::new(3.0, 0.0, 4.0), Vector3::zeros());
        assert!((t.thrust_axis().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_axis_rejected() {
        let r = Thruster::new(ThrusterSpec {
            name: "bad".into(),
            kind: ThrusterKind::Rcs,
            axis: Vector3::zeros(),
            mount: Vector3::zeros(),
            max_thrust: 1.0,
        });
        assert!(r.is_err());
    }

    #[test]
    fn frame_follows_vehicle_pose() {
        let mut t = rcs(Vector3::x(), Vector3::new(1.0, 0.0, 0.0));
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2);
        t.update_frame(&Vector3::new(10.0, 0.0, 0.0), &q);
        assert!((t.thrust_axis() - Vector3::y()).norm() < 1e-12);
        assert!((t.mount_location() - Vector3::new(10.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn output_only_pushes_forward() {
        let mut t = rcs(Vector3::x(), Vector3::zeros());
        t.set_target_linear_ratio(-0.7);
        assert_eq!(t.output_ratio(), 0.0);
        t.set_target_linear_ratio(0.8);
        t.set_target_angular_ratio(0.6);
        assert!((t.command() - 1.4).abs() < 1e-12, "command sum is not re-clamped");
        assert_eq!(t.output_ratio(), 1.0);
        assert!((t.force() - Vector3::new(100.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn orbital_ignores_angular_and_boosts() {
        let mut t = Thruster::new(ThrusterSpec {
            name: "main".into(),
            kind: ThrusterKind::Orbital,
            axis: Vector3::x(),
            mount: Vector3::new(-5.0, 0.0, 0.0),
            max_thrust: 1000.0,
        })
        .unwrap();
        t.set_target_angular_ratio(0.5);
        assert_eq!(t.output_ratio(), 0.0);
        t.set_boost(true);
        assert_eq!(t.output_ratio(), 1.0);

        let mut r = rcs(Vector3::x(), Vector3::zeros());
        r.set_boost(true);
        assert_eq!(r.output_ratio(), 0.0, "RCS does not respond to boost");
    }
}

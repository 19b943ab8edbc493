use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::thruster::{Thruster, ThrusterKind, ThrusterSpec};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Vehicle class definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    pub mass: f64,                    // kg, rated mass
    pub max_linear_velocity: f64,     // m/s
    pub max_angular_velocity: f64,    // rad/s
    pub linear_deceleration: f64,     // m/s^2, braking capability
    pub angular_deceleration: f64,    // rad/s^2
    pub radius: f64,                  // m, bounding sphere
    #[serde(default)]
    pub can_move_vertical: bool,
    #[serde(default)]
    pub dock_offset: Vector3<f64>,    // m, local dock port
    #[serde(default)]
    pub center_of_mass: Vector3<f64>, // m, local
    pub thrusters: Vec<ThrusterSpec>,
}

impl VehicleSpec {
    /// Distance covered while braking from `speed` at full deceleration.
    pub fn linear_stop_distance(&self, speed: f64) -> f64 {
        stop_distance(speed, self.linear_deceleration)
    }

    /// Angle covered while braking from angular rate `rate`.
    pub fn angular_stop_distance(&self, rate: f64) -> f64 {
        stop_distance(rate, self.angular_deceleration)
    }

    /// Speed under which the vehicle is considered stopped.
    pub fn negligible_speed(&self, ratio: f64) -> f64 {
        ratio * self.max_linear_velocity
    }

    pub fn negligible_angular_speed(&self, ratio: f64) -> f64 {
        ratio * self.max_angular_velocity
    }

    /// Weakest translational authority over the six body axes, m/s^2.
    pub fn rated_linear_deceleration(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        axis_directions()
            .iter()
            .map(|dir| {
                self.rcs()
                    .map(|t| t.max_thrust * t.axis.normalize().dot(dir).max(0.0))
                    .sum::<f64>()
            })
            .fold(f64::INFINITY, f64::min)
            / self.mass
    }

    /// Weakest rotational authority over the six body axes, rad/s^2.
    pub fn rated_angular_deceleration(&self, inertia: f64) -> f64 {
        if inertia <= 0.0 {
            return 0.0;
        }
        axis_directions()
            .iter()
            .map(|dir| {
                self.rcs()
                    .map(|t| {
                        let arm = t.mount - self.center_of_mass;
                        let torque = arm.cross(&t.axis.normalize()) * t.max_thrust;
                        torque.dot(dir).max(0.0)
                    })
                    .sum::<f64>()
            })
            .fold(f64::INFINITY, f64::min)
            / inertia
    }

    fn rcs(&self) -> impl Iterator<Item = &ThrusterSpec> {
        self.thrusters.iter().filter(|t| t.kind == ThrusterKind::Rcs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidVehicle {
            name: self.name.clone(),
            reason: reason.into(),
        };
        if self.mass <= 0.0 {
            return Err(invalid("mass must be positive"));
        }
        if self.max_linear_velocity <= 0.0 || self.max_angular_velocity <= 0.0 {
            return Err(invalid("rated velocities must be positive"));
        }
        if self.linear_deceleration <= 0.0 || self.angular_deceleration <= 0.0 {
            return Err(invalid("decelerations must be positive"));
        }
        if self.radius < 0.0 {
            return Err(invalid("radius must not be negative"));
        }
        Ok(())
    }

    /// Instantiate the mounted thrusters.
    pub fn build_thrusters(&self) -> Result<Vec<Thruster>, ConfigError> {
        self.thrusters.iter().cloned().map(Thruster::new).collect()
    }
}

fn stop_distance(speed: f64, decel: f64) -> f64 {
    if decel > 0.0 {
        speed * speed / (2.0 * decel)
    } else {
        f64::INFINITY
    }
}

fn axis_directions() -> [Vector3<f64>; 6] {
    [
        Vector3::x(),
        -Vector3::x(),
        Vector3::y(),
        -Vector3::y(),
        Vector3::z(),
        -Vector3::z(),
    ]
}

// ---------------------------------------------------------------------------
// Vehicle builder
// ---------------------------------------------------------------------------

pub struct VehicleSpecBuilder {
    name: String,
    mass: f64,
    max_linear_velocity: f64,
    max_angular_velocity: f64,
    linear_deceleration: f64,
    angular_deceleration: f64,
    radius: f64,
    can_move_vertical: bool,
    dock_offset: Vector3<f64>,
    center_of_mass: Vector3<f64>,
    thrusters: Vec<ThrusterSpec>,
}

impl VehicleSpecBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mass: 1000.0,
            max_linear_velocity: 20.0,
            max_angular_velocity: 1.0,
            linear_deceleration: 2.0,
            angular_deceleration: 4.0,
            radius: 3.0,
            can_move_vertical: true,
            dock_offset: Vector3::zeros(),
            center_of_mass: Vector3::zeros(),
            thrusters: vec![],
        }
    }

    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn max_linear_velocity(mut self, v: f64) -> Self { self.max_linear_velocity = v; self }
    pub fn max_angular_velocity(mut self, v: f64) -> Self { self.max_angular_velocity = v; self }
    pub fn linear_deceleration(mut self, v: f64) -> Self { self.linear_deceleration = v; self }
    pub fn angular_deceleration(mut self, v: f64) -> Self { self.angular_deceleration = v; self }
    pub fn radius(mut self, v: f64) -> Self { self.radius = v; self }
    pub fn can_move_vertical(mut self, v: bool) -> Self { self.can_move_vertical = v; self }
    pub fn dock_offset(mut self, v: Vector3<f64>) -> Self { self.dock_offset = v; self }
    pub fn center_of_mass(mut self, v: Vector3<f64>) -> Self { self.center_of_mass = v; self }
    pub fn thruster(mut self, t: ThrusterSpec) -> Self { self.thrusters.push(t); self }
    pub fn thrusters(mut self, ts: impl IntoIterator<Item = ThrusterSpec>) -> Self {
        self.thrusters.extend(ts);
        self
    }

    pub fn build(self) -> VehicleSpec {
        VehicleSpec {
            name: self.name,
            mass: self.mass,
            max_linear_velocity: self.max_linear_velocity,
            max_angular_velocity: self.max_angular_velocity,
            linear_deceleration: self.linear_deceleration,
            angular_deceleration: self.angular_deceleration,
            radius: self.radius,
            can_move_vertical: self.can_move_vertical,
            dock_offset: self.dock_offset,
            center_of_mass: self.center_of_mass,
            thrusters: self.thrusters,
        }
    }
}

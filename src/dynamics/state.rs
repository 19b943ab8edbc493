use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kinematic snapshot
// ---------------------------------------------------------------------------

/// Rigid-body state read from the physics layer at the start of a tick.
/// All vectors are world frame.
#[derive(Debug, Clone)]
pub struct Kinematics {
    pub pos: Vector3<f64>,          // m
    pub quat: UnitQuaternion<f64>,  // local→world rotation
    pub vel: Vector3<f64>,          // m/s
    pub omega: Vector3<f64>,        // rad/s
    pub mass: f64,                  // kg
    pub com: Vector3<f64>,          // m, world-space center of mass
}

impl Kinematics {
    /// Rotate a world-frame vector into the vehicle frame.
    pub fn to_local(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.quat.inverse_transform_vector(v)
    }

    /// Rotate a vehicle-frame vector into the world frame.
    pub fn to_world(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.quat.transform_vector(v)
    }

    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }

    pub fn angular_speed(&self) -> f64 {
        self.omega.norm()
    }
}

// ---------------------------------------------------------------------------
// Flight-control constants (vehicle independent)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub dead_distance: f64,              // m, residual position error treated as zero
    pub dead_angle: f64,                 // rad, residual attitude error treated as zero
    pub negligible_speed_ratio: f64,     // fraction of rated max speed treated as stopped
    pub angular_input_dead_ratio: f64,   // manual stick dead band
    pub response_time_factor: f64,       // allocator response time, in ticks
    pub world_inertia: f64,              // kg·m^2, scalar moment of inertia
    pub linear_alignment_limit: f64,     // cosine cone for linear thrust groups
    pub angular_alignment_limit: f64,    // cosine cone for torque groups
    pub velocity_epsilon: f64,           // m/s, below this no correction is commanded
    pub torque_arm_epsilon: f64,         // thrusters with |r × axis| below this give no torque
    pub obstacle_size_ceiling: f64,      // m, larger bodies are not path obstacles
    pub dock_standoff: f64,              // m, approach point distance from the dock port
    pub undock_distance: f64,            // m, egress distance after release
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            dead_distance: 0.1,
            dead_angle: 0.5_f64.to_radians(),
            negligible_speed_ratio: 0.05,
            angular_input_dead_ratio: 0.025,
            response_time_factor: 1.5,
            world_inertia: 1000.0,
            linear_alignment_limit: 0.0,
            angular_alignment_limit: 0.0,
            velocity_epsilon: 1e-4,
            torque_arm_epsilon: 1e-3,
            obstacle_size_ceiling: 1000.0,
            dock_standoff: 50.0,
            undock_distance: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,         // 20 Hz game tick
            max_time: 600.0,  // 10 min
        }
    }
}

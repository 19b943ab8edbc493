use nalgebra::Vector3;
use tracing::warn;

use super::body::RigidBody;

// ---------------------------------------------------------------------------
// Per-tick force/torque accumulator
// ---------------------------------------------------------------------------

/// Sums thruster forces and torques over one tick, then converts them into a
/// velocity update on the body.
#[derive(Debug, Clone, Default)]
pub struct ForceAccumulator {
    force: Vector3<f64>,   // N, world
    torque: Vector3<f64>,  // N·m, world
}

/// Accelerations produced by one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepAcceleration {
    pub linear: Vector3<f64>,   // m/s^2
    pub angular: Vector3<f64>,  // rad/s^2
}

impl ForceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a linear force, plus the torque that `torque_force` produces
    /// when applied at `point` on a body whose center of mass is `com`.
    pub fn add_force_at_location(
        &mut self,
        linear_force: Vector3<f64>,
        torque_force: Vector3<f64>,
        point: Vector3<f64>,
        com: Vector3<f64>,
    ) {
        self.force += linear_force;
        self.torque += (point - com).cross(&torque_force);
    }

    pub fn force(&self) -> Vector3<f64> {
        self.force
    }

    pub fn torque(&self) -> Vector3<f64> {
        self.torque
    }

    pub fn reset(&mut self) {
        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }

    /// Convert accumulated force/torque into accelerations, write the
    /// resulting velocities to the body and reset for the next tick.
    pub fn integrate<B: RigidBody + ?Sized>(
        &mut self,
        body: &mut B,
        world_inertia: f64,
        dt: f64,
    ) -> StepAcceleration {
        let mass = body.mass();
        let linear = if mass > 0.0 {
            self.force / mass
        } else {
            warn!(mass, "non-positive body mass, linear force ignored");
            Vector3::zeros()
        };
        let angular = if world_inertia > 0.0 {
            self.torque / world_inertia
        } else {
            Vector3::zeros()
        };

        body.set_linear_velocity(body.linear_velocity() + linear * dt);
        body.set_angular_velocity(body.angular_velocity() + angular * dt);

        self.reset();
        StepAcceleration { linear, angular }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::body::FreeBody;

    #[test]
    fn force_at_com_produces_no_torque() {
        let mut acc = ForceAccumulator::new();
        let f = Vector3::new(100.0, 0.0, 0.0);
        acc.add_force_at_location(f, f, Vector3::zeros(), Vector3::zeros());
        assert_eq!(acc.force(), f);
        assert!(acc.torque().norm() < 1e-12);
    }

    #[test]
    fn offset_force_produces_torque() {
        let mut acc = ForceAccumulator::new();
        let f = Vector3::new(0.0, 10.0, 0.0);
        acc.add_force_at_location(f, f, Vector3::new(2.0, 0.0, 0.0), Vector3::zeros());
        // r × F = (2,0,0) × (0,10,0) = (0,0,20)
        assert!((acc.torque() - Vector3::new(0.0, 0.0, 20.0)).norm() < 1e-12);
    }

    #[test]
    fn integrate_sets_velocity_and_resets() {
        let mut body = FreeBody::at_rest(Vector3::zeros(), 1000.0);
        body.vel = Vector3::new(1.0, 0.0, 0.0);
        let mut acc = ForceAccumulator::new();
        acc.add_force_at_location(
            Vector3::new(2000.0, 0.0, 0.0),
            Vector3::new(0.0, 500.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zeros(),
        );
        let step = acc.integrate(&mut body, 1000.0, 0.5);

        assert!((step.linear - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((body.vel - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
        // torque (0,0,500) / 1000 * 0.5
        assert!((body.omega - Vector3::new(0.0, 0.0, 0.25)).norm() < 1e-12);
        assert_eq!(acc.force(), Vector3::zeros());
        assert_eq!(acc.torque(), Vector3::zeros());
    }
}

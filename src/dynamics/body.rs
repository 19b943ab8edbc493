use nalgebra::{UnitQuaternion, Vector3};

use super::state::Kinematics;

// ---------------------------------------------------------------------------
// Physics-layer seam
// ---------------------------------------------------------------------------

/// What the flight core needs from the physics engine that owns the body.
///
/// Vectors are world frame. The core only ever writes velocities, except for
/// the exact snaps performed when a move or rotate command completes.
pub trait RigidBody {
    fn position(&self) -> Vector3<f64>;
    fn orientation(&self) -> UnitQuaternion<f64>;
    fn linear_velocity(&self) -> Vector3<f64>;
    fn angular_velocity(&self) -> Vector3<f64>;
    fn mass(&self) -> f64;
    /// World-space center of mass.
    fn center_of_mass(&self) -> Vector3<f64>;

    fn set_linear_velocity(&mut self, vel: Vector3<f64>);
    fn set_angular_velocity(&mut self, omega: Vector3<f64>);
    fn set_position(&mut self, pos: Vector3<f64>);
    fn set_orientation(&mut self, quat: UnitQuaternion<f64>);

    fn kinematics(&self) -> Kinematics {
        Kinematics {
            pos: self.position(),
            quat: self.orientation(),
            vel: self.linear_velocity(),
            omega: self.angular_velocity(),
            mass: self.mass(),
            com: self.center_of_mass(),
        }
    }
}

// ---------------------------------------------------------------------------
// Free-floating reference body
// ---------------------------------------------------------------------------

/// Minimal drag-free body used by the runner and tests in place of a real
/// physics engine. Positions advance with explicit Euler.
#[derive(Debug, Clone)]
pub struct FreeBody {
    pub pos: Vector3<f64>,
    pub quat: UnitQuaternion<f64>,
    pub vel: Vector3<f64>,
    pub omega: Vector3<f64>,
    pub mass: f64,
    pub com_offset: Vector3<f64>,   // local frame
}

impl FreeBody {
    pub fn at_rest(pos: Vector3<f64>, mass: f64) -> Self {
        Self {
            pos,
            quat: UnitQuaternion::identity(),
            vel: Vector3::zeros(),
            omega: Vector3::zeros(),
            mass,
            com_offset: Vector3::zeros(),
        }
    }

    /// Advance pose by one step using the current velocities.
    pub fn advance(&mut self, dt: f64) {
        self.pos += self.vel * dt;
        if self.omega.norm_squared() > 0.0 {
            self.quat = UnitQuaternion::from_scaled_axis(self.omega * dt) * self.quat;
        }
    }
}

impl RigidBody for FreeBody {
    fn position(&self) -> Vector3<f64> {
        self.pos
    }

    fn orientation(&self) -> UnitQuaternion<f64> {
        self.quat
    }

    fn linear_velocity(&self) -> Vector3<f64> {
        self.vel
    }

    fn angular_velocity(&self) -> Vector3<f64> {
        self.omega
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn center_of_mass(&self) -> Vector3<f64> {
        self.pos + self.quat * self.com_offset
    }

    fn set_linear_velocity(&mut self, vel: Vector3<f64>) {
        self.vel = vel;
    }

    fn set_angular_velocity(&mut self, omega: Vector3<f64>) {
        self.omega = omega;
    }

    fn set_position(&mut self, pos: Vector3<f64>) {
        self.pos = pos;
    }

    fn set_orientation(&mut self, quat: UnitQuaternion<f64>) {
        self.quat = quat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn advance_moves_along_velocity() {
        let mut b = FreeBody::at_rest(Vector3::zeros(), 10.0);
        b.vel = Vector3::new(2.0, 0.0, -1.0);
        b.advance(0.5);
        assert!((b.pos - Vector3::new(1.0, 0.0, -0.5)).norm() < 1e-12);
    }

    #[test]
    fn advance_rotates_about_world_axis() {
        let mut b = FreeBody::at_rest(Vector3::zeros(), 10.0);
        b.omega = Vector3::new(0.0, 0.0, PI);
        for _ in 0..10 {
            b.advance(0.05);
        }
        // Half a turn about Z: nose (+X) now points along -X
        let nose = b.quat * Vector3::x();
        assert!((nose - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-9, "nose = {}", nose);
        let norm = b.quat.quaternion().norm();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn center_of_mass_follows_orientation() {
        let mut b = FreeBody::at_rest(Vector3::new(5.0, 0.0, 0.0), 10.0);
        b.com_offset = Vector3::new(1.0, 0.0, 0.0);
        b.quat = UnitQuaternion::from_euler_angles(0.0, 0.0, PI / 2.0);
        assert!((b.center_of_mass() - Vector3::new(5.0, 1.0, 0.0)).norm() < 1e-12);
    }
}

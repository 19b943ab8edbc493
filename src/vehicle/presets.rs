use nalgebra::Vector3;

use super::spec::{VehicleSpec, VehicleSpecBuilder};
use super::thruster::{ThrusterKind, ThrusterSpec};

// ---------------------------------------------------------------------------
// Thruster layouts
// ---------------------------------------------------------------------------

/// 24-thruster RCS cluster: at each of the six faces (distance `arm` from the
/// origin) four thrusters push tangentially along the other two axes.
/// Every body axis gets four cooperating thrusters for translation and four
/// coupled pairs for rotation, with no net torque when translating.
pub fn rcs_cluster(max_thrust: f64, arm: f64) -> Vec<ThrusterSpec> {
    let axes = [("x", Vector3::x()), ("y", Vector3::y()), ("z", Vector3::z())];
    let mut out = Vec::with_capacity(24);
    for (face_name, face) in &axes {
        for face_sign in [1.0, -1.0] {
            for (push_name, push) in &axes {
                if push == face {
                    continue;
                }
                for push_sign in [1.0, -1.0] {
                    out.push(ThrusterSpec {
                        name: format!(
                            "rcs{}{}/{}{}",
                            sign_char(face_sign),
                            face_name,
                            sign_char(push_sign),
                            push_name
                        ),
                        kind: ThrusterKind::Rcs,
                        axis: push * push_sign,
                        mount: face * (face_sign * arm),
                        max_thrust,
                    });
                }
            }
        }
    }
    out
}

fn sign_char(s: f64) -> char {
    if s > 0.0 { '+' } else { '-' }
}

// ---------------------------------------------------------------------------
// Preset vehicles
// ---------------------------------------------------------------------------

/// Light utility shuttle: full 6-DOF RCS, free vertical motion.
pub fn shuttle() -> VehicleSpec {
    VehicleSpecBuilder::new("Shuttle")
        .mass(1000.0)
        .max_linear_velocity(20.0)
        .max_angular_velocity(1.0)
        .linear_deceleration(2.0)    // 4 x 500 N / 1000 kg
        .angular_deceleration(4.0)   // 4 x 500 N x 2 m / 1000 kg m^2
        .radius(3.0)
        .can_move_vertical(true)
        .dock_offset(Vector3::new(2.0, 0.0, 0.0))
        .thrusters(rcs_cluster(500.0, 2.0))
        .build()
}

/// Cargo freighter: heavier, no vertical translation, with a main drive.
pub fn freighter() -> VehicleSpec {
    VehicleSpecBuilder::new("Freighter")
        .mass(5000.0)
        .max_linear_velocity(15.0)
        .max_angular_velocity(0.5)
        .linear_deceleration(0.48)   // 4 x 600 N / 5000 kg
        .angular_deceleration(9.6)   // 4 x 600 N x 4 m / 1000 kg m^2
        .radius(8.0)
        .can_move_vertical(false)
        .dock_offset(Vector3::new(6.0, 0.0, 0.0))
        .thrusters(rcs_cluster(600.0, 4.0))
        .thruster(ThrusterSpec {
            name: "main".into(),
            kind: ThrusterKind::Orbital,
            axis: Vector3::x(),
            mount: Vector3::new(-6.0, 0.0, 0.0),
            max_thrust: 20_000.0,
        })
        .build()
}

use nalgebra::Vector3;
use tracing::trace;

use crate::dynamics::FlightConfig;
use crate::vehicle::Engine;

/// Ratios, torques and group capabilities below this are treated as zero.
const NEARLY_ZERO: f64 = 1e-8;

// ---------------------------------------------------------------------------
// Group capability along an axis
// ---------------------------------------------------------------------------

/// Combined thrust of every engine whose axis lies inside the cone
/// `dot > limit` around `axis`, each weighted by a linear ramp from the cone
/// edge (0) to perfect alignment (1).
pub fn group_max_thrust<E: Engine>(engines: &[E], axis: &Vector3<f64>, limit: f64) -> Vector3<f64> {
    let Some(axis) = axis.try_normalize(NEARLY_ZERO) else {
        return Vector3::zeros();
    };
    let span = (1.0 - limit).max(NEARLY_ZERO);
    engines
        .iter()
        .filter_map(|e| {
            let dir = e.thrust_axis();
            let dot = dir.dot(&axis);
            (dot > limit).then(|| dir * (e.max_thrust() * (dot - limit) / span))
        })
        .sum()
}

/// Combined torque about `com` of every steering engine whose torque
/// direction lies inside the cone `dot > limit` around `torque_axis`.
pub fn group_max_torque<E: Engine>(
    engines: &[E],
    torque_axis: &Vector3<f64>,
    com: &Vector3<f64>,
    limit: f64,
) -> Vector3<f64> {
    let Some(torque_axis) = torque_axis.try_normalize(NEARLY_ZERO) else {
        return Vector3::zeros();
    };
    let span = (1.0 - limit).max(NEARLY_ZERO);
    let mut total = Vector3::zeros();
    for e in engines {
        let max = e.max_thrust();
        if max == 0.0 || !e.steers() {
            continue;
        }
        let arm = e.mount_location() - com;
        let axis = e.thrust_axis();
        let Some(dir) = arm.cross(&axis).try_normalize(NEARLY_ZERO) else {
            continue;
        };
        let dot = torque_axis.dot(&dir);
        if dot > limit {
            total += arm.cross(&(axis * (max * (dot - limit) / span)));
        }
    }
    total
}

// ---------------------------------------------------------------------------
// Per-engine ratios
// ---------------------------------------------------------------------------

/// Linear pass: one ratio in [-1, 1] per engine driving the world velocity
/// toward `target_vel`.
pub fn linear_ratios<E: Engine>(
    engines: &[E],
    target_vel: &Vector3<f64>,
    current_vel: &Vector3<f64>,
    mass: f64,
    dt: f64,
    cfg: &FlightConfig,
) -> Vec<f64> {
    let response = cfg.response_time_factor * dt;
    if mass <= 0.0 || response <= 0.0 {
        return vec![0.0; engines.len()];
    }

    engines
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let axis = e.thrust_axis();
            let group = axis.dot(&group_max_thrust(engines, &axis, cfg.linear_alignment_limit));
            let delta = axis.dot(target_vel) - axis.dot(current_vel);
            if delta.abs() < cfg.velocity_epsilon {
                return 0.0;
            }
            if group.abs() < NEARLY_ZERO {
                trace!(engine = i, "no linear authority on axis");
                return 0.0;
            }
            let force = delta * mass / response;
            snap_zero((force / group).clamp(-1.0, 1.0))
        })
        .collect()
}

/// Angular pass: one ratio in [-1, 1] per engine driving the world angular
/// velocity toward `target_omega`. Non-steering engines and engines whose
/// thrust line passes through the center of mass get 0.
pub fn angular_ratios<E: Engine>(
    engines: &[E],
    target_omega: &Vector3<f64>,
    current_omega: &Vector3<f64>,
    com: &Vector3<f64>,
    dt: f64,
    cfg: &FlightConfig,
) -> Vec<f64> {
    let response = cfg.response_time_factor * dt;
    if response <= 0.0 {
        return vec![0.0; engines.len()];
    }

    engines
        .iter()
        .enumerate()
        .map(|(i, e)| {
            if !e.steers() {
                return 0.0;
            }
            let torque = (e.mount_location() - com).cross(&e.thrust_axis());
            if torque.norm() < cfg.torque_arm_epsilon {
                return 0.0;
            }
            let dir = torque.normalize();
            let group =
                dir.dot(&group_max_torque(engines, &dir, com, cfg.angular_alignment_limit));
            if group.abs() < NEARLY_ZERO {
                trace!(engine = i, "no angular authority on axis");
                return 0.0;
            }
            let delta = dir.dot(target_omega) - dir.dot(current_omega);
            if delta.abs() < cfg.velocity_epsilon {
                return 0.0;
            }
            let adjust = delta * cfg.world_inertia / response;
            snap_zero((adjust / group).clamp(-1.0, 1.0))
        })
        .collect()
}

fn snap_zero(x: f64) -> f64 {
    if x.abs() < NEARLY_ZERO { 0.0 } else { x }
}

// ---------------------------------------------------------------------------
// Combined allocation
// ---------------------------------------------------------------------------

/// Outcome of one allocation tick.
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub linear: Vec<f64>,
    pub angular: Vec<f64>,
}

impl Allocation {
    /// Per-engine command: the plain sum of both passes. The sum is not
    /// re-clamped and may leave [-1, 1].
    pub fn combined(&self) -> Vec<f64> {
        self.linear.iter().zip(&self.angular).map(|(l, a)| l + a).collect()
    }
}

/// World-frame targets and measurements for one allocation tick.
#[derive(Debug, Clone)]
pub struct AllocationInput {
    pub target_vel: Vector3<f64>,
    pub target_omega: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub omega: Vector3<f64>,
    pub com: Vector3<f64>,
    pub mass: f64,
}

/// Run both passes and push the ratios into the engines.
pub fn allocate<E: Engine>(
    engines: &mut [E],
    input: &AllocationInput,
    dt: f64,
    cfg: &FlightConfig,
) -> Allocation {
    let linear = linear_ratios(engines, &input.target_vel, &input.vel, input.mass, dt, cfg);
    let angular = angular_ratios(engines, &input.target_omega, &input.omega, &input.com, dt, cfg);
    for (e, (l, a)) in engines.iter_mut().zip(linear.iter().zip(&angular)) {
        e.set_target_linear_ratio(*l);
        e.set_target_angular_ratio(*a);
    }
    Allocation { linear, angular }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::{ForceAccumulator, FreeBody, RigidBody};
    use crate::vehicle::presets::rcs_cluster;
    use crate::vehicle::{Thruster, ThrusterKind, ThrusterSpec};

    fn thruster(axis: Vector3<f64>, mount: Vector3<f64>, max: f64) -> Thruster {
        Thruster::new(ThrusterSpec {
            name: "t".into(),
            kind: ThrusterKind::Rcs,
            axis,
            mount,
            max_thrust: max,
        })
        .unwrap()
    }

    fn cluster() -> Vec<Thruster> {
        rcs_cluster(500.0, 2.0).into_iter().map(|s| Thruster::new(s).unwrap()).collect()
    }

    #[test]
    fn group_thrust_excludes_orthogonal_and_opposed() {
        let engines = vec![
            thruster(Vector3::x(), Vector3::zeros(), 100.0),
            thruster(Vector3::x(), Vector3::zeros(), 50.0),
            thruster(-Vector3::x(), Vector3::zeros(), 100.0),
            thruster(Vector3::y(), Vector3::zeros(), 100.0),
        ];
        let g = group_max_thrust(&engines, &Vector3::x(), 0.0);
        assert!((g - Vector3::new(150.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn group_thrust_ramps_inside_cone() {
        let tilted = Vector3::new(1.0, 1.0, 0.0).normalize(); // dot = 0.707
        let engines = vec![thruster(tilted, Vector3::zeros(), 100.0)];
        let g = group_max_thrust(&engines, &Vector3::x(), 0.5);
        let ramp = (tilted.x - 0.5) / 0.5;
        assert!((g - tilted * 100.0 * ramp).norm() < 1e-9);
        // Outside a tighter cone it contributes nothing
        assert_eq!(group_max_thrust(&engines, &Vector3::x(), 0.8), Vector3::zeros());
    }

    #[test]
    fn group_torque_collects_couples() {
        let engines = cluster();
        let g = group_max_torque(&engines, &Vector3::z(), &Vector3::zeros(), 0.0);
        // Four thrusters of 500 N on a 2 m arm
        assert!((g - Vector3::new(0.0, 0.0, 4000.0)).norm() < 1e-9, "g = {}", g);
    }

    #[test]
    fn main_drive_adds_no_torque_authority() {
        let cfg = FlightConfig::default();
        let mut engines = cluster();
        // Off-axis main drive: its couple about +Z would be 2000 N m
        engines.push(
            Thruster::new(ThrusterSpec {
                name: "main".into(),
                kind: ThrusterKind::Orbital,
                axis: Vector3::y(),
                mount: Vector3::new(1.0, 0.0, 0.0),
                max_thrust: 2000.0,
            })
            .unwrap(),
        );
        let g = group_max_torque(&engines, &Vector3::z(), &Vector3::zeros(), 0.0);
        assert!((g - Vector3::new(0.0, 0.0, 4000.0)).norm() < 1e-9, "g = {}", g);

        let with_main = angular_ratios(&engines, &Vector3::new(0.0, 0.0, 0.1), &Vector3::zeros(), &Vector3::zeros(), 0.05, &cfg);
        let rcs_only = angular_ratios(&cluster(), &Vector3::new(0.0, 0.0, 0.1), &Vector3::zeros(), &Vector3::zeros(), 0.05, &cfg);
        assert_eq!(with_main[engines.len() - 1], 0.0);
        assert_eq!(&with_main[..rcs_only.len()], &rcs_only[..]);
    }

    #[test]
    fn single_thruster_example() {
        let cfg = FlightConfig::default();
        let dt = 0.05;
        let mut engines = vec![thruster(Vector3::x(), Vector3::zeros(), 10_000.0)];
        let mut body = FreeBody::at_rest(Vector3::zeros(), 1000.0);
        let mut acc = ForceAccumulator::new();
        let target = Vector3::new(5.0, 0.0, 0.0);

        let mut prev_remaining = f64::INFINITY;
        for tick in 0..60 {
            let input = AllocationInput {
                target_vel: target,
                target_omega: Vector3::zeros(),
                vel: body.vel,
                omega: body.omega,
                com: body.center_of_mass(),
                mass: body.mass,
            };
            let alloc = allocate(&mut engines, &input, dt, &cfg);
            let ratio = alloc.linear[0];
            assert_eq!(alloc.angular[0], 0.0, "thrust through the COM gives no torque");
            assert!(ratio >= 0.0 && ratio <= 1.0, "tick {}: ratio {}", tick, ratio);
            if tick == 0 {
                assert!(ratio > 0.0);
            }

            let e = &engines[0];
            acc.add_force_at_location(e.force(), e.force(), e.mount_location(), body.center_of_mass());
            acc.integrate(&mut body, cfg.world_inertia, dt);

            let remaining = target.x - body.vel.x;
            assert!(remaining >= -1e-9, "tick {}: overshoot to {}", tick, body.vel.x);
            assert!(remaining <= prev_remaining, "tick {}: delta grew", tick);
            prev_remaining = remaining;
        }
        assert!(prev_remaining < 1e-3, "should converge, remaining {}", prev_remaining);
    }

    #[test]
    fn ratios_stay_bounded_for_huge_deltas() {
        let cfg = FlightConfig::default();
        let engines = cluster();
        let com = Vector3::zeros();
        for scale in [1e-3, 1.0, 1e3, 1e9] {
            let target = Vector3::new(1.0, -2.0, 0.5) * scale;
            let lin = linear_ratios(&engines, &target, &Vector3::zeros(), 1000.0, 0.05, &cfg);
            let ang = angular_ratios(&engines, &target, &Vector3::zeros(), &com, 0.05, &cfg);
            for r in lin.iter().chain(&ang) {
                assert!((-1.0..=1.0).contains(r), "ratio {} out of range at scale {}", r, scale);
            }
        }
    }

    #[test]
    fn small_delta_gives_exact_zero() {
        let cfg = FlightConfig::default();
        let engines = cluster();
        let v = Vector3::new(3.0, 0.0, 0.0);
        let lin = linear_ratios(&engines, &(v + Vector3::new(1e-6, 0.0, 0.0)), &v, 1000.0, 0.05, &cfg);
        assert!(lin.iter().all(|r| *r == 0.0));
    }

    #[test]
    fn no_authority_axis_is_zero_not_error() {
        let cfg = FlightConfig::default();
        // Only +X thrust: asking for -X has nobody in the group of the -X axis,
        // and the +X thruster is told to back off (negative ratio).
        let engines = vec![thruster(Vector3::x(), Vector3::zeros(), 100.0)];
        let lin = linear_ratios(&engines, &Vector3::new(-1.0, 0.0, 0.0), &Vector3::zeros(), 100.0, 0.1, &cfg);
        assert_eq!(lin, vec![-1.0]);

        // Angular: a lone off-center thruster has authority only one way
        let engines = vec![thruster(Vector3::y(), Vector3::new(1.0, 0.0, 0.0), 100.0)];
        let ang = angular_ratios(&engines, &Vector3::new(0.0, 0.0, 1.0), &Vector3::zeros(), &Vector3::zeros(), 0.1, &cfg);
        assert!(ang[0] > 0.0);
        let zero_thrust = vec![thruster(Vector3::y(), Vector3::new(1.0, 0.0, 0.0), 0.0)];
        let ang = angular_ratios(&zero_thrust, &Vector3::z(), &Vector3::zeros(), &Vector3::zeros(), 0.1, &cfg);
        assert_eq!(ang, vec![0.0]);
    }

    #[test]
    fn cluster_translation_produces_no_torque() {
        let cfg = FlightConfig::default();
        let mut engines = cluster();
        let input = AllocationInput {
            target_vel: Vector3::new(0.3, 0.0, 0.0),
            target_omega: Vector3::zeros(),
            vel: Vector3::zeros(),
            omega: Vector3::zeros(),
            com: Vector3::zeros(),
            mass: 1000.0,
        };
        let alloc = allocate(&mut engines, &input, 0.05, &cfg);
        assert!(alloc.angular.iter().all(|r| *r == 0.0));

        let mut acc = ForceAccumulator::new();
        for e in &engines {
            acc.add_force_at_location(e.force(), e.force(), e.mount_location(), Vector3::zeros());
        }
        assert!(acc.force().x > 0.0);
        assert!(acc.force().y.abs() < 1e-9 && acc.force().z.abs() < 1e-9);
        assert!(acc.torque().norm() < 1e-9, "torque {}", acc.torque());
    }

    #[test]
    fn combined_is_plain_sum() {
        let a = Allocation { linear: vec![0.8, -0.5], angular: vec![0.7, 0.2] };
        let c = a.combined();
        assert!((c[0] - 1.5).abs() < 1e-12);
        assert!((c[1] + 0.3).abs() < 1e-12);
    }
}

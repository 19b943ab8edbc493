use nalgebra::{UnitQuaternion, Vector3};
use tracing::debug;

use super::obstacle::ObstacleCandidate;
use crate::error::NavError;

const GEOM_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Recursive go-around path planner
// ---------------------------------------------------------------------------

/// Plan waypoints from `origin` to `target` around spherical obstacles.
///
/// The straight leg is tested against each obstacle in input order; the first
/// one it hits is bypassed through a single point on its effective sphere,
/// then both halves are planned again without that obstacle. Returns the
/// intermediate waypoints in travel order (empty when the direct leg is
/// clear), or `PlanningFailure` on any dead end.
pub fn plan(
    origin: Vector3<f64>,
    target: Vector3<f64>,
    vehicle_radius: f64,
    obstacles: &[ObstacleCandidate],
) -> Result<Vec<Vector3<f64>>, NavError> {
    let candidates: Vec<usize> = (0..obstacles.len()).collect();
    let mut path = Vec::new();
    if split(origin, target, vehicle_radius, obstacles, &candidates, &mut path) {
        debug!(waypoints = path.len(), obstacles = obstacles.len(), "path planned");
        Ok(path)
    } else {
        debug!(obstacles = obstacles.len(), "path planning dead end");
        Err(NavError::PlanningFailure)
    }
}

/// `candidates` indexes the obstacles not yet bypassed on this branch; a
/// go-around point is checked against every obstacle but the one it bypasses.
fn split(
    origin: Vector3<f64>,
    target: Vector3<f64>,
    vehicle_radius: f64,
    obstacles: &[ObstacleCandidate],
    candidates: &[usize],
    path: &mut Vec<Vector3<f64>>,
) -> bool {
    for &i in candidates {
        let obstacle = &obstacles[i];
        let radius = obstacle.effective_radius(vehicle_radius);
        if !segment_hits_sphere(&origin, &target, &obstacle.center, radius) {
            continue;
        }

        // Leg crosses the center: no radial direction to escape along
        let Some(waypoint) = go_around_point(&origin, &target, &obstacle.center, radius) else {
            debug!(obstacle = %obstacle.id, "leg crosses obstacle center");
            return false;
        };

        let blocker = obstacles
            .iter()
            .enumerate()
            .find(|(j, o)| *j != i && o.contains(&waypoint, vehicle_radius));
        if let Some((_, blocker)) = blocker {
            debug!(obstacle = %obstacle.id, blocker = %blocker.id, "go-around point blocked");
            return false;
        }

        let remaining: Vec<usize> = candidates.iter().copied().filter(|&j| j != i).collect();
        let mut first = Vec::new();
        let mut second = Vec::new();
        if !split(origin, waypoint, vehicle_radius, obstacles, &remaining, &mut first)
            || !split(waypoint, target, vehicle_radius, obstacles, &remaining, &mut second)
        {
            return false;
        }
        path.extend(first);
        path.push(waypoint);
        path.extend(second);
        return true;
    }
    true
}

/// Whether travelling from `origin` to `target` enters the sphere.
///
/// The first entry point along the ray must lie within the leg; a leg that
/// starts inside the sphere is not considered blocked by it.
pub fn segment_hits_sphere(
    origin: &Vector3<f64>,
    target: &Vector3<f64>,
    center: &Vector3<f64>,
    radius: f64,
) -> bool {
    let travel = target - origin;
    let length = travel.norm();
    if length < GEOM_EPSILON {
        return false;
    }
    let dir = travel / length;
    let to_center = center - origin;
    let along = dir.dot(&to_center);
    let disc = radius * radius - (to_center.norm_squared() - along * along);
    if disc < 0.0 {
        return false;
    }
    let entry = along - disc.sqrt();
    (0.0..=length).contains(&entry)
}

/// Bypass point: intersect the leg with the plane through `center` facing the
/// target, then push that point radially onto the sphere surface.
fn go_around_point(
    origin: &Vector3<f64>,
    target: &Vector3<f64>,
    center: &Vector3<f64>,
    radius: f64,
) -> Option<Vector3<f64>> {
    let travel = target - origin;
    let normal = target - center;
    let denom = normal.dot(&travel);
    let crossing = if denom.abs() > GEOM_EPSILON {
        origin + travel * (normal.dot(&(center - origin)) / denom)
    } else {
        // Leg parallel to the plane: use the point of closest approach
        let t = (center - origin).dot(&travel) / travel.norm_squared().max(GEOM_EPSILON);
        origin + travel * t
    };
    let radial = (crossing - center).try_normalize(1e-6)?;
    Some(center + radial * radius)
}

// ---------------------------------------------------------------------------
// Orientation helpers
// ---------------------------------------------------------------------------

/// Orientation whose +X (nose) points along `dir`, with no roll.
pub fn facing(dir: &Vector3<f64>) -> UnitQuaternion<f64> {
    if dir.norm() < GEOM_EPSILON {
        return UnitQuaternion::identity();
    }
    let yaw = dir.y.atan2(dir.x);
    let pitch = dir.z.atan2((dir.x * dir.x + dir.y * dir.y).sqrt());
    UnitQuaternion::from_euler_angles(0.0, -pitch, yaw)
}

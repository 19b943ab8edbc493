use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// World snapshots
// ---------------------------------------------------------------------------

/// A world entity as reported by the world-query layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: String,
    pub center: Vector3<f64>,  // m, bounding-sphere center
    pub radius: f64,           // m, bounding-sphere radius
    pub movable: bool,
}

/// A sphere the path planner must route around. Rebuilt for every
/// navigation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleCandidate {
    pub id: String,
    pub center: Vector3<f64>,
    pub radius: f64,
}

impl ObstacleCandidate {
    pub fn new(id: impl Into<String>, center: Vector3<f64>, radius: f64) -> Self {
        Self { id: id.into(), center, radius }
    }

    /// Radius grown by the size of the vehicle that must clear it.
    pub fn effective_radius(&self, vehicle_radius: f64) -> f64 {
        self.radius + vehicle_radius
    }

    /// Whether `point` lies strictly inside the effective sphere.
    pub fn contains(&self, point: &Vector3<f64>, vehicle_radius: f64) -> bool {
        (point - self.center).norm() < self.effective_radius(vehicle_radius)
    }
}

/// Select path obstacles from a world snapshot: movable entities below the
/// size ceiling, minus the excluded identities (the navigating ship itself,
/// a station being docked to).
pub fn scan(entities: &[EntitySnapshot], size_ceiling: f64, exclude: &[&str]) -> Vec<ObstacleCandidate> {
    entities
        .iter()
        .filter(|e| e.movable && e.radius < size_ceiling)
        .filter(|e| !exclude.contains(&e.id.as_str()))
        .map(|e| ObstacleCandidate::new(e.id.clone(), e.center, e.radius))
        .collect()
}

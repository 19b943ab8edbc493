use crate::dock::{SimpleStation, Station};
use crate::nav::EntitySnapshot;

// ---------------------------------------------------------------------------
// World-query seam
// ---------------------------------------------------------------------------

/// What the flight core may ask of the world: a snapshot of entities for
/// obstacle discovery, and dockable stations by name.
pub trait World {
    fn entities(&self) -> Vec<EntitySnapshot>;
    fn station_mut(&mut self, name: &str) -> Option<&mut dyn Station>;
}

/// In-memory world of stations and loose bodies.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    pub stations: Vec<SimpleStation>,
    pub bodies: Vec<EntitySnapshot>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_station(mut self, station: SimpleStation) -> Self {
        self.stations.push(station);
        self
    }

    pub fn with_body(mut self, body: EntitySnapshot) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn station(&self, name: &str) -> Option<&SimpleStation> {
        self.stations.iter().find(|s| s.name == name)
    }
}

impl World for SimWorld {
    fn entities(&self) -> Vec<EntitySnapshot> {
        self.stations
            .iter()
            .map(SimpleStation::snapshot)
            .chain(self.bodies.iter().cloned())
            .collect()
    }

    fn station_mut(&mut self, name: &str) -> Option<&mut dyn Station> {
        self.stations
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| s as &mut dyn Station)
    }
}

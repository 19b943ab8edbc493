use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::nav::{facing, EntitySnapshot};

// ---------------------------------------------------------------------------
// Station side of the protocol
// ---------------------------------------------------------------------------

/// A free dock port offered by a station.
///
/// `frame` is the port's world orientation; its +X axis is the dock normal,
/// pointing out of the station.
#[derive(Debug, Clone, PartialEq)]
pub struct DockGrant {
    pub slot: u32,
    pub port: Vector3<f64>,
    pub frame: UnitQuaternion<f64>,
}

/// A dockable entity as seen by the flight core.
pub trait Station {
    fn name(&self) -> &str;

    /// Admission decision. `None` means the request is denied.
    fn request_dock(&mut self, ship: &str) -> Option<DockGrant>;

    /// Finalize the mate of `ship` in `slot`.
    fn dock(&mut self, ship: &str, slot: u32);

    /// Free `slot` after `ship` leaves.
    fn release_dock(&mut self, ship: &str, slot: u32);
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Approach and mate geometry negotiated for one docking request. Consumed
/// immediately to build the approach command sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DockingContract {
    pub granted: bool,
    pub station: String,
    pub slot: u32,
    pub approach: Vector3<f64>,          // standoff point on the dock normal
    pub mate: Vector3<f64>,              // ship position when mated
    pub orientation: UnitQuaternion<f64>,// ship attitude for the final leg
}

impl DockingContract {
    pub fn denied(station: impl Into<String>) -> Self {
        Self {
            granted: false,
            station: station.into(),
            slot: 0,
            approach: Vector3::zeros(),
            mate: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Ask `station` for a port and derive the approach geometry.
    ///
    /// The mate point is the port shifted by the ship's own dock-port offset
    /// expressed in the port frame; the approach point sits `standoff` further
    /// out along the dock normal. The ship flies the last leg nose first.
    pub fn negotiate(
        station: &mut dyn Station,
        ship: &str,
        dock_offset: &Vector3<f64>,
        standoff: f64,
    ) -> Self {
        let Some(grant) = station.request_dock(ship) else {
            debug!(station = station.name(), ship, "docking request denied");
            return Self::denied(station.name());
        };
        let normal = grant.frame * Vector3::x();
        let mate = grant.port + grant.frame * dock_offset;
        let approach = mate + normal * standoff;
        Self {
            granted: true,
            station: station.name().to_string(),
            slot: grant.slot,
            approach,
            mate,
            orientation: facing(&(mate - approach)),
        }
    }
}

/// Where a docked ship is attached. This is the durable part of the docking
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockRecord {
    pub station: String,
    pub slot: u32,
}

// ---------------------------------------------------------------------------
// Reference station
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DockSlot {
    pub position: Vector3<f64>,          // m, station frame
    pub frame: UnitQuaternion<f64>,      // station frame, +X = dock normal
    pub occupant: Option<String>,
}

/// Station with a fixed set of dock slots; denies when every slot is taken.
#[derive(Debug, Clone)]
pub struct SimpleStation {
    pub name: String,
    pub pos: Vector3<f64>,
    pub quat: UnitQuaternion<f64>,
    pub radius: f64,
    pub slots: Vec<DockSlot>,
}

impl SimpleStation {
    pub fn new(name: impl Into<String>, pos: Vector3<f64>, radius: f64) -> Self {
        Self {
            name: name.into(),
            pos,
            quat: UnitQuaternion::identity(),
            radius,
            slots: vec![],
        }
    }

    /// Add a port at `position` (station frame) whose normal points along
    /// `normal`.
    pub fn with_slot(mut self, position: Vector3<f64>, normal: Vector3<f64>) -> Self {
        self.slots.push(DockSlot {
            position,
            frame: facing(&normal),
            occupant: None,
        });
        self
    }

    pub fn occupant(&self, slot: u32) -> Option<&str> {
        self.slots.get(slot as usize)?.occupant.as_deref()
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.occupant.is_none()).count()
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.name.clone(),
            center: self.pos,
            radius: self.radius,
            movable: true,
        }
    }
}

impl Station for SimpleStation {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_dock(&mut self, ship: &str) -> Option<DockGrant> {
        let (i, slot) = self.slots.iter().enumerate().find(|(_, s)| s.occupant.is_none())?;
        debug!(station = %self.name, ship, slot = i, "docking request granted");
        Some(DockGrant {
            slot: i as u32,
            port: self.pos + self.quat * slot.position,
            frame: self.quat * slot.frame,
        })
    }

    fn dock(&mut self, ship: &str, slot: u32) {
        if let Some(s) = self.slots.get_mut(slot as usize) {
            s.occupant = Some(ship.to_string());
            info!(station = %self.name, ship, slot, "ship docked");
        }
    }

    fn release_dock(&mut self, ship: &str, slot: u32) {
        if let Some(s) = self.slots.get_mut(slot as usize) {
            if s.occupant.as_deref() == Some(ship) {
                s.occupant = None;
                info!(station = %self.name, ship, slot, "ship released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> SimpleStation {
        SimpleStation::new("Alpha", Vector3::new(1000.0, 0.0, 0.0), 40.0)
            .with_slot(Vector3::new(0.0, 40.0, 0.0), Vector3::y())
            .with_slot(Vector3::new(0.0, -40.0, 0.0), -Vector3::y())
    }

    #[test]
    fn contract_geometry() {
        let mut st = station();
        let c = DockingContract::negotiate(&mut st, "ship", &Vector3::new(2.0, 0.0, 0.0), 50.0);
        assert!(c.granted);
        assert_eq!(c.slot, 0);
        // Port at (1000, 40, 0) facing +Y; ship port 2 m ahead of its center
        assert!((c.mate - Vector3::new(1000.0, 42.0, 0.0)).norm() < 1e-9, "mate {}", c.mate);
        assert!((c.approach - Vector3::new(1000.0, 92.0, 0.0)).norm() < 1e-9);
        let nose = c.orientation * Vector3::x();
        assert!((nose + Vector3::y()).norm() < 1e-9, "final leg flown nose first into the port");
    }

    #[test]
    fn full_station_denies() {
        let mut st = station();
        st.dock("a", 0);
        st.dock("b", 1);
        assert_eq!(st.free_slots(), 0);
        let c = DockingContract::negotiate(&mut st, "c", &Vector3::zeros(), 50.0);
        assert!(!c.granted);
        assert_eq!(c.station, "Alpha");
    }

    #[test]
    fn release_frees_only_own_slot() {
        let mut st = station();
        st.dock("a", 0);
        st.release_dock("b", 0);
        assert_eq!(st.occupant(0), Some("a"));
        st.release_dock("a", 0);
        assert_eq!(st.occupant(0), None);
        assert_eq!(st.request_dock("b").map(|g| g.slot), Some(0));
    }
}

use nalgebra::{UnitQuaternion, Vector3};

use crate::dynamics::{FreeBody, SimConfig};
use crate::pilot::PilotMode;
use crate::ship::Ship;
use super::world::World;

// ---------------------------------------------------------------------------
// Telemetry sample
// ---------------------------------------------------------------------------

/// Ship and body state recorded after each step.
#[derive(Debug, Clone)]
pub struct Sample {
    pub time: f64,
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub quat: UnitQuaternion<f64>,
    pub omega: Vector3<f64>,
    pub mode: PilotMode,
    pub pending: usize,
}

impl Sample {
    pub fn record(ship: &Ship, body: &FreeBody) -> Self {
        Self {
            time: ship.time(),
            pos: body.pos,
            vel: body.vel,
            quat: body.quat,
            omega: body.omega,
            mode: ship.mode(),
            pending: ship.queue().len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stepping
// ---------------------------------------------------------------------------

/// One flight-control tick followed by the pose update the physics layer
/// would perform.
pub fn step(ship: &mut Ship, body: &mut FreeBody, world: &mut dyn World, dt: f64) {
    ship.tick(body, world, dt);
    if !ship.is_docked() {
        body.advance(dt);
    }
}

/// Step until the command queue is empty or `max_time` has elapsed.
/// Returns the samples, starting with the initial state.
pub fn run_until_idle(
    ship: &mut Ship,
    body: &mut FreeBody,
    world: &mut dyn World,
    config: &SimConfig,
) -> Vec<Sample> {
    let steps = (config.max_time / config.dt).round() as usize;
    let mut samples = Vec::with_capacity((steps + 1).min(200_000));
    samples.push(Sample::record(ship, body));

    for _ in 0..steps {
        if ship.queue().is_empty() {
            break;
        }
        step(ship, body, world, config.dt);
        samples.push(Sample::record(ship, body));
    }
    samples
}

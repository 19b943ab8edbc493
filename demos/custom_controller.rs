use nalgebra::Vector3;

use ship_pilot::dynamics::{FlightConfig, Kinematics, SimConfig};
use ship_pilot::gnc::{AttitudeController, AttitudeOutput, Controller};
use ship_pilot::pilot::Command;
use ship_pilot::sim::{self, SimWorld};
use ship_pilot::vehicle::{presets, VehicleSpec};
use ship_pilot::Ship;

/// Default pursuit with the linear target capped at a fraction of the rated
/// top speed.
struct CruiseController {
    inner: AttitudeController,
    cruise_ratio: f64,
}

impl Controller for CruiseController {
    fn update(
        &mut self,
        command: &Command,
        kin: &Kinematics,
        spec: &VehicleSpec,
        cfg: &FlightConfig,
    ) -> AttitudeOutput {
        let mut out = self.inner.update(command, kin, spec, cfg);
        let cap = self.cruise_ratio * spec.max_linear_velocity;
        if out.linear.norm() > cap {
            out.linear = out.linear.normalize() * cap;
        }
        out
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn name(&self) -> &str {
        "Cruise"
    }
}

fn fly(ship: &mut Ship) -> (f64, f64) {
    let mut body = ship.free_body(Vector3::zeros());
    let config = SimConfig { dt: 0.05, max_time: 600.0 };
    ship.enqueue_move_to(Vector3::new(800.0, 0.0, 0.0)).unwrap();
    let samples = sim::run_until_idle(ship, &mut body, &mut SimWorld::new(), &config);
    let max_speed = samples.iter().map(|s| s.vel.norm()).fold(0.0_f64, f64::max);
    (ship.time(), max_speed)
}

fn main() {
    let controller = CruiseController {
        inner: AttitudeController::new(),
        cruise_ratio: 0.5,
    };
    println!("Flying 800 m with the default and {} controllers...", controller.name());

    let mut default_ship = Ship::new("Default", presets::shuttle(), FlightConfig::default()).unwrap();
    let mut cruise_ship = Ship::new("Cruise", presets::shuttle(), FlightConfig::default())
        .unwrap()
        .with_controller(Box::new(controller));

    let (t_default, v_default) = fly(&mut default_ship);
    let (t_cruise, v_cruise) = fly(&mut cruise_ship);

    println!("Default: {:.1} s, max speed {:.1} m/s", t_default, v_default);
    println!("Cruise:  {:.1} s, max speed {:.1} m/s", t_cruise, v_cruise);
}

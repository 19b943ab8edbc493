use nalgebra::Vector3;
use tracing::Level;

use ship_pilot::dock::SimpleStation;
use ship_pilot::dynamics::{FlightConfig, SimConfig};
use ship_pilot::io::csv;
use ship_pilot::logging::{init_logging, parse_log_level};
use ship_pilot::nav::EntitySnapshot;
use ship_pilot::sim::{self, EventKind, Sample, SimWorld};
use ship_pilot::vehicle::presets;
use ship_pilot::Ship;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var("SHIP_PILOT_LOG").map(|s| parse_log_level(&s)).unwrap_or(Level::WARN);
    init_logging(level)?;
    let csv_path = std::env::args().nth(1);

    // -----------------------------------------------------------------------
    // Scenario: shuttle docks at "Alpha" past a drifting rock, then leaves
    // -----------------------------------------------------------------------
    let mut world = SimWorld::new()
        .with_station(
            SimpleStation::new("Alpha", Vector3::new(600.0, 0.0, 0.0), 40.0)
                .with_slot(Vector3::new(-40.0, 0.0, 0.0), -Vector3::x())
                .with_slot(Vector3::new(40.0, 0.0, 0.0), Vector3::x()),
        )
        .with_body(EntitySnapshot {
            id: "rock-17".into(),
            center: Vector3::new(200.0, 5.0, 0.0),
            radius: 20.0,
            movable: true,
        });

    let mut ship = Ship::new("Kestrel", presets::shuttle(), FlightConfig::default())?;
    let mut body = ship.free_body(Vector3::zeros());
    let config = SimConfig::default();

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------
    let contract = ship.request_dock(&body, &mut world, "Alpha")?;
    let plan: Vec<String> = ship.queue().iter().map(|c| c.kind().to_string()).collect();
    let mut samples = sim::run_until_idle(&mut ship, &mut body, &mut world, &config);
    let docked_at = ship.time();

    ship.undock(&body, &mut world)?;
    let egress = sim::run_until_idle(&mut ship, &mut body, &mut world, &config);
    samples.extend(egress.into_iter().skip(1));

    let events = ship.drain_events();

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    let spec = ship.spec();
    println!();
    println!("====================================================================");
    println!("  SHIP FLIGHT CONTROL: {} ({})", ship.name(), spec.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.1} kg    Thrusters:    {:>8}",
        spec.mass,
        ship.thrusters().len()
    );
    println!(
        "  Max speed:     {:>8.1} m/s   Max rate:     {:>8.2} rad/s",
        spec.max_linear_velocity, spec.max_angular_velocity
    );
    println!(
        "  Decel:         {:>8.2} m/s^2 Ang. decel:   {:>8.2} rad/s^2",
        spec.linear_deceleration, spec.angular_deceleration
    );
    println!();

    println!("  Docking Contract");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Station {} slot {}", contract.station, contract.slot);
    println!(
        "  Approach  ({:>7.1}, {:>7.1}, {:>7.1})   Mate  ({:>7.1}, {:>7.1}, {:>7.1})",
        contract.approach.x, contract.approach.y, contract.approach.z,
        contract.mate.x, contract.mate.y, contract.mate.z
    );
    println!("  Queued: {}", plan.join(" → "));
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in &events {
        let text = match &e.kind {
            EventKind::CommandPushed(k) => format!("push    {}", k),
            EventKind::CommandCleared(k) => format!("clear   {}", k),
            EventKind::ModeChanged { from, to } => format!("mode    {} → {}", from, to),
            EventKind::PilotError => "PILOT ERROR (rotation diverging)".to_string(),
            EventKind::Docked { station, slot } => format!("DOCKED  {} slot {}", station, slot),
            EventKind::Undocked { station } => format!("UNDOCK  {}", station),
            EventKind::DockDenied { station } => format!("DENIED  {}", station),
            EventKind::PlanningFailed => "NO PATH".to_string(),
        };
        println!("  t={:>7.2}s   {}", e.time, text);
    }
    println!();

    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    let max_speed = samples.iter().map(|s| s.vel.norm()).fold(0.0_f64, f64::max);
    let closest_rock = samples
        .iter()
        .map(|s| (s.pos - Vector3::new(200.0, 5.0, 0.0)).norm())
        .fold(f64::INFINITY, f64::min);
    println!("  Docked after:  {:>8.1} s", docked_at);
    println!("  Max speed:     {:>8.2} m/s", max_speed);
    println!("  Rock clearance:{:>8.1} m   (rock radius 20 m, ship radius {} m)", closest_rock, spec.radius);
    println!(
        "  Final pos:     ({:.1}, {:.1}, {:.1})   mode {}",
        body.pos.x, body.pos.y, body.pos.z,
        ship.mode()
    );
    println!();

    print_trajectory(&samples);

    if let Some(path) = csv_path {
        csv::write_telemetry_file(&path, &samples)?;
        println!("  Telemetry written to {}", path);
    }
    println!("  Simulation: {} samples, dt={} s", samples.len(), config.dt);
    println!("====================================================================");
    println!();
    Ok(())
}

fn print_trajectory(samples: &[Sample]) {
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>8}  {:>8}  {:>10}  {:>4}",
        "t (s)", "x (m)", "y (m)", "z (m)", "v (m/s)", "mode", "cmds"
    );
    println!("  {}", "─".repeat(64));

    let interval = (samples.len() / 30).max(1);
    for (i, s) in samples.iter().enumerate() {
        if i % interval != 0 && i != samples.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>8.1}  {:>8.1}  {:>8.1}  {:>8.2}  {:>10}  {:>4}",
            s.time,
            s.pos.x,
            s.pos.y,
            s.pos.z,
            s.vel.norm(),
            s.mode.to_string(),
            s.pending
        );
    }
    println!();
}

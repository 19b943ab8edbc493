use nalgebra::{UnitQuaternion, Vector2, Vector3};
use tracing::{debug, info, warn};

use crate::dock::{DockRecord, DockingContract};
use crate::dynamics::{FlightConfig, ForceAccumulator, FreeBody, Kinematics, RigidBody, StepAcceleration};
use crate::error::{ConfigError, DockError, NavError};
use crate::gnc::{allocate, AllocationInput, AttitudeController, Completion, Controller};
use crate::io::save::ShipSave;
use crate::nav::{facing, plan, scan, EntitySnapshot};
use crate::pilot::{Command, CommandQueue, ModeChange, PilotMode};
use crate::sim::event::{EventKind, EventLog, FlightEvent};
use crate::sim::World;
use crate::vehicle::{Engine, Thruster, VehicleSpec};

// ---------------------------------------------------------------------------
// Manual control state
// ---------------------------------------------------------------------------

/// Direct pilot input, as local velocity targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualInput {
    pub linear: Vector3<f64>,   // m/s, local
    pub angular: Vector3<f64>,  // rad/s, local
    pub boost: bool,
}

// ---------------------------------------------------------------------------
// Ship
// ---------------------------------------------------------------------------

/// One vehicle's flight core: thrusters, command queue, controller and force
/// accumulator. The rigid body itself belongs to the physics layer and is
/// passed in on every call that needs it.
pub struct Ship {
    name: String,
    spec: VehicleSpec,
    config: FlightConfig,
    thrusters: Vec<Thruster>,
    queue: CommandQueue,
    controller: Box<dyn Controller>,
    accumulator: ForceAccumulator,
    docked: Option<DockRecord>,
    manual: ManualInput,
    target_linear: Vector3<f64>,   // local
    target_angular: Vector3<f64>,  // local
    diverging: bool,
    events: EventLog,
    time: f64,
}

impl Ship {
    pub fn new(name: impl Into<String>, spec: VehicleSpec, config: FlightConfig) -> Result<Self, ConfigError> {
        spec.validate()?;
        let thrusters = spec.build_thrusters()?;
        Ok(Self {
            name: name.into(),
            spec,
            config,
            thrusters,
            queue: CommandQueue::new(),
            controller: Box::new(AttitudeController::new()),
            accumulator: ForceAccumulator::new(),
            docked: None,
            manual: ManualInput::default(),
            target_linear: Vector3::zeros(),
            target_angular: Vector3::zeros(),
            diverging: false,
            events: EventLog::default(),
            time: 0.0,
        })
    }

    /// Replace the autopilot controller.
    pub fn with_controller(mut self, controller: Box<dyn Controller>) -> Self {
        self.controller = controller;
        self
    }

    /// A drag-free body at rest at `pos` with this vehicle's mass properties.
    pub fn free_body(&self, pos: Vector3<f64>) -> FreeBody {
        let mut body = FreeBody::at_rest(pos, self.spec.mass);
        body.com_offset = self.spec.center_of_mass;
        body
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn mode(&self) -> PilotMode {
        self.queue.mode()
    }

    pub fn is_manual(&self) -> bool {
        self.mode().is_manual()
    }

    pub fn is_gliding(&self) -> bool {
        self.mode().is_gliding()
    }

    pub fn is_autopilot(&self) -> bool {
        self.mode().is_autopilot()
    }

    pub fn is_docked(&self) -> bool {
        self.mode().is_docked()
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn docked_at(&self) -> Option<&DockRecord> {
        self.docked.as_ref()
    }

    pub fn thrusters(&self) -> &[Thruster] {
        &self.thrusters
    }

    pub fn manual_input(&self) -> &ManualInput {
        &self.manual
    }

    /// Last local velocity targets handed to the allocator.
    pub fn targets(&self) -> (Vector3<f64>, Vector3<f64>) {
        (self.target_linear, self.target_angular)
    }

    /// Elapsed flight time, s.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn drain_events(&mut self) -> Vec<FlightEvent> {
        self.events.drain()
    }

    // -----------------------------------------------------------------------
    // Command intake
    // -----------------------------------------------------------------------

    fn push(&mut self, command: Command) {
        let kind = command.kind();
        let change = self.queue.enqueue(command);
        self.events.push(self.time, EventKind::CommandPushed(kind));
        self.record_mode(change);
    }

    fn push_checked(&mut self, command: Command) -> Result<(), NavError> {
        if self.is_docked() {
            return Err(NavError::Docked);
        }
        self.push(command);
        Ok(())
    }

    fn record_mode(&mut self, change: Option<ModeChange>) {
        if let Some(ModeChange { from, to }) = change {
            self.events.push(self.time, EventKind::ModeChanged { from, to });
        }
    }

    fn set_mode(&mut self, mode: PilotMode) {
        let change = self.queue.set_mode(mode);
        self.record_mode(change);
    }

    /// Remove the active command after completion.
    fn finish_command(&mut self) {
        if let Some(done) = self.queue.dequeue() {
            self.events.push(self.time, EventKind::CommandCleared(done.kind()));
        }
        self.controller.reset();
        self.diverging = false;
    }

    /// Discard every pending command.
    pub fn clear_commands(&mut self) {
        while let Some(cmd) = self.queue.dequeue() {
            self.events.push(self.time, EventKind::CommandCleared(cmd.kind()));
        }
        self.controller.reset();
        self.diverging = false;
    }

    pub fn enqueue_move_to(&mut self, target: Vector3<f64>) -> Result<(), NavError> {
        self.push_checked(Command::MoveTo { target })
    }

    pub fn enqueue_rotate_to(&mut self, target: UnitQuaternion<f64>) -> Result<(), NavError> {
        self.push_checked(Command::RotateTo { target })
    }

    pub fn enqueue_brake_linear(&mut self) -> Result<(), NavError> {
        self.push_checked(Command::BrakeLinear)
    }

    pub fn enqueue_brake_angular(&mut self) -> Result<(), NavError> {
        self.push_checked(Command::BrakeAngular)
    }

    /// Plan around the obstacles in `entities` and enqueue, for every leg, a
    /// rotation to face along it followed by the move. Returns the number of
    /// commands enqueued. Nothing is enqueued on failure.
    pub fn navigate_to<B: RigidBody + ?Sized>(
        &mut self,
        body: &B,
        target: Vector3<f64>,
        entities: &[EntitySnapshot],
    ) -> Result<usize, NavError> {
        if self.is_docked() {
            return Err(NavError::Docked);
        }
        let route = self.route(body.position(), target, entities, &[])?;
        let n = route.len();
        for cmd in route {
            self.push(cmd);
        }
        info!(ship = %self.name, commands = n, "navigation queued");
        Ok(n)
    }

    fn route(
        &mut self,
        from: Vector3<f64>,
        target: Vector3<f64>,
        entities: &[EntitySnapshot],
        exclude: &[&str],
    ) -> Result<Vec<Command>, NavError> {
        let mut excluded = vec![self.name.as_str()];
        excluded.extend_from_slice(exclude);
        let obstacles = scan(entities, self.config.obstacle_size_ceiling, &excluded);

        let waypoints = match plan(from, target, self.spec.radius, &obstacles) {
            Ok(w) => w,
            Err(e) => {
                warn!(ship = %self.name, obstacles = obstacles.len(), "no path to target");
                self.events.push(self.time, EventKind::PlanningFailed);
                return Err(e);
            }
        };

        let mut commands = Vec::with_capacity(2 * (waypoints.len() + 1));
        let mut prev = from;
        for point in waypoints.into_iter().chain(std::iter::once(target)) {
            let leg = point - prev;
            if leg.norm() >= self.config.dead_distance {
                commands.push(Command::RotateTo { target: facing(&leg) });
            }
            commands.push(Command::MoveTo { target: point });
            prev = point;
        }
        Ok(commands)
    }

    // -----------------------------------------------------------------------
    // Docking
    // -----------------------------------------------------------------------

    /// Negotiate with `station` and queue the approach: navigate to the
    /// standoff point, turn to face the port, move in, confirm.
    pub fn request_dock<B: RigidBody + ?Sized>(
        &mut self,
        body: &B,
        world: &mut dyn World,
        station: &str,
    ) -> Result<DockingContract, DockError> {
        if self.is_docked() {
            return Err(DockError::AlreadyDocked);
        }
        let entities = world.entities();
        let st = world
            .station_mut(station)
            .ok_or_else(|| DockError::StationNotFound(station.to_string()))?;
        let contract = DockingContract::negotiate(st, &self.name, &self.spec.dock_offset, self.config.dock_standoff);
        if !contract.granted {
            warn!(ship = %self.name, station, "docking denied");
            self.events.push(self.time, EventKind::DockDenied { station: station.to_string() });
            return Err(DockError::Denied { station: station.to_string() });
        }

        let mut commands = self
            .route(body.position(), contract.approach, &entities, &[station])
            .map_err(|_| DockError::PlanningFailure { station: station.to_string() })?;
        commands.push(Command::RotateTo { target: contract.orientation });
        commands.push(Command::MoveTo { target: contract.mate });
        commands.push(Command::DockAt { station: contract.station.clone(), slot: contract.slot });

        info!(ship = %self.name, station, slot = contract.slot, commands = commands.len(), "docking approach queued");
        for cmd in commands {
            self.push(cmd);
        }
        Ok(contract)
    }

    /// Mate with `station`: drop remaining commands, let the station finalize,
    /// switch to Docked and stop the body.
    pub fn confirm_dock<B: RigidBody + ?Sized>(
        &mut self,
        body: &mut B,
        world: &mut dyn World,
        station: &str,
        slot: u32,
    ) -> Result<(), DockError> {
        if let Some(record) = &self.docked {
            if record.station == station && record.slot == slot {
                return Ok(());
            }
            warn!(ship = %self.name, station = %record.station, "already docked, confirmation refused");
            return Err(DockError::AlreadyDocked);
        }
        let st = world
            .station_mut(station)
            .ok_or_else(|| DockError::StationNotFound(station.to_string()))?;
        st.dock(&self.name, slot);

        self.clear_commands();
        self.set_mode(PilotMode::Docked);
        self.docked = Some(DockRecord { station: station.to_string(), slot });
        self.events.push(self.time, EventKind::Docked { station: station.to_string(), slot });

        body.set_linear_velocity(Vector3::zeros());
        body.set_angular_velocity(Vector3::zeros());
        self.halt();
        info!(ship = %self.name, station, slot, "docked");
        Ok(())
    }

    /// Release from the station and queue a straight egress move backward.
    pub fn undock<B: RigidBody + ?Sized>(&mut self, body: &B, world: &mut dyn World) -> Result<(), DockError> {
        let record = self.docked.take().ok_or(DockError::NotDocked)?;
        match world.station_mut(&record.station) {
            Some(st) => st.release_dock(&self.name, record.slot),
            None => warn!(ship = %self.name, station = %record.station, "undocking from a station that no longer exists"),
        }

        self.clear_commands();
        let egress = body.position() + body.orientation() * (-Vector3::x() * self.config.undock_distance);
        self.events.push(self.time, EventKind::Undocked { station: record.station.clone() });
        self.push(Command::MoveTo { target: egress });
        info!(ship = %self.name, station = %record.station, "undocked");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Manual input
    // -----------------------------------------------------------------------

    pub fn thrust_input(&mut self, val: f64) {
        self.manual.linear.x = val * self.spec.max_linear_velocity;
    }

    pub fn move_vertical_input(&mut self, val: f64) {
        if self.spec.can_move_vertical {
            self.manual.linear.z = val * self.spec.max_linear_velocity;
        }
    }

    pub fn move_horizontal_input(&mut self, val: f64) {
        self.manual.linear.y = val * self.spec.max_linear_velocity;
    }

    pub fn roll_input(&mut self, val: f64) {
        self.manual.angular.x = -val * self.spec.max_angular_velocity;
    }

    /// Stick position in [-1, 1]²: x yaws, y pitches. Inputs inside the dead
    /// ratio map to zero, the rest is rescaled to the full range.
    pub fn mouse_position_input(&mut self, val: Vector2<f64>) {
        let dead = self.config.angular_input_dead_ratio;
        let curve = |v: f64| {
            if v == 0.0 {
                return 0.0;
            }
            (1.0 + (v.abs() - 1.0) / (1.0 - dead)).clamp(0.0, 1.0) * v.signum()
        };
        self.manual.angular.z = curve(val.x) * self.spec.max_angular_velocity;
        self.manual.angular.y = curve(val.y) * self.spec.max_angular_velocity;
    }

    /// Switch between manual and gliding flight. From autopilot this enters
    /// gliding; ignored while docked.
    pub fn toggle_gliding(&mut self) {
        match self.mode() {
            PilotMode::Docked => {}
            PilotMode::Gliding => self.set_mode(PilotMode::Manual),
            _ => self.set_mode(PilotMode::Gliding),
        }
    }

    /// Hand control back to the pilot. Pending commands stay queued.
    pub fn take_manual_control(&mut self) {
        if !self.is_docked() {
            self.set_mode(PilotMode::Manual);
        }
    }

    /// Turn to face along the current velocity.
    pub fn face_forward<B: RigidBody + ?Sized>(&mut self, body: &B) {
        self.face_along(body.linear_velocity());
    }

    /// Turn to face against the current velocity.
    pub fn face_backward<B: RigidBody + ?Sized>(&mut self, body: &B) {
        self.face_along(-body.linear_velocity());
    }

    fn face_along(&mut self, dir: Vector3<f64>) {
        if self.is_manual() && dir.norm() > self.config.velocity_epsilon {
            self.push(Command::RotateTo { target: facing(&dir) });
        }
    }

    pub fn boost_on(&mut self) {
        if self.is_manual() {
            self.manual.boost = true;
        }
    }

    pub fn boost_off(&mut self) {
        self.manual.boost = false;
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn save(&self) -> ShipSave {
        ShipSave {
            name: self.name.clone(),
            docked_to: self.docked.as_ref().map(|d| d.station.clone()),
            docked_at: self.docked.as_ref().map(|d| d.slot),
        }
    }

    /// Re-apply a saved docking state.
    pub fn restore<B: RigidBody + ?Sized>(
        &mut self,
        save: &ShipSave,
        body: &mut B,
        world: &mut dyn World,
    ) -> Result<(), DockError> {
        match (&save.docked_to, save.docked_at) {
            (Some(station), Some(slot)) => self.confirm_dock(body, world, station, slot),
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// One flight-control tick: command dispatch, attitude control, thrust
    /// allocation, thruster forces into the accumulator, velocity update.
    /// Returns `None` while docked.
    pub fn tick<B: RigidBody + ?Sized>(
        &mut self,
        body: &mut B,
        world: &mut dyn World,
        dt: f64,
    ) -> Option<StepAcceleration> {
        self.time += dt;
        if self.is_docked() {
            return None;
        }

        let kin = body.kinematics();
        self.update_targets(body, world, &kin);
        if self.is_docked() {
            return None;
        }

        // Snaps may have moved the body
        let kin = body.kinematics();
        for t in &mut self.thrusters {
            t.update_frame(&kin.pos, &kin.quat);
        }

        let input = AllocationInput {
            target_vel: kin.to_world(&self.target_linear),
            target_omega: kin.to_world(&self.target_angular),
            vel: kin.vel,
            omega: kin.omega,
            com: kin.com,
            mass: kin.mass,
        };
        allocate(&mut self.thrusters, &input, dt, &self.config);

        let boost = self.manual.boost && self.is_manual();
        for t in &mut self.thrusters {
            t.set_boost(boost);
            let f = t.force();
            self.accumulator.add_force_at_location(f, f, t.mount_location(), kin.com);
        }
        Some(self.accumulator.integrate(body, self.config.world_inertia, dt))
    }

    fn update_targets<B: RigidBody + ?Sized>(&mut self, body: &mut B, world: &mut dyn World, kin: &Kinematics) {
        match self.mode() {
            PilotMode::Docked => {}
            PilotMode::Manual => {
                self.target_linear = self.manual.linear;
                self.target_angular = self.manual.angular;
            }
            PilotMode::Gliding => {
                self.target_linear = kin.to_local(&kin.vel);
                self.target_angular = self.manual.angular;
            }
            PilotMode::AutoPilot => self.autopilot(body, world, kin),
        }
    }

    fn autopilot<B: RigidBody + ?Sized>(&mut self, body: &mut B, world: &mut dyn World, kin: &Kinematics) {
        let Some(command) = self.queue.peek().cloned() else {
            self.target_linear = Vector3::zeros();
            self.target_angular = Vector3::zeros();
            return;
        };

        if let Command::DockAt { station, slot } = &command {
            if let Err(e) = self.confirm_dock(body, world, station, *slot) {
                warn!(ship = %self.name, error = %e, "dock confirmation failed, dropping command");
                self.finish_command();
            }
            return;
        }

        let out = self.controller.update(&command, kin, &self.spec, &self.config);
        if out.diverging && !self.diverging {
            debug!(ship = %self.name, "pilot error: rotation diverging");
            self.events.push(self.time, EventKind::PilotError);
        }
        self.diverging = out.diverging;
        self.target_linear = out.linear;
        self.target_angular = out.angular;
        if out.cancel_spin {
            body.set_angular_velocity(Vector3::zeros());
        }

        if let Some(done) = out.completion {
            match done {
                Completion::Arrived { position } => {
                    body.set_position(position);
                    body.set_linear_velocity(Vector3::zeros());
                }
                Completion::Stopped => body.set_linear_velocity(Vector3::zeros()),
                Completion::Aligned { orientation } => {
                    body.set_orientation(orientation);
                    body.set_angular_velocity(Vector3::zeros());
                }
                Completion::Steadied => body.set_angular_velocity(Vector3::zeros()),
            }
            self.finish_command();
        }
    }

    /// Zero all thruster commands and pending forces.
    fn halt(&mut self) {
        for t in &mut self.thrusters {
            t.reset();
            t.set_boost(false);
        }
        self.accumulator.reset();
        self.target_linear = Vector3::zeros();
        self.target_angular = Vector3::zeros();
    }
}

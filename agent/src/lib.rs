#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command and sensor engine for the Karel agent.
//!
//! The [`Agent`] owns the [`World`] for the lifetime of a session. Every
//! command runs through a single gate that rejects work once the agent has
//! halted, validates the command against the world, records the step
//! bookkeeping and finally notifies the attached [`Renderer`]. A failed
//! precondition never unwinds into the controller: the agent absorbs it by
//! halting permanently and reporting an [`Event::ErrorShutoff`].

mod renderer;

pub use self::renderer::{NullRenderer, Renderer};

use karel_core::{
    AgentSnapshot, Cell, CommandKind, ConstructionError, CornerUpdate, Event, Fault, GridCoord,
    Heading, MarkerError, Pose, RunState, Rotation, Sensor, Status,
};
use karel_world::World;
use tracing::{debug, info, warn};

type CommandResult = Result<Option<CornerUpdate>, Fault>;

/// Karel agent bound to its world and renderer.
#[derive(Debug)]
pub struct Agent<R> {
    world: World,
    pose: Pose,
    markers_in_bag: u32,
    steps: u64,
    last_command: CommandKind,
    state: RunState,
    renderer: R,
}

impl<R: Renderer> Agent<R> {
    /// Places the agent into the world and announces the initial frame.
    ///
    /// Fails when the pose does not stand on a corner of the world.
    pub fn power_on(
        world: World,
        pose: Pose,
        markers_in_bag: u32,
        renderer: R,
    ) -> Result<Self, ConstructionError> {
        if !pose.position.is_corner() || !world.contains(pose.position) {
            let corner = pose.corner();
            return Err(ConstructionError::InvalidAgentPlacement {
                avenue: corner.avenue(),
                street: corner.street(),
            });
        }

        let mut agent = Self {
            world,
            pose,
            markers_in_bag,
            steps: 0,
            last_command: CommandKind::TurnOn,
            state: RunState::Running,
            renderer,
        };
        info!(
            corner = %pose.corner(),
            heading = %pose.heading,
            markers_in_bag,
            "agent_powered_on"
        );
        agent.notify_update(None);
        Ok(agent)
    }

    /// Moves one corner forward, halting when the way is blocked.
    pub fn step(&mut self) -> Status {
        self.execute(CommandKind::Step, Self::try_step)
    }

    /// Rotates a quarter turn counterclockwise.
    pub fn turn_left(&mut self) -> Status {
        self.execute(CommandKind::TurnLeft, |agent| {
            agent.pose.heading = agent.pose.heading.rotate(Rotation::Left);
            Ok(None)
        })
    }

    /// Rotates a quarter turn clockwise by issuing three left turns.
    ///
    /// Each left turn is a full command and counts as a step.
    pub fn turn_right(&mut self) -> Status {
        let mut status = Status::Completed;
        for _ in 0..3 {
            status = self.turn_left();
            if !status.is_completed() {
                break;
            }
        }
        status
    }

    /// Drops one marker from the bag onto the current corner.
    pub fn put_marker(&mut self) -> Status {
        self.execute(CommandKind::PutMarker, Self::try_put_marker)
    }

    /// Picks one marker from the current corner into the bag.
    pub fn pick_marker(&mut self) -> Status {
        self.execute(CommandKind::PickMarker, Self::try_pick_marker)
    }

    /// Shuts the agent down cleanly.
    pub fn power_off(&mut self) -> Status {
        let status = self.execute(CommandKind::PowerOff, |_| Ok(None));
        if status.is_completed() {
            self.state = RunState::Halted;
            info!(steps = self.steps, "agent_powered_off");
        }
        status
    }

    fn execute<F>(&mut self, command: CommandKind, action: F) -> Status
    where
        F: FnOnce(&mut Self) -> CommandResult,
    {
        if !self.is_running() {
            debug!(%command, "command_rejected_while_halted");
            return Status::NotRunning;
        }

        let outcome = action(self);
        self.steps = self.steps.saturating_add(1);
        self.last_command = command;

        match outcome {
            Ok(changed_corner) => {
                debug!(%command, steps = self.steps, "command_completed");
                self.notify_update(changed_corner);
                Status::Completed
            }
            Err(fault) => {
                self.state = RunState::Halted;
                warn!(%command, %fault, steps = self.steps, "error_shutoff");
                self.notify_update(None);
                self.notify(Event::ErrorShutoff { fault });
                Status::Shutoff(fault)
            }
        }
    }

    fn try_step(&mut self) -> CommandResult {
        let heading = self.pose.heading;
        if !self.is_clear_toward(heading) {
            return Err(Fault::IllegalMove);
        }

        let (dx, dy) = heading.to_vector();
        let vacated = self.pose.position;
        let destination = vacated
            .offset(2 * dx, 2 * dy)
            .ok_or(Fault::IllegalMove)?;
        self.pose.position = destination;
        Ok(Some(self.corner_update(vacated)))
    }

    fn try_put_marker(&mut self) -> CommandResult {
        if self.markers_in_bag == 0 {
            return Err(Fault::NoMarkerToPlace);
        }

        let _ = self
            .world
            .deposit_marker(self.pose.position)
            .map_err(|error| match error {
                MarkerError::CornerFull => Fault::CornerFull,
                // The agent only ever stands on corners.
                MarkerError::NotACorner { .. } | MarkerError::NoMarker => Fault::NoMarkerToPlace,
            })?;
        self.markers_in_bag -= 1;
        Ok(Some(self.corner_update(self.pose.position)))
    }

    fn try_pick_marker(&mut self) -> CommandResult {
        let bag = self.markers_in_bag.checked_add(1).ok_or(Fault::BagFull)?;
        let _ = self
            .world
            .remove_marker(self.pose.position)
            .map_err(|_| Fault::NoMarkerToPick)?;
        self.markers_in_bag = bag;
        Ok(Some(self.corner_update(self.pose.position)))
    }

    fn corner_update(&self, position: GridCoord) -> CornerUpdate {
        CornerUpdate {
            position,
            cell: self.world.cell_at(position).unwrap_or(Cell::EMPTY),
        }
    }

    fn notify_update(&mut self, changed_corner: Option<CornerUpdate>) {
        self.notify(Event::AgentUpdated {
            pose: self.pose,
            changed_corner,
            markers_in_bag: self.markers_in_bag,
            steps: self.steps,
            last_command: self.last_command,
        });
    }

    fn notify(&mut self, event: Event) {
        self.renderer.render(&self.world, &event);
    }
}

impl<R> Agent<R> {
    /// Evaluates a sensor against the current state.
    ///
    /// Positive sensors read `false` once the agent has halted. Every
    /// negated sensor is the complement of its positive counterpart, so
    /// those read `true`.
    #[must_use]
    pub fn sense(&self, sensor: Sensor) -> bool {
        let heading = self.pose.heading;
        match sensor {
            Sensor::NoMarkersInBag => !self.sense(Sensor::MarkersInBag),
            Sensor::FrontIsBlocked => !self.sense(Sensor::FrontIsClear),
            Sensor::LeftIsBlocked => !self.sense(Sensor::LeftIsClear),
            Sensor::RightIsBlocked => !self.sense(Sensor::RightIsClear),
            Sensor::NotFacingNorth => !self.sense(Sensor::FacingNorth),
            Sensor::NotFacingSouth => !self.sense(Sensor::FacingSouth),
            Sensor::NotFacingEast => !self.sense(Sensor::FacingEast),
            Sensor::NotFacingWest => !self.sense(Sensor::FacingWest),
            Sensor::NoMarkersPresent => !self.sense(Sensor::MarkersPresent),
            _ if !self.is_running() => false,
            Sensor::MarkersInBag => self.markers_in_bag > 0,
            Sensor::FrontIsClear => self.is_clear_toward(heading),
            Sensor::LeftIsClear => self.is_clear_toward(heading.rotate(Rotation::Left)),
            Sensor::RightIsClear => self.is_clear_toward(heading.rotate(Rotation::Right)),
            Sensor::FacingNorth => heading == Heading::North,
            Sensor::FacingSouth => heading == Heading::South,
            Sensor::FacingEast => heading == Heading::East,
            Sensor::FacingWest => heading == Heading::West,
            Sensor::MarkersPresent => self.world.markers_at(self.pose.position) > 0,
        }
    }

    /// Reports whether the bag holds at least one marker.
    #[must_use]
    pub fn markers_in_bag(&self) -> bool {
        self.sense(Sensor::MarkersInBag)
    }

    /// Reports whether the bag is empty.
    #[must_use]
    pub fn no_markers_in_bag(&self) -> bool {
        self.sense(Sensor::NoMarkersInBag)
    }

    /// Reports whether the agent may step forward.
    #[must_use]
    pub fn front_is_clear(&self) -> bool {
        self.sense(Sensor::FrontIsClear)
    }

    /// Reports whether a wall or the world edge lies ahead.
    #[must_use]
    pub fn front_is_blocked(&self) -> bool {
        self.sense(Sensor::FrontIsBlocked)
    }

    /// Reports whether the way to the left is open.
    #[must_use]
    pub fn left_is_clear(&self) -> bool {
        self.sense(Sensor::LeftIsClear)
    }

    /// Reports whether a wall or the world edge lies to the left.
    #[must_use]
    pub fn left_is_blocked(&self) -> bool {
        self.sense(Sensor::LeftIsBlocked)
    }

    /// Reports whether the way to the right is open.
    #[must_use]
    pub fn right_is_clear(&self) -> bool {
        self.sense(Sensor::RightIsClear)
    }

    /// Reports whether a wall or the world edge lies to the right.
    #[must_use]
    pub fn right_is_blocked(&self) -> bool {
        self.sense(Sensor::RightIsBlocked)
    }

    /// Reports whether the agent faces north.
    #[must_use]
    pub fn facing_north(&self) -> bool {
        self.sense(Sensor::FacingNorth)
    }

    /// Reports whether the agent faces any direction but north.
    #[must_use]
    pub fn not_facing_north(&self) -> bool {
        self.sense(Sensor::NotFacingNorth)
    }

    /// Reports whether the agent faces south.
    #[must_use]
    pub fn facing_south(&self) -> bool {
        self.sense(Sensor::FacingSouth)
    }

    /// Reports whether the agent faces any direction but south.
    #[must_use]
    pub fn not_facing_south(&self) -> bool {
        self.sense(Sensor::NotFacingSouth)
    }

    /// Reports whether the agent faces east.
    #[must_use]
    pub fn facing_east(&self) -> bool {
        self.sense(Sensor::FacingEast)
    }

    /// Reports whether the agent faces any direction but east.
    #[must_use]
    pub fn not_facing_east(&self) -> bool {
        self.sense(Sensor::NotFacingEast)
    }

    /// Reports whether the agent faces west.
    #[must_use]
    pub fn facing_west(&self) -> bool {
        self.sense(Sensor::FacingWest)
    }

    /// Reports whether the agent faces any direction but west.
    #[must_use]
    pub fn not_facing_west(&self) -> bool {
        self.sense(Sensor::NotFacingWest)
    }

    /// Reports whether the current corner holds markers.
    #[must_use]
    pub fn markers_present(&self) -> bool {
        self.sense(Sensor::MarkersPresent)
    }

    /// Reports whether the current corner is empty.
    #[must_use]
    pub fn no_markers_present(&self) -> bool {
        self.sense(Sensor::NoMarkersPresent)
    }

    fn is_clear_toward(&self, heading: Heading) -> bool {
        is_clear_toward(&self.world, self.pose.position, heading)
    }

    /// World the agent operates in.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current pose of the agent.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Number of markers carried in the bag.
    #[must_use]
    pub const fn bag(&self) -> u32 {
        self.markers_in_bag
    }

    /// Number of commands attempted while running.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Most recent command attempted while running.
    #[must_use]
    pub const fn last_command(&self) -> CommandKind {
        self.last_command
    }

    /// Current run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Reports whether the agent still accepts commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Captures a serialisable summary of the agent.
    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            corner: self.pose.corner(),
            heading: self.pose.heading,
            markers_in_bag: self.markers_in_bag,
            markers_on_corner: self.world.markers_at(self.pose.position),
            steps: self.steps,
            last_command: self.last_command,
            state: self.state,
        }
    }

    /// Renderer receiving the agent's events.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Consumes the agent, returning its world and renderer.
    #[must_use]
    pub fn into_parts(self) -> (World, R) {
        (self.world, self.renderer)
    }
}

/// Reports whether a step from `position` toward `heading` stays in the world
/// without crossing a wall.
#[must_use]
pub fn is_clear_toward(world: &World, position: GridCoord, heading: Heading) -> bool {
    let (dx, dy) = heading.to_vector();
    position
        .offset(dx, dy)
        .is_some_and(|seam| world.contains(seam) && !world.is_wall(seam))
}

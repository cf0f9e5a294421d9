#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Karel simulator.
//!
//! This crate defines the value types that connect the world loader, the
//! authoritative world, the agent engine and the adapters. Loaders produce
//! [`WallDirective`] and [`MarkerDirective`] lists, the world encodes them in
//! its doubled grid, and the agent broadcasts [`Event`] values to renderers
//! after every command it executes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest extent of the doubled grid along either axis.
pub const MAX_GRID_EXTENT: u32 = 30;

const HEADINGS: [Heading; 4] = [Heading::East, Heading::North, Heading::West, Heading::South];
const STEP_VECTORS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Cardinal facing of the agent, measured counterclockwise from east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    /// Facing toward increasing avenues (0 degrees).
    East,
    /// Facing toward increasing streets (90 degrees).
    North,
    /// Facing toward decreasing avenues (180 degrees).
    West,
    /// Facing toward decreasing streets (270 degrees).
    South,
}

/// Quarter turn applied to a [`Heading`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Counterclockwise quarter turn (+90 degrees).
    Left,
    /// Clockwise quarter turn (-90 degrees).
    Right,
}

impl Heading {
    /// Canonical angle of the heading in degrees, in `[0, 360)`.
    #[must_use]
    pub const fn degrees(self) -> u32 {
        match self {
            Self::East => 0,
            Self::North => 90,
            Self::West => 180,
            Self::South => 270,
        }
    }

    /// Resolves an angle into a heading, accepting only multiples of 90.
    ///
    /// Angles of 360 and above wrap around.
    #[must_use]
    pub const fn from_degrees(degrees: u32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(HEADINGS[((degrees % 360) / 90) as usize])
    }

    /// Returns the heading produced by a quarter turn.
    #[must_use]
    pub const fn rotate(self, rotation: Rotation) -> Self {
        let delta = match rotation {
            Rotation::Left => 90,
            Rotation::Right => 270,
        };
        HEADINGS[(((self.degrees() + delta) % 360) / 90) as usize]
    }

    /// Unit step `(dx, dy)` in the direction of the heading.
    ///
    /// Exactly one component is nonzero; `dy` grows toward the north.
    #[must_use]
    pub const fn to_vector(self) -> (i32, i32) {
        STEP_VECTORS[(self.degrees() / 90) as usize]
    }

    /// Lowercase name displayed by status panels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::East => "east",
            Self::North => "north",
            Self::West => "west",
            Self::South => "south",
        }
    }

    /// Glyph used to draw the agent on a text map.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::East => '>',
            Self::North => '^',
            Self::West => '<',
            Self::South => 'v',
        }
    }

    /// Parses one of the letters `N`, `E`, `S`, `W`, ignoring case.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'E' => Some(Self::East),
            'N' => Some(Self::North),
            'W' => Some(Self::West),
            'S' => Some(Self::South),
            _ => None,
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Side of a corner on which a wall segment is placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Segment above the corner.
    North,
    /// Segment to the right of the corner.
    East,
    /// Segment below the corner.
    South,
    /// Segment to the left of the corner.
    West,
}

impl Side {
    /// Parses one of the letters `N`, `E`, `S`, `W`, ignoring case.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'N' => Some(Self::North),
            'E' => Some(Self::East),
            'S' => Some(Self::South),
            'W' => Some(Self::West),
            _ => None,
        }
    }

    /// Uppercase letter naming the side.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }

    /// Heading that points from the corner toward this side.
    #[must_use]
    pub const fn heading(self) -> Heading {
        match self {
            Self::North => Heading::North,
            Self::East => Heading::East,
            Self::South => Heading::South,
            Self::West => Heading::West,
        }
    }
}

/// Content of a single doubled-grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable wall segment.
    Wall,
    /// Stack of markers; zero means the cell is empty.
    Markers(u32),
}

impl Cell {
    /// Cell without walls or markers.
    pub const EMPTY: Self = Self::Markers(0);

    /// Reports whether the cell holds a wall.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Number of markers stacked on the cell; walls hold none.
    #[must_use]
    pub const fn markers(self) -> u32 {
        match self {
            Self::Wall => 0,
            Self::Markers(count) => count,
        }
    }
}

/// Logical corner addressed by 1-based avenue (column) and street (row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Corner {
    avenue: u32,
    street: u32,
}

impl Corner {
    /// Creates a corner from 1-based avenue and street numbers.
    #[must_use]
    pub const fn new(avenue: u32, street: u32) -> Self {
        Self { avenue, street }
    }

    /// 1-based avenue (column) number.
    #[must_use]
    pub const fn avenue(&self) -> u32 {
        self.avenue
    }

    /// 1-based street (row) number.
    #[must_use]
    pub const fn street(&self) -> u32 {
        self.street
    }

    /// Converts the corner into doubled-grid coordinates.
    ///
    /// Returns `None` when either number is zero.
    #[must_use]
    pub fn to_grid(self) -> Option<GridCoord> {
        let column = self.avenue.checked_sub(1)?.checked_mul(2)?;
        let row = self.street.checked_sub(1)?.checked_mul(2)?;
        Some(GridCoord::new(column, row))
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.avenue, self.street)
    }
}

/// Zero-based coordinate in the doubled grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new doubled-grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index; row zero is the southern edge.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Applies a signed offset, returning `None` when it leaves the first quadrant.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            column: self.column.checked_add_signed(dx)?,
            row: self.row.checked_add_signed(dy)?,
        })
    }

    /// Reports whether the coordinate addresses a corner cell.
    #[must_use]
    pub const fn is_corner(&self) -> bool {
        self.column % 2 == 0 && self.row % 2 == 0
    }

    /// Logical corner addressed by the coordinate, if it is a corner cell.
    #[must_use]
    pub const fn corner(&self) -> Option<Corner> {
        if self.is_corner() {
            Some(Corner::new(self.column / 2 + 1, self.row / 2 + 1))
        } else {
            None
        }
    }
}

/// Position and heading of the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    /// Doubled-grid position; both components are always even.
    pub position: GridCoord,
    /// Direction the agent faces.
    pub heading: Heading,
}

impl Pose {
    /// Creates a pose standing on the provided corner.
    ///
    /// Returns `None` when the corner uses a zero avenue or street.
    #[must_use]
    pub fn at_corner(corner: Corner, heading: Heading) -> Option<Self> {
        Some(Self {
            position: corner.to_grid()?,
            heading,
        })
    }

    /// Logical corner the agent stands on.
    #[must_use]
    pub const fn corner(&self) -> Corner {
        Corner::new(self.position.column() / 2 + 1, self.position.row() / 2 + 1)
    }
}

/// Instruction to place a wall segment next to a corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallDirective {
    /// Corner the wall is attached to.
    pub corner: Corner,
    /// Side of the corner that receives the wall.
    pub side: Side,
}

/// Instruction to stack markers on a corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerDirective {
    /// Corner receiving the markers.
    pub corner: Corner,
    /// Number of markers placed on the corner.
    pub count: u32,
}

/// Identifier of a command the agent executed or attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Initial state recorded when the agent powers on.
    TurnOn,
    /// Move one corner forward.
    Step,
    /// Rotate a quarter turn counterclockwise.
    TurnLeft,
    /// Drop one marker from the bag on the current corner.
    PutMarker,
    /// Pick one marker from the current corner into the bag.
    PickMarker,
    /// Shut the agent down cleanly.
    PowerOff,
}

impl CommandKind {
    /// Name shown as the last command by renderers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::Step => "step",
            Self::TurnLeft => "turn_left",
            Self::PutMarker => "put_marker",
            Self::PickMarker => "pick_marker",
            Self::PowerOff => "power_off",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a sensor predicate exposed by the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sensor {
    /// The bag holds at least one marker.
    MarkersInBag,
    /// The bag is empty.
    NoMarkersInBag,
    /// No wall or world edge ahead.
    FrontIsClear,
    /// Wall or world edge ahead.
    FrontIsBlocked,
    /// No wall or world edge to the left.
    LeftIsClear,
    /// Wall or world edge to the left.
    LeftIsBlocked,
    /// No wall or world edge to the right.
    RightIsClear,
    /// Wall or world edge to the right.
    RightIsBlocked,
    /// Heading is north.
    FacingNorth,
    /// Heading is not north.
    NotFacingNorth,
    /// Heading is south.
    FacingSouth,
    /// Heading is not south.
    NotFacingSouth,
    /// Heading is east.
    FacingEast,
    /// Heading is not east.
    NotFacingEast,
    /// Heading is west.
    FacingWest,
    /// Heading is not west.
    NotFacingWest,
    /// The current corner holds at least one marker.
    MarkersPresent,
    /// The current corner holds no markers.
    NoMarkersPresent,
}

impl Sensor {
    /// Every sensor in declaration order.
    pub const ALL: [Self; 18] = [
        Self::MarkersInBag,
        Self::NoMarkersInBag,
        Self::FrontIsClear,
        Self::FrontIsBlocked,
        Self::LeftIsClear,
        Self::LeftIsBlocked,
        Self::RightIsClear,
        Self::RightIsBlocked,
        Self::FacingNorth,
        Self::NotFacingNorth,
        Self::FacingSouth,
        Self::NotFacingSouth,
        Self::FacingEast,
        Self::NotFacingEast,
        Self::FacingWest,
        Self::NotFacingWest,
        Self::MarkersPresent,
        Self::NoMarkersPresent,
    ];

    /// Snake-case name of the sensor.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MarkersInBag => "markers_in_bag",
            Self::NoMarkersInBag => "no_markers_in_bag",
            Self::FrontIsClear => "front_is_clear",
            Self::FrontIsBlocked => "front_is_blocked",
            Self::LeftIsClear => "left_is_clear",
            Self::LeftIsBlocked => "left_is_blocked",
            Self::RightIsClear => "right_is_clear",
            Self::RightIsBlocked => "right_is_blocked",
            Self::FacingNorth => "facing_north",
            Self::NotFacingNorth => "not_facing_north",
            Self::FacingSouth => "facing_south",
            Self::NotFacingSouth => "not_facing_south",
            Self::FacingEast => "facing_east",
            Self::NotFacingEast => "not_facing_east",
            Self::FacingWest => "facing_west",
            Self::NotFacingWest => "not_facing_west",
            Self::MarkersPresent => "markers_present",
            Self::NoMarkersPresent => "no_markers_present",
        }
    }

    /// Looks a sensor up by its snake-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sensor| sensor.name() == name)
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Corner whose content changed as a side effect of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerUpdate {
    /// Doubled-grid coordinate of the corner.
    pub position: GridCoord,
    /// Content of the corner after the command.
    pub cell: Cell,
}

/// Notifications broadcast by the agent to renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reports the agent state after a command was attempted.
    AgentUpdated {
        /// Pose after the command.
        pose: Pose,
        /// Corner whose content needs to be redrawn, if any.
        changed_corner: Option<CornerUpdate>,
        /// Markers remaining in the bag.
        markers_in_bag: u32,
        /// Number of commands attempted so far.
        steps: u64,
        /// Command that produced this update.
        last_command: CommandKind,
    },
    /// Reports that the last command failed and the agent halted.
    ErrorShutoff {
        /// Reason the command failed.
        fault: Fault,
    },
}

/// Outcome reported by an agent command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The command succeeded.
    Completed,
    /// The command failed its precondition and the agent halted.
    Shutoff(Fault),
    /// The agent was already halted; the command was rejected untouched.
    NotRunning,
}

impl Status {
    /// Reports whether the command completed successfully.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Run state of the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// The agent accepts commands.
    Running,
    /// The agent stopped permanently.
    Halted,
}

/// Read-only summary of the agent used by reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Corner the agent stands on.
    pub corner: Corner,
    /// Direction the agent faces.
    pub heading: Heading,
    /// Markers remaining in the bag.
    pub markers_in_bag: u32,
    /// Markers on the corner the agent stands on.
    pub markers_on_corner: u32,
    /// Number of commands attempted.
    pub steps: u64,
    /// Most recent command attempted.
    pub last_command: CommandKind,
    /// Current run state.
    pub state: RunState,
}

/// Runtime precondition failures that halt the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Fault {
    /// The agent tried to step into a wall or off the world.
    #[error("Can't move this way")]
    IllegalMove,
    /// The agent tried to put a marker with an empty bag.
    #[error("Agent has no marker to put at the corner")]
    NoMarkerToPlace,
    /// The agent tried to pick a marker from an empty corner.
    #[error("There is no marker at the corner")]
    NoMarkerToPick,
    /// The bag cannot hold another marker.
    #[error("Agent's marker bag is full")]
    BagFull,
    /// The corner cannot hold another marker.
    #[error("The corner cannot hold more markers")]
    CornerFull,
}

/// Reasons constructing a world or agent may fail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// The requested dimensions are empty or exceed the supported grid.
    #[error(
        "world of {}x{} corners does not fit the {}x{} doubled grid",
        .avenues,
        .streets,
        MAX_GRID_EXTENT,
        MAX_GRID_EXTENT
    )]
    InvalidGeometry {
        /// Requested number of avenues.
        avenues: u32,
        /// Requested number of streets.
        streets: u32,
    },
    /// A wall directive does not resolve to a seam cell inside the grid.
    #[error("wall on side '{side}' of corner ({avenue}, {street}) does not lie on a seam")]
    InvalidWallPlacement {
        /// Avenue named by the directive.
        avenue: u32,
        /// Street named by the directive.
        street: u32,
        /// Side letter named by the directive.
        side: char,
    },
    /// A marker directive names a corner outside the grid.
    #[error("markers at corner ({avenue}, {street}) lie outside the world")]
    InvalidMarkerPlacement {
        /// Avenue named by the directive.
        avenue: u32,
        /// Street named by the directive.
        street: u32,
    },
    /// The initial agent corner lies outside the grid.
    #[error("agent start corner ({avenue}, {street}) lies outside the world")]
    InvalidAgentPlacement {
        /// Avenue of the requested start corner.
        avenue: u32,
        /// Street of the requested start corner.
        street: u32,
    },
}

/// Failures of marker mutations on the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum MarkerError {
    /// The coordinate is outside the grid or not a corner cell.
    #[error("cell ({column}, {row}) is not a corner of the world")]
    NotACorner {
        /// Column of the rejected coordinate.
        column: u32,
        /// Row of the rejected coordinate.
        row: u32,
    },
    /// The corner holds no marker to remove.
    #[error("no marker to remove")]
    NoMarker,
    /// The corner already holds the largest representable count.
    #[error("corner cannot hold more markers")]
    CornerFull,
}

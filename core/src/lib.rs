#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tile crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative navigation state, and pure systems. Adapters submit
//! [`Command`] values describing desired moves, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for presentation layers and systems to react to. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when a crawl session boots.
pub const WELCOME_BANNER: &str = "Welcome to the crawl.";

/// Commands that express all permissible navigation mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Requests that the agent leave the current tile in the given direction.
    RequestMove {
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Signals that the presentation layer finished animating the last move.
    Arrive,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The agent entered a tile, either by advancing or by backtracking.
    TileEntered {
        /// Tile the agent now occupies.
        coordinate: Coordinate,
        /// Passages leading out of the entered tile.
        connectivity: Connectivity,
        /// Encounters placed on the tile when it was generated.
        encounters: Vec<EncounterSpec>,
        /// Whether the move advanced or undid the previous step.
        traversal: Traversal,
    },
    /// A move request was refused without mutating any state.
    MoveRejected {
        /// Direction that was requested.
        direction: Direction,
        /// Reason the request was refused.
        reason: MoveRejection,
    },
    /// Tile generation failed; the agent stayed on its prior tile.
    GenerationFailed {
        /// Coordinate that could not be generated.
        coordinate: Coordinate,
        /// Failure reported while generating the tile.
        error: GenerationError,
    },
    /// The presentation layer reported that the agent reached its tile.
    Arrived {
        /// Tile the agent settled on.
        coordinate: Coordinate,
    },
    /// The agent settled on a tile that carries encounters.
    EncounterReached {
        /// Tile hosting the encounters.
        coordinate: Coordinate,
        /// Encounters awaiting resolution by an external collaborator.
        encounters: Vec<EncounterSpec>,
    },
}

/// Cardinal movement directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    Up,
    /// Movement toward decreasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
    /// Movement toward increasing `x`.
    Right,
}

impl Direction {
    /// Every direction in the canonical generation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction that undoes a move in this direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit offset `(dx, dy)` covered by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Location of a tile expressed in world units.
///
/// Tiles sit on multiples of the configured tile size, so neighbouring tiles
/// differ by exactly one tile size along a single axis.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Coordinate at the world origin.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate reached by moving `distance` units in `direction`.
    ///
    /// Returns `None` when the result would leave the representable range.
    #[must_use]
    pub fn stepped(self, direction: Direction, distance: u32) -> Option<Self> {
        let distance = i32::try_from(distance).ok()?;
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add(dx.checked_mul(distance)?)?;
        let y = self.y.checked_add(dy.checked_mul(distance)?)?;
        Some(Self::new(x, y))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which of the four cardinal passages lead out of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connectivity {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Connectivity {
    /// Connectivity with every passage closed.
    pub const CLOSED: Self = Self::new(false, false, false, false);

    /// Creates connectivity from explicit per-direction flags.
    #[must_use]
    pub const fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    /// Reports whether movement out of the tile in `direction` is permitted.
    #[must_use]
    pub const fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Returns a copy with the passage in `direction` set to `open`.
    #[must_use]
    pub fn with(mut self, direction: Direction, open: bool) -> Self {
        match direction {
            Direction::Up => self.up = open,
            Direction::Down => self.down = open,
            Direction::Left => self.left = open,
            Direction::Right => self.right = open,
        }
        self
    }

    /// Iterator over the open passages in canonical order.
    pub fn open_directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.allows(*direction))
    }

    /// Reports whether every passage is closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Encounter template offered to the generator with an independent spawn chance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncounterCandidate {
    /// Name of the template instantiated when the encounter is resolved.
    pub template: String,
    /// Percentage chance in `0.0..=100.0` that the candidate is placed.
    pub spawn_chance: f32,
}

impl EncounterCandidate {
    /// Creates a new candidate.
    #[must_use]
    pub fn new(template: impl Into<String>, spawn_chance: f32) -> Self {
        Self {
            template: template.into(),
            spawn_chance,
        }
    }
}

/// Encounter placed on a tile at generation time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncounterSpec {
    template: String,
}

impl EncounterSpec {
    /// Creates a placement for the provided template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Name of the template to instantiate.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Generated state of a single tile.
///
/// Produced exactly once per coordinate and never altered afterwards, so the
/// type exposes no mutators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileState {
    coordinate: Coordinate,
    connectivity: Connectivity,
    encounters: Vec<EncounterSpec>,
}

impl TileState {
    /// Assembles a tile state.
    #[must_use]
    pub fn new(
        coordinate: Coordinate,
        connectivity: Connectivity,
        encounters: Vec<EncounterSpec>,
    ) -> Self {
        Self {
            coordinate,
            connectivity,
            encounters,
        }
    }

    /// Coordinate the tile occupies.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Passages leading out of the tile.
    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Encounters placed on the tile.
    #[must_use]
    pub fn encounters(&self) -> &[EncounterSpec] {
        &self.encounters
    }

    /// Reports whether any encounter was placed on the tile.
    #[must_use]
    pub fn has_encounters(&self) -> bool {
        !self.encounters.is_empty()
    }
}

/// How a tile is being entered when it is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entry {
    /// The starting tile, which has no entry direction.
    Origin,
    /// A tile entered by moving in the contained direction.
    Heading(Direction),
}

/// Phases of the navigation state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Ready to accept a move request.
    Idle,
    /// A move was committed and the presentation layer has not reported arrival.
    Moving,
}

/// Classification of a successful move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Traversal {
    /// Stepped forward into new or previously generated territory.
    Advanced,
    /// Undid the previous step.
    Backtracked,
}

/// Result of a successful move request.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    /// The agent stepped forward onto the contained tile.
    Advanced(Coordinate, TileState),
    /// The agent returned to the tile it occupied before its current one.
    Backtracked(Coordinate),
}

impl MoveOutcome {
    /// Coordinate the agent occupies after the move.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Self::Advanced(coordinate, _) | Self::Backtracked(coordinate) => *coordinate,
        }
    }

    /// Classification of the move.
    #[must_use]
    pub fn traversal(&self) -> Traversal {
        match self {
            Self::Advanced(..) => Traversal::Advanced,
            Self::Backtracked(_) => Traversal::Backtracked,
        }
    }
}

/// Reasons a move request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveRejection {
    /// A previous move has not yet been reported as arrived.
    #[error("the agent is still moving")]
    NotIdle,
    /// The current tile has no passage in the requested direction.
    #[error("the current tile has no passage in that direction")]
    Blocked,
    /// The target lies outside the representable coordinate range.
    #[error("the target lies outside the coordinate range")]
    OutOfBounds,
}

/// Failures raised while producing a tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Error)]
pub enum GenerationError {
    /// The encounter provider referenced a template it cannot supply.
    #[error("encounter template `{0}` is missing")]
    MissingTemplate(String),
    /// A candidate's spawn chance lies outside `0..=100`.
    #[error("encounter template `{template}` has spawn chance {chance} outside 0..=100")]
    InvalidSpawnChance {
        /// Template carrying the invalid chance.
        template: String,
        /// Offending chance value.
        chance: f32,
    },
}

/// Errors surfaced by move requests.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum NavigationError {
    /// The move is not permitted; nothing was mutated.
    #[error("invalid move: {0}")]
    InvalidMove(MoveRejection),
    /// The target tile could not be generated; the agent did not move.
    #[error("failed to generate tile at {coordinate}")]
    GenerationFailure {
        /// Coordinate that could not be generated.
        coordinate: Coordinate,
        /// Underlying generation failure.
        #[source]
        source: GenerationError,
    },
}

/// Supplies the encounter candidates considered when a tile is generated.
///
/// Resolving an encounter once the agent reaches it is the provider's
/// collaborators' concern, not the navigation core's.
pub trait EncounterProvider {
    /// Candidates offered for the tile about to be generated at `coordinate`.
    fn candidates(&self, coordinate: Coordinate) -> Result<Vec<EncounterCandidate>, GenerationError>;
}

/// Provider that never places encounters.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEncounters;

impl EncounterProvider for NoEncounters {
    fn candidates(
        &self,
        _coordinate: Coordinate,
    ) -> Result<Vec<EncounterCandidate>, GenerationError> {
        Ok(Vec::new())
    }
}

impl EncounterProvider for Vec<EncounterCandidate> {
    fn candidates(
        &self,
        _coordinate: Coordinate,
    ) -> Result<Vec<EncounterCandidate>, GenerationError> {
        Ok(self.clone())
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative navigation state for the tile crawl.
//!
//! The [`NavigationController`] owns the [`TileStateStore`], the
//! [`TileFactory`] and the path history. Adapters mutate it through [`apply`]
//! and observe it through the [`query`] module.

mod factory;
mod navigation;
mod store;

use std::fmt;

use tile_crawl_core::{
    Command, Coordinate, Direction, EncounterProvider, Entry, Event, MoveOutcome, MoveRejection,
    NavigationError, Phase, TileState, Traversal,
};
use tracing::{debug, info, warn};

pub use factory::TileFactory;
pub use navigation::NavigationStack;
pub use store::TileStateStore;

const DEFAULT_TILE_SIZE: u32 = 10;
const DEFAULT_RNG_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Configuration parameters required to start a crawl session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    tile_size: u32,
    origin: Coordinate,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration anchored at [`Coordinate::ZERO`].
    ///
    /// A tile size of zero is treated as one so that moves always change the
    /// agent's coordinate.
    #[must_use]
    pub const fn new(tile_size: u32, rng_seed: u64) -> Self {
        Self {
            tile_size: if tile_size == 0 { 1 } else { tile_size },
            origin: Coordinate::ZERO,
            rng_seed,
        }
    }

    /// Moves the starting tile to `origin`.
    #[must_use]
    pub const fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = origin;
        self
    }

    /// Distance between neighbouring tiles in world units.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Coordinate of the starting tile.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Seed of the generation stream.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE, DEFAULT_RNG_SEED)
    }
}

/// State machine that validates moves, classifies backtracking and drives
/// tile generation.
///
/// World state is committed when a move is requested, not when the
/// presentation layer finishes animating it. The controller then stays in
/// [`Phase::Moving`] until [`NavigationController::on_arrived`] is called,
/// rejecting every further request in the meantime.
pub struct NavigationController {
    tile_size: u32,
    store: TileStateStore,
    factory: TileFactory,
    provider: Box<dyn EncounterProvider>,
    stack: NavigationStack,
    phase: Phase,
}

impl NavigationController {
    /// Starts a session with an empty store and pre-generates the origin.
    pub fn new(
        config: Config,
        provider: impl EncounterProvider + 'static,
    ) -> Result<Self, NavigationError> {
        let origin = config.origin();
        let mut store = TileStateStore::new();
        let mut factory = TileFactory::new(config.rng_seed());
        let provider: Box<dyn EncounterProvider> = Box::new(provider);

        let _ = store
            .get_or_generate(origin, Entry::Origin, &mut factory, provider.as_ref())
            .map_err(|source| NavigationError::GenerationFailure {
                coordinate: origin,
                source,
            })?;

        info!(
            %origin,
            tile_size = config.tile_size(),
            seed = config.rng_seed(),
            "crawl session started"
        );

        Ok(Self {
            tile_size: config.tile_size(),
            store,
            factory,
            provider,
            stack: NavigationStack::new(origin),
            phase: Phase::Idle,
        })
    }

    /// Attempts to move the agent one tile in `direction`.
    ///
    /// Returns [`MoveOutcome::Backtracked`] when the target is the tile the
    /// agent occupied just before its current one; that path never touches
    /// the store. Any other legal move advances, generating the target on its
    /// first visit. Errors leave the controller exactly as it was.
    pub fn request_move(&mut self, direction: Direction) -> Result<MoveOutcome, NavigationError> {
        if self.phase != Phase::Idle {
            return Err(NavigationError::InvalidMove(MoveRejection::NotIdle));
        }

        let current = self.stack.top();
        if !self.current_tile_allows(direction) {
            return Err(NavigationError::InvalidMove(MoveRejection::Blocked));
        }

        let target = current
            .stepped(direction, self.tile_size)
            .ok_or(NavigationError::InvalidMove(MoveRejection::OutOfBounds))?;

        if self.stack.previous() == Some(target) {
            let popped = self.stack.pop();
            debug_assert_eq!(popped, Some(current));
            debug_assert_eq!(self.stack.top(), target);
            self.phase = Phase::Moving;
            debug!(from = %current, to = %target, "backtracked");
            return Ok(MoveOutcome::Backtracked(target));
        }

        let tile = match self.store.get_or_generate(
            target,
            Entry::Heading(direction),
            &mut self.factory,
            self.provider.as_ref(),
        ) {
            Ok(tile) => tile.clone(),
            Err(source) => {
                warn!(%target, error = %source, "tile generation failed");
                return Err(NavigationError::GenerationFailure {
                    coordinate: target,
                    source,
                });
            }
        };

        self.stack.push(target);
        self.phase = Phase::Moving;
        debug!(from = %current, to = %target, depth = self.stack.len(), "advanced");
        Ok(MoveOutcome::Advanced(target, tile))
    }

    /// Reports that the presentation layer finished the last move.
    ///
    /// Returns `true` when the controller went from moving back to idle, and
    /// `false` when it was already idle.
    pub fn on_arrived(&mut self) -> bool {
        if self.phase == Phase::Moving {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Reports whether a move in `direction` would currently be accepted.
    #[must_use]
    pub fn can_move(&self, direction: Direction) -> bool {
        self.phase == Phase::Idle && self.current_tile_allows(direction)
    }

    /// Coordinate the agent occupies.
    #[must_use]
    pub fn current_coordinate(&self) -> Coordinate {
        self.stack.top()
    }

    /// Read-only lookup of a generated tile.
    #[must_use]
    pub fn tile_at(&self, coordinate: Coordinate) -> Option<&TileState> {
        self.store.lookup(coordinate)
    }

    /// Path from the origin to the agent.
    #[must_use]
    pub fn path(&self) -> &NavigationStack {
        &self.stack
    }

    /// Current phase of the state machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Read-only access to every generated tile.
    #[must_use]
    pub fn store(&self) -> &TileStateStore {
        &self.store
    }

    /// Distance between neighbouring tiles in world units.
    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Position of the generation stream, for replay diagnostics.
    #[must_use]
    pub fn stream_position(&self) -> u128 {
        self.factory.stream_position()
    }

    fn current_tile_allows(&self, direction: Direction) -> bool {
        self.store
            .lookup(self.stack.top())
            .map_or(false, |tile| tile.connectivity().allows(direction))
    }
}

impl fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationController")
            .field("tile_size", &self.tile_size)
            .field("store", &self.store)
            .field("factory", &self.factory)
            .field("stack", &self.stack)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Applies the provided command to the controller, broadcasting the results.
pub fn apply(controller: &mut NavigationController, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RequestMove { direction } => match controller.request_move(direction) {
            Ok(MoveOutcome::Advanced(coordinate, tile)) => {
                out_events.push(tile_entered(&tile, Traversal::Advanced));
                debug_assert_eq!(coordinate, tile.coordinate());
            }
            Ok(MoveOutcome::Backtracked(coordinate)) => {
                if let Some(tile) = controller.tile_at(coordinate) {
                    out_events.push(tile_entered(tile, Traversal::Backtracked));
                }
            }
            Err(NavigationError::InvalidMove(reason)) => {
                out_events.push(Event::MoveRejected { direction, reason });
            }
            Err(NavigationError::GenerationFailure { coordinate, source }) => {
                out_events.push(Event::GenerationFailed {
                    coordinate,
                    error: source,
                });
            }
        },
        Command::Arrive => {
            if !controller.on_arrived() {
                return;
            }

            let coordinate = controller.current_coordinate();
            out_events.push(Event::Arrived { coordinate });

            if let Some(tile) = controller.tile_at(coordinate) {
                if tile.has_encounters() {
                    out_events.push(Event::EncounterReached {
                        coordinate,
                        encounters: tile.encounters().to_vec(),
                    });
                }
            }
        }
    }
}

fn tile_entered(tile: &TileState, traversal: Traversal) -> Event {
    Event::TileEntered {
        coordinate: tile.coordinate(),
        connectivity: tile.connectivity(),
        encounters: tile.encounters().to_vec(),
        traversal,
    }
}

/// Query functions that provide read-only access to the navigation state.
pub mod query {
    use tile_crawl_core::{Connectivity, Coordinate, Direction, Phase, TileState, WELCOME_BANNER};

    use super::NavigationController;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(_controller: &NavigationController) -> &'static str {
        WELCOME_BANNER
    }

    /// Coordinate the agent occupies.
    #[must_use]
    pub fn current_coordinate(controller: &NavigationController) -> Coordinate {
        controller.current_coordinate()
    }

    /// Reports whether a move in `direction` would currently be accepted.
    #[must_use]
    pub fn can_move(controller: &NavigationController, direction: Direction) -> bool {
        controller.can_move(direction)
    }

    /// Directions in which input should currently be enabled.
    ///
    /// Every passage reads as closed while a move is still animating.
    #[must_use]
    pub fn affordances(controller: &NavigationController) -> Connectivity {
        Direction::ALL
            .into_iter()
            .fold(Connectivity::CLOSED, |affordances, direction| {
                affordances.with(direction, controller.can_move(direction))
            })
    }

    /// Read-only lookup of a generated tile.
    #[must_use]
    pub fn tile_at(controller: &NavigationController, coordinate: Coordinate) -> Option<&TileState> {
        controller.tile_at(coordinate)
    }

    /// Path from the origin to the agent, origin first.
    #[must_use]
    pub fn path(controller: &NavigationController) -> Vec<Coordinate> {
        controller.path().to_vec()
    }

    /// Current phase of the state machine.
    #[must_use]
    pub fn phase(controller: &NavigationController) -> Phase {
        controller.phase()
    }

    /// Every generated tile ordered by coordinate.
    pub fn explored_tiles(controller: &NavigationController) -> impl Iterator<Item = &TileState> {
        controller.store().iter()
    }

    /// Distance between neighbouring tiles in world units.
    #[must_use]
    pub fn tile_size(controller: &NavigationController) -> u32 {
        controller.tile_size()
    }
}

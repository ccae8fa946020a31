#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic explorer system that wanders the crawl on its own.

use rand::{seq::IteratorRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_crawl_core::{Command, Connectivity, Event};

/// Configuration parameters required to construct the explorer.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that requests one uniformly chosen legal move at a time.
///
/// The explorer arms itself whenever the previous request settled, either
/// because the agent arrived or because the move was refused, and stays
/// quiet while a move is in flight.
#[derive(Debug)]
pub struct Explorer {
    rng: ChaCha8Rng,
    armed: bool,
}

impl Explorer {
    /// Creates a new explorer using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            armed: true,
        }
    }

    /// Consumes events and the current movement affordances to emit a move.
    pub fn handle(&mut self, events: &[Event], affordances: Connectivity, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::Arrived { .. }
                | Event::MoveRejected { .. }
                | Event::GenerationFailed { .. } => self.armed = true,
                _ => {}
            }
        }

        if !self.armed {
            return;
        }

        let Some(direction) = affordances.open_directions().choose(&mut self.rng) else {
            return;
        };

        self.armed = false;
        out.push(Command::RequestMove { direction });
    }
}

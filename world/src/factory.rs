//! Tile generation backed by a single seeded random stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_crawl_core::{
    Connectivity, Coordinate, Direction, EncounterCandidate, EncounterProvider, EncounterSpec,
    Entry, GenerationError, TileState,
};
use tracing::debug;

/// Passages of the starting tile: only the way up is open.
const ORIGIN_CONNECTIVITY: Connectivity = Connectivity::new(true, false, false, false);
const PASSAGE_PROBABILITY: f64 = 0.5;
const SPAWN_ROLL_CEILING: f32 = 100.0;

/// Produces tile states from a shared, seedable random stream.
///
/// Every non-origin tile draws its four passages in canonical order and then
/// forces the passage pointing back along the entry direction open, so the
/// agent can always retrace the step that created the tile.
#[derive(Clone, Debug)]
pub struct TileFactory {
    rng: ChaCha8Rng,
}

impl TileFactory {
    /// Creates a factory whose stream is seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Position of the underlying stream, measured in 32-bit words consumed.
    #[must_use]
    pub fn stream_position(&self) -> u128 {
        self.rng.get_word_pos()
    }

    /// Generates the state of the tile at `coordinate`.
    ///
    /// Candidates are fetched and validated before anything is drawn, so a
    /// failed generation leaves the stream untouched.
    pub fn generate(
        &mut self,
        coordinate: Coordinate,
        entry: Entry,
        provider: &dyn EncounterProvider,
    ) -> Result<TileState, GenerationError> {
        let Entry::Heading(direction) = entry else {
            return Ok(TileState::new(coordinate, ORIGIN_CONNECTIVITY, Vec::new()));
        };

        let candidates = provider.candidates(coordinate)?;
        validate_candidates(&candidates)?;

        let connectivity = self.roll_connectivity().with(direction.opposite(), true);
        let encounters = self.roll_encounters(&candidates);

        debug!(
            %coordinate,
            ?direction,
            open = ?connectivity.open_directions().collect::<Vec<_>>(),
            encounters = encounters.len(),
            "generated tile"
        );

        Ok(TileState::new(coordinate, connectivity, encounters))
    }

    fn roll_connectivity(&mut self) -> Connectivity {
        Direction::ALL
            .into_iter()
            .fold(Connectivity::CLOSED, |connectivity, direction| {
                let open = self.rng.gen_bool(PASSAGE_PROBABILITY);
                connectivity.with(direction, open)
            })
    }

    fn roll_encounters(&mut self, candidates: &[EncounterCandidate]) -> Vec<EncounterSpec> {
        candidates
            .iter()
            .filter(|candidate| {
                let roll: f32 = self.rng.gen_range(0.0..SPAWN_ROLL_CEILING);
                roll < candidate.spawn_chance
            })
            .map(|candidate| EncounterSpec::new(candidate.template.clone()))
            .collect()
    }
}

fn validate_candidates(candidates: &[EncounterCandidate]) -> Result<(), GenerationError> {
    for candidate in candidates {
        if !(0.0..=SPAWN_ROLL_CEILING).contains(&candidate.spawn_chance) {
            return Err(GenerationError::InvalidSpawnChance {
                template: candidate.template.clone(),
                chance: candidate.spawn_chance,
            });
        }
    }
    Ok(())
}

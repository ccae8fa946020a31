//! Coordinate-keyed ledger of generated tiles.

use std::collections::{btree_map::Entry as Slot, BTreeMap};

use tile_crawl_core::{Coordinate, EncounterProvider, Entry, GenerationError, TileState};
use tracing::debug;

use crate::TileFactory;

/// Owns every tile state generated during a session.
///
/// A coordinate is generated at most once for the lifetime of the store;
/// later requests return the cached state without touching the factory.
/// Nothing is ever evicted.
#[derive(Clone, Debug, Default)]
pub struct TileStateStore {
    tiles: BTreeMap<Coordinate, TileState>,
}

impl TileStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tile at `coordinate`, generating it first if absent.
    ///
    /// On failure nothing is recorded for `coordinate`.
    pub fn get_or_generate(
        &mut self,
        coordinate: Coordinate,
        entry: Entry,
        factory: &mut TileFactory,
        provider: &dyn EncounterProvider,
    ) -> Result<&TileState, GenerationError> {
        match self.tiles.entry(coordinate) {
            Slot::Occupied(occupied) => {
                debug!(%coordinate, "reusing generated tile");
                Ok(&*occupied.into_mut())
            }
            Slot::Vacant(vacant) => {
                let tile = factory.generate(coordinate, entry, provider)?;
                Ok(&*vacant.insert(tile))
            }
        }
    }

    /// Reports whether a tile has been generated at `coordinate`.
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.tiles.contains_key(&coordinate)
    }

    /// Looks up the tile generated at `coordinate`.
    #[must_use]
    pub fn lookup(&self, coordinate: Coordinate) -> Option<&TileState> {
        self.tiles.get(&coordinate)
    }

    /// Number of generated tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether no tile has been generated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterator over generated tiles ordered by coordinate.
    pub fn iter(&self) -> impl Iterator<Item = &TileState> {
        self.tiles.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_crawl_core::{Direction, EncounterCandidate, NoEncounters};

    #[derive(Debug)]
    struct Broken;

    impl EncounterProvider for Broken {
        fn candidates(
            &self,
            _coordinate: Coordinate,
        ) -> Result<Vec<EncounterCandidate>, GenerationError> {
            Err(GenerationError::MissingTemplate("lich".to_owned()))
        }
    }

    #[test]
    fn second_request_returns_cached_state_without_drawing() {
        let mut store = TileStateStore::new();
        let mut factory = TileFactory::new(99);
        let coordinate = Coordinate::new(0, 10);
        let entry = Entry::Heading(Direction::Up);

        let first = store
            .get_or_generate(coordinate, entry, &mut factory, &NoEncounters)
            .expect("generation succeeds")
            .clone();
        let position = factory.stream_position();
        assert!(position > 0);

        let second = store
            .get_or_generate(coordinate, entry, &mut factory, &NoEncounters)
            .expect("cached lookup succeeds")
            .clone();

        assert_eq!(first, second);
        assert_eq!(factory.stream_position(), position);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cached_state_ignores_new_entry_direction() {
        let mut store = TileStateStore::new();
        let mut factory = TileFactory::new(4);
        let coordinate = Coordinate::new(10, 10);

        let first = store
            .get_or_generate(
                coordinate,
                Entry::Heading(Direction::Right),
                &mut factory,
                &NoEncounters,
            )
            .expect("generation succeeds")
            .clone();
        let again = store
            .get_or_generate(coordinate, Entry::Origin, &mut factory, &NoEncounters)
            .expect("cached lookup succeeds");

        assert_eq!(&first, again);
    }

    #[test]
    fn failed_generation_leaves_no_entry() {
        let mut store = TileStateStore::new();
        let mut factory = TileFactory::new(1);
        let coordinate = Coordinate::new(-10, 0);

        let error = store
            .get_or_generate(
                coordinate,
                Entry::Heading(Direction::Left),
                &mut factory,
                &Broken,
            )
            .expect_err("provider failure surfaces");

        assert_eq!(error, GenerationError::MissingTemplate("lich".to_owned()));
        assert!(!store.contains(coordinate));
        assert!(store.lookup(coordinate).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn iteration_is_ordered_by_coordinate() {
        let mut store = TileStateStore::new();
        let mut factory = TileFactory::new(8);
        for coordinate in [
            Coordinate::new(10, 0),
            Coordinate::new(-10, 0),
            Coordinate::new(0, 10),
        ] {
            let _ = store
                .get_or_generate(
                    coordinate,
                    Entry::Heading(Direction::Up),
                    &mut factory,
                    &NoEncounters,
                )
                .expect("generation succeeds");
        }

        let order: Vec<_> = store.iter().map(TileState::coordinate).collect();
        assert_eq!(
            order,
            vec![
                Coordinate::new(-10, 0),
                Coordinate::new(0, 10),
                Coordinate::new(10, 0)
            ]
        );
    }
}

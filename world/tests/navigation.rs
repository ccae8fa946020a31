use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_crawl_core::{
    Connectivity, Coordinate, Direction, EncounterCandidate, EncounterProvider, GenerationError,
    MoveOutcome, MoveRejection, NavigationError, NoEncounters, Phase,
};
use tile_crawl_world::{Config, NavigationController};

fn session(seed: u64) -> NavigationController {
    NavigationController::new(Config::new(10, seed), NoEncounters)
        .expect("origin generation never fails")
}

fn advance(controller: &mut NavigationController, direction: Direction) -> MoveOutcome {
    let outcome = controller
        .request_move(direction)
        .expect("move should be accepted");
    assert!(controller.on_arrived(), "controller should have been moving");
    outcome
}

#[test]
fn origin_connectivity_only_opens_upward() {
    for seed in 0..32 {
        let controller = session(seed);
        let origin = controller
            .tile_at(Coordinate::ZERO)
            .expect("origin is generated");
        assert_eq!(
            origin.connectivity(),
            Connectivity::new(true, false, false, false)
        );
        assert!(controller.can_move(Direction::Up));
        assert!(!controller.can_move(Direction::Down));
        assert!(!controller.can_move(Direction::Left));
        assert!(!controller.can_move(Direction::Right));
    }
}

#[test]
fn advance_then_backtrack_matches_reference_walkthrough() {
    let mut controller = session(0x1234);

    let outcome = controller
        .request_move(Direction::Up)
        .expect("origin opens upward");
    let generated = match outcome {
        MoveOutcome::Advanced(coordinate, tile) => {
            assert_eq!(coordinate, Coordinate::new(0, 10));
            assert!(tile.connectivity().allows(Direction::Down));
            tile
        }
        other => panic!("expected an advance, got {other:?}"),
    };
    assert_eq!(
        controller.path().to_vec(),
        vec![Coordinate::ZERO, Coordinate::new(0, 10)]
    );
    assert_eq!(controller.current_coordinate(), Coordinate::new(0, 10));
    assert!(controller.on_arrived());

    let outcome = controller
        .request_move(Direction::Down)
        .expect("way back is forced open");
    assert_eq!(outcome, MoveOutcome::Backtracked(Coordinate::ZERO));
    assert_eq!(controller.path().to_vec(), vec![Coordinate::ZERO]);
    assert_eq!(controller.current_coordinate(), Coordinate::ZERO);
    assert_eq!(
        controller.tile_at(Coordinate::new(0, 10)),
        Some(&generated),
        "backtracking must not disturb the generated tile"
    );
}

#[test]
fn re_advancing_after_backtrack_reuses_cached_tile() {
    for seed in 0..16 {
        let mut controller = session(seed);

        let first = match advance(&mut controller, Direction::Up) {
            MoveOutcome::Advanced(_, tile) => tile,
            other => panic!("expected an advance, got {other:?}"),
        };
        let _ = advance(&mut controller, Direction::Down);
        let position = controller.stream_position();

        let second = match advance(&mut controller, Direction::Up) {
            MoveOutcome::Advanced(_, tile) => tile,
            other => panic!("expected an advance, got {other:?}"),
        };

        assert_eq!(first, second, "seed {seed} re-rolled a visited tile");
        assert_eq!(controller.stream_position(), position);
        assert_eq!(controller.store().len(), 2);
        assert_eq!(
            controller.path().to_vec(),
            vec![Coordinate::ZERO, Coordinate::new(0, 10)]
        );
    }
}

#[test]
fn requests_while_moving_are_rejected_without_side_effects() {
    let mut controller = session(42);
    let _ = controller
        .request_move(Direction::Up)
        .expect("origin opens upward");
    assert_eq!(controller.phase(), Phase::Moving);

    let path = controller.path().clone();
    let tiles = controller.store().len();
    let position = controller.stream_position();

    for direction in Direction::ALL {
        assert!(!controller.can_move(direction));
        assert_eq!(
            controller.request_move(direction),
            Err(NavigationError::InvalidMove(MoveRejection::NotIdle))
        );
    }

    assert_eq!(controller.path(), &path);
    assert_eq!(controller.store().len(), tiles);
    assert_eq!(controller.stream_position(), position);
    assert_eq!(controller.phase(), Phase::Moving);
}

#[test]
fn blocked_directions_are_rejected_without_side_effects() {
    for seed in 0..32 {
        let mut controller = session(seed);
        let _ = advance(&mut controller, Direction::Up);

        for direction in Direction::ALL {
            if controller.can_move(direction) {
                continue;
            }

            let path = controller.path().clone();
            let current = controller.current_coordinate();
            let tiles = controller.store().len();
            let position = controller.stream_position();

            assert_eq!(
                controller.request_move(direction),
                Err(NavigationError::InvalidMove(MoveRejection::Blocked))
            );
            assert_eq!(controller.path(), &path);
            assert_eq!(controller.current_coordinate(), current);
            assert_eq!(controller.store().len(), tiles);
            assert_eq!(controller.stream_position(), position);
            assert_eq!(controller.phase(), Phase::Idle);
        }
    }
}

#[test]
fn moves_past_the_coordinate_range_are_rejected() {
    let origin = Coordinate::new(0, i32::MAX - 5);
    let mut controller =
        NavigationController::new(Config::new(10, 9).with_origin(origin), NoEncounters)
            .expect("origin generation never fails");

    assert!(controller.can_move(Direction::Up));
    assert_eq!(
        controller.request_move(Direction::Up),
        Err(NavigationError::InvalidMove(MoveRejection::OutOfBounds))
    );
    assert_eq!(controller.current_coordinate(), origin);
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.store().len(), 1);
}

#[derive(Debug)]
struct HauntedColumn;

impl EncounterProvider for HauntedColumn {
    fn candidates(
        &self,
        coordinate: Coordinate,
    ) -> Result<Vec<EncounterCandidate>, GenerationError> {
        if coordinate.x() == 0 && coordinate.y() > 0 {
            Err(GenerationError::MissingTemplate("banshee".to_owned()))
        } else {
            Ok(Vec::new())
        }
    }
}

#[test]
fn generation_failure_keeps_agent_in_place() {
    let mut controller = NavigationController::new(Config::new(10, 77), HauntedColumn)
        .expect("origin skips the provider");
    let position = controller.stream_position();

    let error = controller
        .request_move(Direction::Up)
        .expect_err("generation fails for the haunted column");

    assert_eq!(
        error,
        NavigationError::GenerationFailure {
            coordinate: Coordinate::new(0, 10),
            source: GenerationError::MissingTemplate("banshee".to_owned()),
        }
    );
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.current_coordinate(), Coordinate::ZERO);
    assert_eq!(controller.path().to_vec(), vec![Coordinate::ZERO]);
    assert!(controller.tile_at(Coordinate::new(0, 10)).is_none());
    assert_eq!(controller.stream_position(), position);
    assert!(controller.can_move(Direction::Up), "retry stays possible");
}

#[test]
fn encounters_are_placed_from_provider_candidates() {
    let candidates = vec![
        EncounterCandidate::new("rat", 100.0),
        EncounterCandidate::new("dragon", 0.0),
    ];
    let mut controller = NavigationController::new(Config::new(10, 5), candidates)
        .expect("origin generation never fails");

    assert!(!controller
        .tile_at(Coordinate::ZERO)
        .expect("origin is generated")
        .has_encounters());

    match advance(&mut controller, Direction::Up) {
        MoveOutcome::Advanced(_, tile) => {
            let templates: Vec<_> = tile
                .encounters()
                .iter()
                .map(|encounter| encounter.template().to_owned())
                .collect();
            assert_eq!(templates, vec!["rat".to_owned()]);
        }
        other => panic!("expected an advance, got {other:?}"),
    }
}

#[test]
fn random_walks_preserve_path_and_generation_invariants() {
    for seed in 0..24 {
        let mut controller = session(seed);
        let mut picker = ChaCha8Rng::seed_from_u64(seed ^ 0xfeed);
        let mut visited = std::collections::BTreeSet::from([Coordinate::ZERO]);

        for _ in 0..300 {
            let open: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|direction| controller.can_move(*direction))
                .collect();
            let direction = *open
                .choose(&mut picker)
                .expect("every tile keeps at least its way back open");

            let previous = controller.path().previous();
            let known_before = controller.store().len();
            let outcome = advance(&mut controller, direction);
            let target = outcome.coordinate();

            match outcome {
                MoveOutcome::Backtracked(coordinate) => {
                    assert_eq!(Some(coordinate), previous);
                    assert_eq!(controller.store().len(), known_before);
                }
                MoveOutcome::Advanced(_, tile) => {
                    if controller.store().len() > known_before {
                        assert!(
                            tile.connectivity().allows(direction.opposite()),
                            "fresh tile must open back toward its entry"
                        );
                    }
                }
            }

            let _ = visited.insert(target);
            let path = controller.path().to_vec();
            assert!(!path.is_empty());
            assert_eq!(path.first(), Some(&Coordinate::ZERO));
            assert_eq!(path.last(), Some(&controller.current_coordinate()));
            assert!(path.windows(2).all(|pair| pair[0] != pair[1]));
            assert_eq!(controller.store().len(), visited.len());
        }
    }
}

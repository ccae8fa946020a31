#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that walks a tile crawl session in the terminal.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tile_crawl_core::{Command, Direction, Event, TileState, Traversal};
use tile_crawl_rendering::{
    ascii_map, Animator, FollowCamera, Frame, RenderingBackend, Scene, TileInstance,
};
use tile_crawl_system_encounters::EncounterTable;
use tile_crawl_system_explorer::{self as explorer, Explorer};
use tile_crawl_world::{self as world, query, NavigationController};
use tracing::{debug, info, trace, warn};
use tracing_subscriber::EnvFilter;

use crate::script::MoveScript;

const FRAME_SECONDS: f32 = 1.0 / 60.0;
const DEFAULT_EXPLORE_STEPS: usize = 24;
const VIEW_RADIUS_TILES: u32 = 8;

/// Walks a procedurally generated tile crawl.
#[derive(Debug, Parser)]
#[command(name = "tile-crawl", version, about)]
struct Args {
    /// Seed of the tile generation stream.
    #[arg(long, default_value_t = world::Config::default().rng_seed())]
    seed: u64,
    /// Distance between neighbouring tiles in world units.
    #[arg(long, default_value_t = world::Config::default().tile_size())]
    tile_size: u32,
    /// Encounter manifest to load instead of `assets/encounters.toml`.
    #[arg(long, value_name = "PATH")]
    encounters: Option<PathBuf>,
    /// Scripted moves such as `UURDL`; separators are ignored.
    #[arg(long, value_name = "SEQ", conflicts_with = "explore")]
    moves: Option<MoveScript>,
    /// Let the explorer wander for this many moves.
    #[arg(long, value_name = "STEPS")]
    explore: Option<usize>,
    /// Print events as JSON lines.
    #[arg(long)]
    json: bool,
    /// Print a map of every explored tile when the walk ends.
    #[arg(long)]
    map: bool,
    /// Animation speed in world units per second.
    #[arg(long, default_value_t = Animator::DEFAULT_MOVE_SPEED)]
    move_speed: f32,
}

/// Entry point for the tile crawl command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let table = load_encounters(args.encounters.as_deref())?;
    let config = world::Config::new(args.tile_size, args.seed);
    let controller = NavigationController::new(config, table)
        .context("failed to start the crawl session")?;

    let report = if args.json { Report::Json } else { Report::Text };
    let mut session = Session::new(controller, args.move_speed, report)?;

    if report == Report::Text {
        println!("{}", query::welcome_banner(&session.controller));
    }

    match &args.moves {
        Some(script) => session.run_script(script.steps())?,
        None => {
            let explorer = Explorer::new(explorer::Config::new(args.seed));
            session.explore(explorer, args.explore.unwrap_or(DEFAULT_EXPLORE_STEPS))?;
        }
    }

    info!(
        explored = query::explored_tiles(&session.controller).count(),
        depth = query::path(&session.controller).len(),
        frames = session.backend.frames,
        "walk finished"
    );

    if args.map {
        println!("{}", session.explored_map());
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_encounters(path: Option<&Path>) -> Result<EncounterTable> {
    let table = match path {
        Some(path) => EncounterTable::from_manifest_path(path)?,
        None => {
            let default_path = EncounterTable::default_manifest_path();
            if default_path.exists() {
                EncounterTable::from_manifest_path(&default_path)?
            } else {
                warn!(
                    path = %default_path.display(),
                    "no encounter manifest found; tiles will stay empty"
                );
                EncounterTable::default()
            }
        }
    };

    info!(templates = table.entries().len(), "encounter table loaded");
    Ok(table)
}

struct Session {
    controller: NavigationController,
    animator: Animator,
    camera: FollowCamera,
    scene: Scene,
    backend: TraceBackend,
    report: Report,
}

impl Session {
    fn new(controller: NavigationController, move_speed: f32, report: Report) -> Result<Self> {
        let origin = query::current_coordinate(&controller);
        let mut scene = Scene::new(query::tile_size(&controller));
        if let Some(tile) = query::tile_at(&controller, origin) {
            scene.insert(instance_of(tile));
        }

        let animator = Animator::new(origin, move_speed)?;
        let camera = FollowCamera::new(animator.position(), Vec2::ZERO);

        Ok(Self {
            controller,
            animator,
            camera,
            scene,
            backend: TraceBackend::default(),
            report,
        })
    }

    fn run_script(&mut self, steps: &[Direction]) -> Result<()> {
        for direction in steps {
            let _ = self.step(*direction)?;
        }
        Ok(())
    }

    fn explore(&mut self, mut explorer: Explorer, steps: usize) -> Result<()> {
        let mut events = Vec::new();
        for _ in 0..steps {
            let mut commands = Vec::new();
            explorer.handle(&events, query::affordances(&self.controller), &mut commands);
            let Some(Command::RequestMove { direction }) = commands.pop() else {
                warn!("explorer has nowhere left to go");
                break;
            };
            events = self.step(direction)?;
        }
        Ok(())
    }

    /// Requests one move, animates it to completion and reports the events.
    fn step(&mut self, direction: Direction) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        world::apply(
            &mut self.controller,
            Command::RequestMove { direction },
            &mut events,
        );

        let entered = events.iter().find_map(|event| match event {
            Event::TileEntered { coordinate, .. } => Some(*coordinate),
            _ => None,
        });

        if let Some(target) = entered {
            self.scene.handle(&events);
            self.animator.begin(target, direction);
            self.animate()?;
            world::apply(&mut self.controller, Command::Arrive, &mut events);

            let culled = self.scene.retain_within(target, VIEW_RADIUS_TILES);
            if culled > 0 {
                debug!(culled, live = self.scene.len(), "culled distant tiles");
            }
        }

        self.report.emit(&events)?;
        Ok(events)
    }

    fn animate(&mut self) -> Result<()> {
        loop {
            let arrived = self.animator.tick(FRAME_SECONDS);
            let camera = self.camera.update(self.animator.position());
            self.backend.present(&Frame {
                scene: &self.scene,
                agent: query::current_coordinate(&self.controller),
                agent_position: self.animator.position(),
                facing: self.animator.facing(),
                camera,
            })?;

            if arrived {
                return Ok(());
            }
        }
    }

    fn explored_map(&self) -> String {
        let mut scene = Scene::new(query::tile_size(&self.controller));
        for tile in query::explored_tiles(&self.controller) {
            scene.insert(instance_of(tile));
        }
        ascii_map(&scene, query::current_coordinate(&self.controller))
    }
}

fn instance_of(tile: &TileState) -> TileInstance {
    TileInstance {
        coordinate: tile.coordinate(),
        connectivity: tile.connectivity(),
        encounters: tile.encounters().to_vec(),
    }
}

/// Headless backend that traces every frame instead of drawing it.
#[derive(Debug, Default)]
struct TraceBackend {
    frames: u64,
}

impl RenderingBackend for TraceBackend {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames += 1;
        trace!(
            frame = self.frames,
            agent = %frame.agent,
            x = frame.agent_position.x,
            y = frame.agent_position.y,
            facing = ?frame.facing,
            camera_x = frame.camera.x,
            camera_y = frame.camera.y,
            tiles = frame.scene.len(),
            "frame"
        );
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Report {
    Text,
    Json,
}

impl Report {
    fn emit(self, events: &[Event]) -> Result<()> {
        for event in events {
            match self {
                Self::Text => println!("{}", describe(event)),
                Self::Json => println!(
                    "{}",
                    serde_json::to_string(event).context("failed to encode event as json")?
                ),
            }
        }
        Ok(())
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::TileEntered {
            coordinate,
            connectivity,
            encounters,
            traversal,
        } => {
            let verb = match traversal {
                Traversal::Advanced => "entered",
                Traversal::Backtracked => "returned to",
            };
            let passages: Vec<_> = connectivity
                .open_directions()
                .map(|direction| format!("{direction:?}"))
                .collect();
            let mut line = format!("{verb} {coordinate} [{}]", passages.join(" "));
            if !encounters.is_empty() {
                line.push_str(&format!(" ({} encounters)", encounters.len()));
            }
            line
        }
        Event::MoveRejected { direction, reason } => {
            format!("cannot move {direction:?}: {reason}")
        }
        Event::GenerationFailed { coordinate, error } => {
            format!("failed to generate tile at {coordinate}: {error}")
        }
        Event::Arrived { coordinate } => format!("arrived at {coordinate}"),
        Event::EncounterReached {
            coordinate,
            encounters,
        } => {
            let names: Vec<_> = encounters.iter().map(|spec| spec.template()).collect();
            format!("encounter at {coordinate}: {}", names.join(", "))
        }
    }
}

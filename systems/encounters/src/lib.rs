#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static encounter table loaded from a TOML manifest.
//!
//! The manifest lists every encounter template a freshly generated tile may
//! receive together with its independent spawn chance:
//!
//! ```toml
//! version = 1
//!
//! [[encounter]]
//! template = "goblin"
//! spawn_chance = 35.0
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;
use tile_crawl_core::{Coordinate, EncounterCandidate, EncounterProvider, GenerationError};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Encounter candidates offered identically to every generated tile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncounterTable {
    candidates: Vec<EncounterCandidate>,
}

impl EncounterTable {
    /// Creates a table from already validated candidates.
    pub fn new(candidates: Vec<EncounterCandidate>) -> Result<Self> {
        validate(&candidates)?;
        Ok(Self { candidates })
    }

    /// Loads the table from the manifest at `path`.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read encounter manifest at {}",
                manifest_path.display()
            )
        })?;
        Self::from_toml_str(&contents).with_context(|| {
            format!(
                "invalid encounter manifest at {}",
                manifest_path.display()
            )
        })
    }

    /// Parses the table from manifest contents.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).context("failed to parse encounter manifest toml contents")?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            bail!(
                "unsupported encounter manifest version {}; expected {}",
                manifest.version,
                SUPPORTED_MANIFEST_VERSION
            );
        }

        let candidates = manifest
            .encounter
            .into_iter()
            .map(|entry| EncounterCandidate::new(entry.template, entry.spawn_chance))
            .collect();
        Self::new(candidates)
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/encounters.toml")
    }

    /// Candidates in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[EncounterCandidate] {
        &self.candidates
    }

    /// Reports whether the table offers no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl EncounterProvider for EncounterTable {
    fn candidates(
        &self,
        _coordinate: Coordinate,
    ) -> Result<Vec<EncounterCandidate>, GenerationError> {
        Ok(self.candidates.clone())
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    encounter: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    template: String,
    spawn_chance: f32,
}

fn validate(candidates: &[EncounterCandidate]) -> Result<()> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        let template = candidate.template.trim();
        ensure!(!template.is_empty(), "encounter template name is empty");
        ensure!(
            (0.0..=100.0).contains(&candidate.spawn_chance),
            "encounter `{template}` has spawn chance {} outside 0..=100",
            candidate.spawn_chance
        );
        if !seen.insert(template) {
            bail!("encounter manifest contains duplicate template `{template}`");
        }
    }
    Ok(())
}

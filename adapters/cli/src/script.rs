use std::{error::Error, fmt, str::FromStr};

use tile_crawl_core::Direction;

/// Scripted sequence of moves supplied on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MoveScript {
    steps: Vec<Direction>,
}

impl MoveScript {
    /// Moves in the order they should be requested.
    #[must_use]
    pub(crate) fn steps(&self) -> &[Direction] {
        &self.steps
    }
}

impl FromStr for MoveScript {
    type Err = MoveScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut steps = Vec::new();
        for (position, symbol) in value.chars().enumerate() {
            let direction = match symbol.to_ascii_uppercase() {
                'U' => Direction::Up,
                'D' => Direction::Down,
                'L' => Direction::Left,
                'R' => Direction::Right,
                separator if is_separator(separator) => continue,
                _ => return Err(MoveScriptError::UnknownStep { position, symbol }),
            };
            steps.push(direction);
        }

        if steps.is_empty() {
            return Err(MoveScriptError::Empty);
        }

        Ok(Self { steps })
    }
}

fn is_separator(symbol: char) -> bool {
    symbol.is_whitespace() || matches!(symbol, ',' | ';' | '-' | '_' | '/')
}

/// Errors raised while parsing a move script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MoveScriptError {
    /// The script contained no moves.
    Empty,
    /// A character was neither a move letter nor a separator.
    UnknownStep {
        /// Zero-based character index of the offending symbol.
        position: usize,
        /// The offending symbol.
        symbol: char,
    },
}

impl fmt::Display for MoveScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "move script contains no moves"),
            Self::UnknownStep { position, symbol } => write!(
                f,
                "unexpected '{symbol}' at position {position}; use U, D, L or R"
            ),
        }
    }
}

impl Error for MoveScriptError {}

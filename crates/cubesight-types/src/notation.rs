//! Standard cube move notation.
//!
//! A [`Move`] is a face letter plus an optional modifier: none (clockwise
//! quarter turn), `'` (counter-clockwise) or `2` (half turn).  An
//! [`Algorithm`] is a whitespace-separated sequence of moves, e.g.
//! `"R U R' U'"` or `"F2 B2"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CubeError, Face};

/// How far a face is turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    /// 90° clockwise, written without a modifier.
    Clockwise,
    /// 90° counter-clockwise, written `'`.
    Prime,
    /// 180°, written `2`.
    Double,
}

impl Turn {
    /// Number of clockwise quarter turns equivalent to this turn.
    pub fn quarter_turns(self) -> u8 {
        match self {
            Turn::Clockwise => 1,
            Turn::Double => 2,
            Turn::Prime => 3,
        }
    }

    pub fn inverse(self) -> Turn {
        match self {
            Turn::Clockwise => Turn::Prime,
            Turn::Prime => Turn::Clockwise,
            Turn::Double => Turn::Double,
        }
    }
}

/// A single face turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub face: Face,
    pub turn: Turn,
}

impl Move {
    pub fn new(face: Face, turn: Turn) -> Self {
        Self { face, turn }
    }

    pub fn inverse(self) -> Move {
        Move::new(self.face, self.turn.inverse())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turn {
            Turn::Clockwise => write!(f, "{}", self.face),
            Turn::Prime => write!(f, "{}'", self.face),
            Turn::Double => write!(f, "{}2", self.face),
        }
    }
}

impl FromStr for Move {
    type Err = CubeError;

    /// Accepts `X`, `X'`, `X2` and the solver-style `X2'` (still a half turn).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| CubeError::InvalidNotation("empty move".to_string()))?;
        let face = Face::from_letter(letter)?;
        let turn = match chars.as_str() {
            "" => Turn::Clockwise,
            "'" => Turn::Prime,
            "2" | "2'" => Turn::Double,
            other => {
                return Err(CubeError::InvalidNotation(format!(
                    "unknown modifier '{other}' in move '{s}'"
                )));
            }
        };
        Ok(Move::new(face, turn))
    }
}

/// An ordered sequence of moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Algorithm(Vec<Move>);

impl Algorithm {
    pub fn new(moves: Vec<Move>) -> Self {
        Self(moves)
    }

    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The algorithm that undoes this one.
    pub fn inverse(&self) -> Algorithm {
        self.0.iter().rev().map(|m| m.inverse()).collect()
    }
}

impl FromIterator<Move> for Algorithm {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

impl FromStr for Algorithm {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace().map(str::parse::<Move>).collect()
    }
}

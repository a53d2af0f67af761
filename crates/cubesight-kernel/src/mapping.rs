//! Observation mapping tables.
//!
//! For every orientation an [`ObservationMapping`] says, sample by sample,
//! which facelet position (in the default orientation) the sampled sticker
//! belongs to, or [`Slot::Skip`] when that sticker is already known from an
//! earlier phase.  Together the four tables must write every non-center
//! facelet exactly once; see [`verifier`][crate::verifier].
//!
//! # Standard tables
//!
//! The camera sees the U, R and F faces.  Samples are taken in the order
//! U1..U9, R1..R9, F1..F9 (centers excluded), so each view has 24 samples.
//!
//! | phase | rotation | newly visible |
//! |---|---|---|
//! | default | – | all of U, R, F |
//! | fb | `F2 B2` | D1–D3, D7–D9 on U; L columns on R |
//! | lr | `L2 R2` | D4, D6 on U; B columns on F |
//! | ud | `U2 D2` | L2, L8 on R; B2, B8 on F |

use std::fmt;
use std::str::FromStr;

use cubesight_types::Face::{B, D, F, L, R, U};
use cubesight_types::{CubeError, Face, Facelet, Orientation};
use serde::{Deserialize, Serialize};

/// Textual form of [`Slot::Skip`].
pub const SKIP_TOKEN: &str = "-";

/// What a single sample contributes to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Slot {
    /// Overwrite this facelet with the classified sample.
    Write(Facelet),
    /// Ignore the sample.
    Skip,
}

impl Slot {
    pub fn facelet(self) -> Option<Facelet> {
        match self {
            Slot::Write(f) => Some(f),
            Slot::Skip => None,
        }
    }
}

/// Only used in `const` tables, so a bad index fails the build.
const fn w(face: Face, index: u8) -> Slot {
    match Facelet::checked(face, index) {
        Some(f) => Slot::Write(f),
        None => panic!("facelet index outside 1..=9"),
    }
}

const S: Slot = Slot::Skip;

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Write(facelet) => write!(f, "{facelet}"),
            Slot::Skip => f.write_str(SKIP_TOKEN),
        }
    }
}

impl FromStr for Slot {
    type Err = CubeError;

    /// Only the exact [`SKIP_TOKEN`] means skip; anything else must be a
    /// valid facelet such as `"D9"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SKIP_TOKEN {
            Ok(Slot::Skip)
        } else {
            s.parse().map(Slot::Write)
        }
    }
}

impl TryFrom<String> for Slot {
    type Error = CubeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

/// Ordered slots for one orientation, parallel to that orientation's
/// pixel map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationMapping(Vec<Slot>);

impl ObservationMapping {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Facelets this mapping writes, in sample order.
    pub fn written(&self) -> impl Iterator<Item = Facelet> + '_ {
        self.0.iter().filter_map(|s| s.facelet())
    }

    /// Parse whitespace-separated tokens, e.g. `"D9 D8 - - D3"`.
    ///
    /// # Errors
    ///
    /// [`CubeError::InvalidNotation`] for the first bad token.
    pub fn from_tokens(text: &str) -> Result<Self, CubeError> {
        text.split_whitespace()
            .map(str::parse::<Slot>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for ObservationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{slot}")?;
        }
        Ok(())
    }
}

#[rustfmt::skip]
const DEFAULT_SLOTS: [Slot; 24] = [
    w(U, 1), w(U, 2), w(U, 3), w(U, 4), w(U, 6), w(U, 7), w(U, 8), w(U, 9),
    w(R, 1), w(R, 2), w(R, 3), w(R, 4), w(R, 6), w(R, 7), w(R, 8), w(R, 9),
    w(F, 1), w(F, 2), w(F, 3), w(F, 4), w(F, 6), w(F, 7), w(F, 8), w(F, 9),
];

#[rustfmt::skip]
const FB_SLOTS: [Slot; 24] = [
    w(D, 9), w(D, 8), w(D, 7), S, S, w(D, 3), w(D, 2), w(D, 1),
    w(L, 9), S, w(L, 7), w(L, 6), w(L, 4), w(L, 3), S, w(L, 1),
    S, S, S, S, S, S, S, S,
];

#[rustfmt::skip]
const LR_SLOTS: [Slot; 24] = [
    S, S, S, w(D, 4), w(D, 6), S, S, S,
    S, S, S, S, S, S, S, S,
    w(B, 9), S, w(B, 7), w(B, 6), w(B, 4), w(B, 3), S, w(B, 1),
];

#[rustfmt::skip]
const UD_SLOTS: [Slot; 24] = [
    S, S, S, S, S, S, S, S,
    S, w(L, 2), S, S, S, S, w(L, 8), S,
    S, w(B, 2), S, S, S, S, w(B, 8), S,
];

/// The four observation mappings of a reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTables {
    pub default: ObservationMapping,
    pub fb: ObservationMapping,
    pub lr: ObservationMapping,
    pub ud: ObservationMapping,
}

impl Default for MappingTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl MappingTables {
    /// Tables for the standard U/R/F camera view (see module docs).
    pub fn standard() -> Self {
        Self {
            default: ObservationMapping::new(DEFAULT_SLOTS.to_vec()),
            fb: ObservationMapping::new(FB_SLOTS.to_vec()),
            lr: ObservationMapping::new(LR_SLOTS.to_vec()),
            ud: ObservationMapping::new(UD_SLOTS.to_vec()),
        }
    }

    pub fn for_orientation(&self, orientation: Orientation) -> &ObservationMapping {
        match orientation {
            Orientation::Default => &self.default,
            Orientation::FbRotated => &self.fb,
            Orientation::LrRotated => &self.lr,
            Orientation::UdRotated => &self.ud,
        }
    }

    /// Build tables from token strings, in default/fb/lr/ud order.
    ///
    /// # Errors
    ///
    /// [`CubeError::InvalidNotation`] for any bad token.
    pub fn from_tokens(default: &str, fb: &str, lr: &str, ud: &str) -> Result<Self, CubeError> {
        Ok(Self {
            default: ObservationMapping::from_tokens(default)?,
            fb: ObservationMapping::from_tokens(fb)?,
            lr: ObservationMapping::from_tokens(lr)?,
            ud: ObservationMapping::from_tokens(ud)?,
        })
    }
}

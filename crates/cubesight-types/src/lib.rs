//! `cubesight-types` – shared vocabulary of the cubesight workspace.
//!
//! Every other crate speaks in these types: the six [`Face`] colors, the 54
//! [`Facelet`] positions in piece order, the [`CubeState`] being assembled,
//! move notation ([`Move`], [`Algorithm`]) and the single workspace error
//! [`CubeError`].

pub mod notation;
pub mod state;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use notation::{Algorithm, Move, Turn};
pub use state::{CubeState, SOLVED_FACELETS};

/// Number of facelets on the cube surface.
pub const FACELET_COUNT: usize = 54;

/// Index (1-based) of the center facelet on every face.
pub const CENTER_INDEX: u8 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Face
// ────────────────────────────────────────────────────────────────────────────

/// One face of the cube, which doubles as the color of that face's center.
///
/// The declaration order (U, R, F, D, L, B) is the piece order used by the
/// external solver and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    /// All faces in piece order.
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// Position of this face in piece order (0..6).
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// The single-letter notation for this face.
    pub fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    /// Parse a face letter.  Only the six uppercase letters are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::InvalidNotation`] for any other character.
    pub fn from_letter(c: char) -> Result<Face, CubeError> {
        match c {
            'U' => Ok(Face::U),
            'R' => Ok(Face::R),
            'F' => Ok(Face::F),
            'D' => Ok(Face::D),
            'L' => Ok(Face::L),
            'B' => Ok(Face::B),
            other => Err(CubeError::InvalidNotation(format!(
                "'{other}' is not a face letter"
            ))),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rgb
// ────────────────────────────────────────────────────────────────────────────

/// An 8-bit RGB triple, either read from a frame or used as a palette
/// reference.  Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Facelet
// ────────────────────────────────────────────────────────────────────────────

/// A single sticker position: a face plus a 1-based index (1..=9) reading
/// row by row in the standard cube net.  Index 5 is the center.
///
/// Serialized as its text form, e.g. `"D9"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Facelet {
    face: Face,
    index: u8,
}

impl Facelet {
    /// Create a facelet position.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::InvalidNotation`] when `index` is outside 1..=9.
    pub fn new(face: Face, index: u8) -> Result<Self, CubeError> {
        Self::checked(face, index).ok_or_else(|| {
            CubeError::InvalidNotation(format!("facelet index {index} on {face} is outside 1..=9"))
        })
    }

    /// `const` form of [`Facelet::new`] for static tables; `None` when
    /// `index` is outside 1..=9.
    pub const fn checked(face: Face, index: u8) -> Option<Self> {
        if index >= 1 && index <= 9 {
            Some(Self { face, index })
        } else {
            None
        }
    }

    pub fn face(self) -> Face {
        self.face
    }

    pub fn index(self) -> u8 {
        self.index
    }

    pub fn is_center(self) -> bool {
        self.index == CENTER_INDEX
    }

    /// Serialization index of this facelet in piece order (0..54).
    pub fn piece_index(self) -> usize {
        self.face.ordinal() * 9 + usize::from(self.index - 1)
    }

    /// Inverse of [`piece_index`][Self::piece_index].
    pub fn from_piece_index(i: usize) -> Option<Self> {
        let face = *Face::ALL.get(i / 9)?;
        Some(Self {
            face,
            index: (i % 9) as u8 + 1,
        })
    }

    /// Every facelet in piece order.
    pub fn all() -> impl Iterator<Item = Facelet> {
        (0..FACELET_COUNT).filter_map(Facelet::from_piece_index)
    }

    /// The six centers, in piece order.
    pub fn centers() -> impl Iterator<Item = Facelet> {
        Face::ALL.into_iter().map(|face| Facelet {
            face,
            index: CENTER_INDEX,
        })
    }
}

impl fmt::Display for Facelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face, self.index)
    }
}

impl FromStr for Facelet {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CubeError::InvalidNotation(format!(
                "'{s}' is not a facelet (expected e.g. \"D9\")"
            )));
        };
        let face = Face::from_letter(letter)?;
        let index = digit.to_digit(10).ok_or_else(|| {
            CubeError::InvalidNotation(format!("'{s}' has a non-numeric facelet index"))
        })?;
        Facelet::new(face, index as u8)
    }
}

impl TryFrom<String> for Facelet {
    type Error = CubeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Facelet> for String {
    fn from(f: Facelet) -> Self {
        f.to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orientation
// ────────────────────────────────────────────────────────────────────────────

/// The four capture windows of a reconstruction.
///
/// Each non-default orientation is reached from [`Orientation::Default`] by a
/// self-inverse rotation pair; applying it again restores the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Default,
    FbRotated,
    LrRotated,
    UdRotated,
}

impl Orientation {
    /// Phases that follow the default capture, in the order they run.
    pub const PHASES: [Orientation; 3] = [
        Orientation::FbRotated,
        Orientation::LrRotated,
        Orientation::UdRotated,
    ];

    /// All four orientations, default first.
    pub const ALL: [Orientation; 4] = [
        Orientation::Default,
        Orientation::FbRotated,
        Orientation::LrRotated,
        Orientation::UdRotated,
    ];

    /// The rotation that reaches this orientation from the default one (and
    /// returns from it).  Empty for [`Orientation::Default`].
    pub fn rotation(self) -> Algorithm {
        let faces: &[Face] = match self {
            Orientation::Default => &[],
            Orientation::FbRotated => &[Face::F, Face::B],
            Orientation::LrRotated => &[Face::L, Face::R],
            Orientation::UdRotated => &[Face::U, Face::D],
        };
        faces
            .iter()
            .map(|&face| Move::new(face, Turn::Double))
            .collect()
    }

    /// Short label used in logs and config keys.
    pub fn label(self) -> &'static str {
        match self {
            Orientation::Default => "default",
            Orientation::FbRotated => "fb",
            Orientation::LrRotated => "lr",
            Orientation::UdRotated => "ud",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Workspace-wide error type.  Any variant aborts the current reconstruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Capture failed on {device}: {details}")]
    Capture { device: String, details: String },

    #[error("Actuation failed on {device}: {details}")]
    Actuation { device: String, details: String },

    #[error("Pixel ({x}, {y}) is outside the {width}x{height} frame")]
    Bounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Mapping tables are inconsistent: {0}")]
    MappingConsistency(String),

    #[error("Invalid notation: {0}")]
    InvalidNotation(String),

    #[error("Cube state has {unresolved} unresolved facelet(s)")]
    Incomplete { unresolved: usize },

    #[error("Color {face} appears {count} times (expected 9)")]
    ColorImbalance { face: Face, count: usize },

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_index_is_a_bijection() {
        let indices: Vec<usize> = Facelet::all().map(Facelet::piece_index).collect();
        assert_eq!(indices, (0..FACELET_COUNT).collect::<Vec<_>>());
        for i in 0..FACELET_COUNT {
            let f = Facelet::from_piece_index(i).unwrap();
            assert_eq!(f.piece_index(), i);
        }
        assert!(Facelet::from_piece_index(FACELET_COUNT).is_none());
    }

    #[test]
    fn piece_order_is_urfdlb() {
        assert_eq!(Facelet::new(Face::U, 1).unwrap().piece_index(), 0);
        assert_eq!(Facelet::new(Face::R, 1).unwrap().piece_index(), 9);
        assert_eq!(Facelet::new(Face::F, 5).unwrap().piece_index(), 22);
        assert_eq!(Facelet::new(Face::B, 9).unwrap().piece_index(), 53);
    }

    #[test]
    fn facelet_parse_and_display() {
        let f: Facelet = "D9".parse().unwrap();
        assert_eq!(f, Facelet::new(Face::D, 9).unwrap());
        assert_eq!(f.to_string(), "D9");
        assert!("d9".parse::<Facelet>().is_err());
        assert!("D0".parse::<Facelet>().is_err());
        assert!("D10".parse::<Facelet>().is_err());
        assert!("-".parse::<Facelet>().is_err());
    }

    #[test]
    fn out_of_range_index_is_rejected_without_panicking() {
        const D9: Option<Facelet> = Facelet::checked(Face::D, 9);
        assert_eq!(D9.map(|f| f.to_string()).as_deref(), Some("D9"));
        for index in [0, 10, u8::MAX] {
            assert!(Facelet::checked(Face::U, index).is_none());
            assert!(matches!(
                Facelet::new(Face::U, index),
                Err(CubeError::InvalidNotation(_))
            ));
        }
    }

    #[test]
    fn facelet_serde_uses_text_form() {
        let json = serde_json::to_string(&Facelet::new(Face::L, 2).unwrap()).unwrap();
        assert_eq!(json, "\"L2\"");
        let back: Facelet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Facelet::new(Face::L, 2).unwrap());
        assert!(serde_json::from_str::<Facelet>("\"X2\"").is_err());
    }

    #[test]
    fn rgb_serializes_as_array() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
    }

    #[test]
    fn centers_are_index_five() {
        let centers: Vec<Facelet> = Facelet::centers().collect();
        assert_eq!(centers.len(), 6);
        assert!(centers.iter().all(|f| f.is_center()));
    }

    #[test]
    fn lowercase_face_letter_rejected() {
        assert!(matches!(
            Face::from_letter('u'),
            Err(CubeError::InvalidNotation(_))
        ));
    }

    #[test]
    fn phase_rotations_are_double_turn_pairs() {
        assert!(Orientation::Default.rotation().is_empty());
        assert_eq!(Orientation::FbRotated.rotation().to_string(), "F2 B2");
        assert_eq!(Orientation::LrRotated.rotation().to_string(), "L2 R2");
        assert_eq!(Orientation::UdRotated.rotation().to_string(), "U2 D2");
    }

    #[test]
    fn error_display() {
        let err = CubeError::Bounds {
            x: 700,
            y: 10,
            width: 640,
            height: 480,
        };
        assert!(err.to_string().contains("640x480"));
        let err = CubeError::ColorImbalance {
            face: Face::R,
            count: 10,
        };
        assert!(err.to_string().contains("R appears 10"));
    }
}

//! Reference palette and nearest-color classification.
//!
//! The [`Palette`] holds one reference color per face.  The
//! [`ColorClassifier`] maps an observed sample to the face whose reference
//! color is nearest in RGB space (Euclidean distance).  Ties go to the entry
//! declared first, so classification is a total, deterministic function.

use cubesight_types::{CubeError, Face, Rgb};
use serde::{Deserialize, Serialize};

/// One palette entry: a face and the color its stickers show on camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub face: Face,
    pub rgb: Rgb,
}

impl PaletteEntry {
    pub const fn new(face: Face, rgb: Rgb) -> Self {
        Self { face, rgb }
    }
}

/// Six reference colors, one per face, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PaletteEntry>", into = "Vec<PaletteEntry>")]
pub struct Palette {
    entries: [PaletteEntry; 6],
}

/// Reference colors measured under the rig's lighting.
pub const STANDARD_PALETTE: [PaletteEntry; 6] = [
    PaletteEntry::new(Face::U, Rgb::new(209, 190, 183)),
    PaletteEntry::new(Face::R, Rgb::new(255, 128, 0)),
    PaletteEntry::new(Face::F, Rgb::new(24, 29, 61)),
    PaletteEntry::new(Face::D, Rgb::new(255, 255, 0)),
    PaletteEntry::new(Face::L, Rgb::new(219, 101, 106)),
    PaletteEntry::new(Face::B, Rgb::new(0, 255, 0)),
];

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl Palette {
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_PALETTE,
        }
    }

    /// Build a palette from six entries that tag every face exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Config`] for a wrong entry count or a face that
    /// is missing or repeated.
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self, CubeError> {
        let entries: [PaletteEntry; 6] = entries.try_into().map_err(|v: Vec<_>| {
            CubeError::Config(format!("palette needs 6 entries, got {}", v.len()))
        })?;
        for face in Face::ALL {
            let tagged = entries.iter().filter(|e| e.face == face).count();
            if tagged != 1 {
                return Err(CubeError::Config(format!(
                    "palette tags face {face} {tagged} times (expected once)"
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PaletteEntry; 6] {
        &self.entries
    }

    /// Reference color of `face`.
    pub fn color_of(&self, face: Face) -> Rgb {
        self.colors_by_face()[face.ordinal()]
    }

    /// Reference colors indexed by [`Face::ordinal`].
    pub fn colors_by_face(&self) -> [Rgb; 6] {
        let mut colors = [Rgb::new(0, 0, 0); 6];
        for entry in &self.entries {
            colors[entry.face.ordinal()] = entry.rgb;
        }
        colors
    }
}

impl TryFrom<Vec<PaletteEntry>> for Palette {
    type Error = CubeError;

    fn try_from(entries: Vec<PaletteEntry>) -> Result<Self, Self::Error> {
        Palette::new(entries)
    }
}

impl From<Palette> for Vec<PaletteEntry> {
    fn from(p: Palette) -> Self {
        p.entries.to_vec()
    }
}

/// Nearest-palette-color classifier.
#[derive(Debug, Clone, Default)]
pub struct ColorClassifier {
    palette: Palette,
}

impl ColorClassifier {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Face whose reference color is nearest to `sample`.
    pub fn classify(&self, sample: Rgb) -> Face {
        let mut best = self.palette.entries[0];
        let mut best_d = best.rgb.distance_sq(sample);
        for entry in &self.palette.entries[1..] {
            let d = entry.rgb.distance_sq(sample);
            // Strict comparison keeps the earlier entry on ties.
            if d < best_d {
                best = *entry;
                best_d = d;
            }
        }
        best.face
    }
}

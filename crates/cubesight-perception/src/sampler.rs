//! Pixel sampling at calibrated coordinates.
//!
//! A [`PixelMap`] lists, in a fixed order, the pixel at which each visible
//! non-center facelet appears in a frame.  [`sample`] reads those pixels and
//! returns one [`Rgb`] per coordinate, in map order.

use cubesight_hal::CameraFrame;
use cubesight_types::{CubeError, Orientation, Rgb};
use serde::{Deserialize, Serialize};

/// Calibrated `(x, y)` pixel coordinates for one orientation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixelMap(Vec<(u32, u32)>);

impl PixelMap {
    pub fn new(points: Vec<(u32, u32)>) -> Self {
        Self(points)
    }

    /// Coordinates for a camera looking at the U, R and F faces of the cube
    /// in a 640×480 frame.  Points follow U1..U9, R1..R9, F1..F9, skipping
    /// the centers.
    pub fn standard() -> Self {
        // (origin_x, origin_y, column pitch, row pitch) per visible face.
        const GRIDS: [(u32, u32, u32, u32); 3] = [
            (260, 40, 60, 45),  // U
            (420, 220, 60, 60), // R
            (200, 220, 60, 60), // F
        ];
        let mut points = Vec::with_capacity(24);
        for (ox, oy, dx, dy) in GRIDS {
            for i in 0..9u32 {
                if i == 4 {
                    continue;
                }
                points.push((ox + dx * (i % 3), oy + dy * (i / 3)));
            }
        }
        Self(points)
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One [`PixelMap`] per orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelMaps {
    pub default: PixelMap,
    pub fb: PixelMap,
    pub lr: PixelMap,
    pub ud: PixelMap,
}

impl Default for PixelMaps {
    /// The camera does not move between phases, so every orientation uses
    /// [`PixelMap::standard`].
    fn default() -> Self {
        Self {
            default: PixelMap::standard(),
            fb: PixelMap::standard(),
            lr: PixelMap::standard(),
            ud: PixelMap::standard(),
        }
    }
}

impl PixelMaps {
    pub fn for_orientation(&self, orientation: Orientation) -> &PixelMap {
        match orientation {
            Orientation::Default => &self.default,
            Orientation::FbRotated => &self.fb,
            Orientation::LrRotated => &self.lr,
            Orientation::UdRotated => &self.ud,
        }
    }
}

/// Read one color sample per coordinate of `map`, in map order.
///
/// # Errors
///
/// Returns [`CubeError::Bounds`] for the first coordinate outside the frame.
pub fn sample(frame: &CameraFrame, map: &PixelMap) -> Result<Vec<Rgb>, CubeError> {
    map.points()
        .iter()
        .map(|&(x, y)| {
            frame.pixel(x, y).ok_or(CubeError::Bounds {
                x,
                y,
                width: frame.width,
                height: frame.height,
            })
        })
        .collect()
}

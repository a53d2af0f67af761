//! `cubesight-perception` – turns camera frames into face colors.
//!
//! # Modules
//!
//! - [`palette`] – [`Palette`] of six reference colors and the
//!   nearest-color [`ColorClassifier`].
//! - [`sampler`] – calibrated [`PixelMap`]s and [`sample`][sampler::sample],
//!   which reads one RGB sample per coordinate from a frame.

pub mod palette;
pub mod sampler;

pub use palette::{ColorClassifier, Palette, PaletteEntry, STANDARD_PALETTE};
pub use sampler::{PixelMap, PixelMaps, sample};

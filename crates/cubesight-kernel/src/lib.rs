//! `cubesight-kernel` – the reconstruction core.
//!
//! - [`mapping`] – per-orientation [`ObservationMapping`]s from sample index
//!   to facelet, and the standard [`MappingTables`].
//! - [`verifier`] – [`MappingVerifier`], the rule engine that proves the
//!   tables write every non-center facelet exactly once.
//! - [`merger`] – [`StateMerger`], which classifies samples and folds them
//!   into a [`CubeState`][cubesight_types::CubeState].

pub mod mapping;
pub mod merger;
pub mod verifier;

pub use mapping::{MappingTables, ObservationMapping, SKIP_TOKEN, Slot};
pub use merger::StateMerger;
pub use verifier::{
    CoverageRule, FullCoverageRule, LengthRule, MappingVerifier, NoCenterRule, WriteOnceRule,
};

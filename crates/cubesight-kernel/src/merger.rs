//! Folding one view's samples into the partial cube state.

use cubesight_perception::ColorClassifier;
use cubesight_types::{CubeError, CubeState, Rgb};

use crate::mapping::{ObservationMapping, Slot};

/// Classifies samples and writes them into a [`CubeState`] through an
/// [`ObservationMapping`].
#[derive(Debug, Clone, Default)]
pub struct StateMerger {
    classifier: ColorClassifier,
}

impl StateMerger {
    pub fn new(classifier: ColorClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    /// Apply `samples` to `state` slot by slot.  Write slots overwrite the
    /// addressed facelet with the sample's classified face; skip slots leave
    /// the state alone.  Returns the number of facelets written.
    ///
    /// # Errors
    ///
    /// [`CubeError::MappingConsistency`] when the sample count differs from
    /// the mapping length.  `state` is not touched in that case.
    pub fn merge(
        &self,
        state: &mut CubeState,
        samples: &[Rgb],
        mapping: &ObservationMapping,
    ) -> Result<usize, CubeError> {
        if samples.len() != mapping.len() {
            return Err(CubeError::MappingConsistency(format!(
                "{} samples for a mapping of {} slots",
                samples.len(),
                mapping.len()
            )));
        }
        let mut written = 0;
        for (&rgb, slot) in samples.iter().zip(mapping.slots()) {
            if let Slot::Write(facelet) = *slot {
                let face = self.classifier.classify(rgb);
                tracing::trace!(%facelet, %face, "facelet resolved");
                state.set(facelet, face);
                written += 1;
            }
        }
        Ok(written)
    }
}

//! Generic `Actuator` trait for the face-turning mechanism.
//!
//! The rest of the stack only ever talks to the trait, so the serial
//! controller link, the simulator and test doubles are interchangeable.

use cubesight_types::{Algorithm, CubeError};

/// A mechanism that turns cube faces.
pub trait Actuator: Send {
    /// Stable identifier for this actuator, e.g. `"controller"`.
    fn id(&self) -> &str;

    /// Execute `algorithm` and return only once the mechanism has confirmed
    /// that every move in it is complete.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Actuation`] if the moves cannot be performed or
    /// their completion is never confirmed.
    fn rotate(&mut self, algorithm: &Algorithm) -> Result<(), CubeError>;
}

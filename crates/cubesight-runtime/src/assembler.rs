//! [`Assembler`] – the orientation sequencer.
//!
//! One reconstruction runs four observation phases against a single camera
//! that sees the U, R and F faces:
//!
//! 1. **Default** – capture, sample, merge with the default mapping.
//! 2. **FB / LR / UD** – for each phase in turn: rotate into the phase
//!    orientation, capture, sample, merge with that phase's mapping, then
//!    apply the same (self-inverse) rotation again to restore the default
//!    orientation.
//!
//! The camera is held through a [`CameraSession`] for the whole run, so it
//! is released exactly once whether the run succeeds or aborts.  Any error
//! aborts the run and is returned as is; a partial state is never handed
//! back.  After the last phase the state must be complete with nine
//! stickers of every color.
//!
//! # Example
//!
//! ```rust
//! use cubesight_hal::sim::{SimActuator, SimCamera, SimCube};
//! use cubesight_perception::{Palette, PixelMap};
//! use cubesight_kernel::MappingTables;
//! use cubesight_runtime::{Assembler, AssemblerConfig};
//! use cubesight_types::SOLVED_FACELETS;
//!
//! let cube = SimCube::solved().into_shared();
//! let view = MappingTables::standard()
//!     .default
//!     .written()
//!     .zip(PixelMap::standard().points().iter().copied())
//!     .map(|(f, (x, y))| (f, x, y))
//!     .collect();
//! let camera = SimCamera::new(cube.clone(), view, Palette::standard().colors_by_face(), 640, 480);
//! let actuator = SimActuator::new(cube);
//!
//! let mut assembler =
//!     Assembler::new(Box::new(camera), Box::new(actuator), AssemblerConfig::default()).unwrap();
//! assert_eq!(assembler.reconstruct_string().unwrap(), SOLVED_FACELETS);
//! ```

use cubesight_hal::{Actuator, Camera, CameraSession};
use cubesight_kernel::{MappingTables, StateMerger};
use cubesight_perception::{ColorClassifier, Palette, PixelMaps, sample};
use cubesight_types::{CubeError, CubeState, Orientation};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Calibration bundle for an [`Assembler`].
#[derive(Debug, Clone, Default)]
pub struct AssemblerConfig {
    /// Reference colors used to classify samples.
    pub palette: Palette,
    /// Where each visible facelet appears in a frame, per orientation.
    pub pixel_maps: PixelMaps,
    /// Which facelet each sample belongs to, per orientation.
    pub tables: MappingTables,
}

// ─────────────────────────────────────────────────────────────────────────────
// Observer
// ─────────────────────────────────────────────────────────────────────────────

/// Frame → samples → merged state, for one orientation.
struct Observer {
    merger: StateMerger,
    pixel_maps: PixelMaps,
    tables: MappingTables,
}

impl Observer {
    fn observe(
        &self,
        frame: &cubesight_hal::CameraFrame,
        orientation: Orientation,
        state: &mut CubeState,
    ) -> Result<usize, CubeError> {
        let samples = sample(frame, self.pixel_maps.for_orientation(orientation))?;
        let written =
            self.merger
                .merge(state, &samples, self.tables.for_orientation(orientation))?;
        debug!(
            phase = %orientation,
            written,
            unresolved = state.unresolved().len(),
            "samples merged"
        );
        Ok(written)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assembler
// ─────────────────────────────────────────────────────────────────────────────

/// Drives the camera and actuator through the observation phases and
/// assembles the full cube state.
pub struct Assembler {
    camera: Box<dyn Camera>,
    actuator: Box<dyn Actuator>,
    observer: Observer,
}

impl Assembler {
    /// Build an assembler.  The mapping tables are checked against the
    /// pixel maps here, once, rather than on every reconstruction.
    ///
    /// # Errors
    ///
    /// [`CubeError::MappingConsistency`] if the tables fail validation.
    pub fn new(
        camera: Box<dyn Camera>,
        actuator: Box<dyn Actuator>,
        config: AssemblerConfig,
    ) -> Result<Self, CubeError> {
        config.tables.validate(&config.pixel_maps)?;
        info!(
            camera = camera.id(),
            actuator = actuator.id(),
            "assembler ready; mapping tables cover every facelet"
        );
        Ok(Self {
            camera,
            actuator,
            observer: Observer {
                merger: StateMerger::new(ColorClassifier::new(config.palette)),
                pixel_maps: config.pixel_maps,
                tables: config.tables,
            },
        })
    }

    /// The actuator the assembler rotates with, e.g. to execute a solution
    /// once the state is known.
    pub fn actuator_mut(&mut self) -> &mut dyn Actuator {
        self.actuator.as_mut()
    }

    /// Run all four observation phases and return the complete state.
    ///
    /// # Errors
    ///
    /// - [`CubeError::Capture`] / [`CubeError::Actuation`] from the devices.
    /// - [`CubeError::Bounds`] if a pixel map does not fit the frame.
    /// - [`CubeError::Incomplete`] / [`CubeError::ColorImbalance`] if the
    ///   assembled state fails the final check.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4()))]
    pub fn reconstruct(&mut self) -> Result<CubeState, CubeError> {
        let result = self.run_phases();
        match &result {
            Ok(_) => info!("reconstruction complete"),
            Err(e) => error!(error = %e, "reconstruction aborted"),
        }
        result
    }

    /// [`reconstruct`](Self::reconstruct), serialized as the 54-character
    /// facelet string.
    pub fn reconstruct_string(&mut self) -> Result<String, CubeError> {
        self.reconstruct()?.to_facelet_string()
    }

    fn run_phases(&mut self) -> Result<CubeState, CubeError> {
        let mut state = CubeState::new();
        let mut session = CameraSession::open(self.camera.as_mut())?;

        info!(phase = %Orientation::Default, "observing");
        let frame = session.capture()?;
        self.observer
            .observe(&frame, Orientation::Default, &mut state)?;

        for phase in Orientation::PHASES {
            let rotation = phase.rotation();
            info!(phase = %phase, rotation = %rotation, "observing");
            self.actuator.rotate(&rotation)?;
            let frame = session.capture()?;
            self.observer.observe(&frame, phase, &mut state)?;
            self.actuator.rotate(&rotation)?;
        }
        drop(session);

        state.verify()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cubesight_hal::sim::{SimActuator, SimCamera, SimCube};
    use cubesight_hal::CameraFrame;
    use cubesight_kernel::ObservationMapping;
    use cubesight_perception::PixelMap;
    use cubesight_types::{Algorithm, Rgb, SOLVED_FACELETS};

    fn sim_rig(cube: SimCube) -> (SimCamera, SimActuator) {
        let shared = cube.into_shared();
        let view = MappingTables::standard()
            .default
            .written()
            .zip(PixelMap::standard().points().iter().copied())
            .map(|(f, (x, y))| (f, x, y))
            .collect();
        let camera = SimCamera::new(
            shared.clone(),
            view,
            Palette::standard().colors_by_face(),
            640,
            480,
        );
        (camera, SimActuator::new(shared))
    }

    struct BlankCamera;

    impl Camera for BlankCamera {
        fn id(&self) -> &str {
            "blank"
        }

        fn capture(&mut self) -> Result<CameraFrame, CubeError> {
            Ok(CameraFrame::filled(640, 480, Rgb::new(255, 255, 0)))
        }
    }

    /// Produces frames smaller than the standard pixel map and counts
    /// releases.
    struct SmallFrameCamera {
        released: Arc<AtomicUsize>,
    }

    impl Camera for SmallFrameCamera {
        fn id(&self) -> &str {
            "small"
        }

        fn capture(&mut self) -> Result<CameraFrame, CubeError> {
            Ok(CameraFrame::filled(320, 240, Rgb::new(255, 255, 255)))
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn undersized_frame_is_a_bounds_error_and_releases_camera() {
        let (_, actuator) = sim_rig(SimCube::solved());
        let history = actuator.history();
        let released = Arc::new(AtomicUsize::new(0));
        let camera = SmallFrameCamera {
            released: Arc::clone(&released),
        };
        let mut a = Assembler::new(
            Box::new(camera),
            Box::new(actuator),
            AssemblerConfig::default(),
        )
        .unwrap();

        let err = a.reconstruct().unwrap_err();
        assert!(
            matches!(err, CubeError::Bounds { width: 320, height: 240, .. }),
            "{err:?}"
        );
        assert_eq!(released.load(Ordering::SeqCst), 1);
        // The default view failed, so no phase rotation was attempted.
        assert!(history.lock().unwrap().is_empty());
    }

    #[test]
    fn solved_cube_reconstructs_to_solved_string() {
        let (camera, actuator) = sim_rig(SimCube::solved());
        let mut a =
            Assembler::new(Box::new(camera), Box::new(actuator), AssemblerConfig::default())
                .unwrap();
        assert_eq!(a.reconstruct_string().unwrap(), SOLVED_FACELETS);
    }

    #[test]
    fn rotations_follow_phase_order_and_restore() {
        let (camera, actuator) = sim_rig(SimCube::solved());
        let history = actuator.history();
        let mut a =
            Assembler::new(Box::new(camera), Box::new(actuator), AssemblerConfig::default())
                .unwrap();
        a.reconstruct().unwrap();

        let sent: Vec<String> = history.lock().unwrap().iter().map(|a| a.to_string()).collect();
        assert_eq!(sent, ["F2 B2", "F2 B2", "L2 R2", "L2 R2", "U2 D2", "U2 D2"]);
    }

    #[test]
    fn inconsistent_tables_rejected_at_construction() {
        let (camera, actuator) = sim_rig(SimCube::solved());
        let mut config = AssemblerConfig::default();
        config.tables.fb = ObservationMapping::new(vec![cubesight_kernel::Slot::Skip; 24]);
        let err = Assembler::new(Box::new(camera), Box::new(actuator), config)
            .err()
            .unwrap();
        assert!(matches!(err, CubeError::MappingConsistency(_)));
    }

    #[test]
    fn uniform_frames_fail_the_final_check() {
        let (_, actuator) = sim_rig(SimCube::solved());
        let mut a = Assembler::new(
            Box::new(BlankCamera),
            Box::new(actuator),
            AssemblerConfig::default(),
        )
        .unwrap();
        // Every sample classifies as D: 6 centers are fine, D is over-counted.
        assert!(matches!(
            a.reconstruct(),
            Err(CubeError::ColorImbalance { .. })
        ));
    }

    #[test]
    fn actuator_is_reachable_for_follow_up_moves() {
        let (camera, actuator) = sim_rig(SimCube::solved());
        let history = actuator.history();
        let mut a =
            Assembler::new(Box::new(camera), Box::new(actuator), AssemblerConfig::default())
                .unwrap();
        let alg: Algorithm = "R U".parse().unwrap();
        a.actuator_mut().rotate(&alg).unwrap();
        assert_eq!(history.lock().unwrap().as_slice(), &[alg]);
    }
}

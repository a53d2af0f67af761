//! In-process cube simulator for CI/CD testing without physical hardware.
//!
//! [`SimCube`] is a facelet-level model of a physical cube.  A
//! [`SimActuator`] turns its faces and a [`SimCamera`] renders the facelets
//! it can see into an RGB frame, so the full reconstruction stack can run in
//! headless tests.  Both drivers share the cube through a [`SharedCube`].
//!
//! # Example
//!
//! ```rust
//! use cubesight_hal::sim::SimCube;
//! use cubesight_types::{Algorithm, SOLVED_FACELETS};
//!
//! let scramble: Algorithm = "R U F'".parse().unwrap();
//! let mut cube = SimCube::scrambled(&scramble);
//! assert_ne!(cube.facelet_string(), SOLVED_FACELETS);
//!
//! cube.apply_algorithm(&scramble.inverse());
//! assert_eq!(cube.facelet_string(), SOLVED_FACELETS);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use cubesight_types::{Algorithm, CubeError, FACELET_COUNT, Face, Facelet, Move, Rgb};
use tracing::debug;

use crate::actuator::Actuator;
use crate::camera::{Camera, CameraFrame};

// ────────────────────────────────────────────────────────────────────────────
// Cube model
// ────────────────────────────────────────────────────────────────────────────

/// Piece-order indices moved by one clockwise quarter turn of each face, as
/// five 4-cycles: the sticker at `cycle[k]` moves to `cycle[k + 1]`.
const QUARTER_TURN_CYCLES: [[[usize; 4]; 5]; 6] = [
    // U: (U1 U3 U9 U7) (U2 U6 U8 U4) (R1 F1 L1 B1) (R2 F2 L2 B2) (R3 F3 L3 B3)
    [[0, 2, 8, 6], [1, 5, 7, 3], [9, 18, 36, 45], [10, 19, 37, 46], [11, 20, 38, 47]],
    // R: (R1 R3 R9 R7) (R2 R6 R8 R4) (U3 B7 D3 F3) (U6 B4 D6 F6) (U9 B1 D9 F9)
    [[9, 11, 17, 15], [10, 14, 16, 12], [2, 51, 29, 20], [5, 48, 32, 23], [8, 45, 35, 26]],
    // F: (F1 F3 F9 F7) (F2 F6 F8 F4) (U7 R1 D3 L9) (U8 R4 D2 L6) (U9 R7 D1 L3)
    [[18, 20, 26, 24], [19, 23, 25, 21], [6, 9, 29, 44], [7, 12, 28, 41], [8, 15, 27, 38]],
    // D: (D1 D3 D9 D7) (D2 D6 D8 D4) (R7 B7 L7 F7) (R8 B8 L8 F8) (R9 B9 L9 F9)
    [[27, 29, 35, 33], [28, 32, 34, 30], [15, 51, 42, 24], [16, 52, 43, 25], [17, 53, 44, 26]],
    // L: (L1 L3 L9 L7) (L2 L6 L8 L4) (U1 F1 D1 B9) (U4 F4 D4 B6) (U7 F7 D7 B3)
    [[36, 38, 44, 42], [37, 41, 43, 39], [0, 18, 27, 53], [3, 21, 30, 50], [6, 24, 33, 47]],
    // B: (B1 B3 B9 B7) (B2 B6 B8 B4) (U1 L7 D9 R3) (U2 L4 D8 R6) (U3 L1 D7 R9)
    [[45, 47, 53, 51], [46, 50, 52, 48], [0, 42, 35, 11], [1, 39, 34, 14], [2, 36, 33, 17]],
];

/// Facelet-level model of a physical cube.  Index `i` holds the color of
/// the sticker currently at piece-order position `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCube {
    facelets: [Face; FACELET_COUNT],
}

/// A cube shared between the simulated camera and actuator.
pub type SharedCube = Arc<Mutex<SimCube>>;

impl Default for SimCube {
    fn default() -> Self {
        Self::solved()
    }
}

impl SimCube {
    pub fn solved() -> Self {
        let mut facelets = [Face::U; FACELET_COUNT];
        for f in Facelet::all() {
            facelets[f.piece_index()] = f.face();
        }
        Self { facelets }
    }

    /// A solved cube with `scramble` applied.
    pub fn scrambled(scramble: &Algorithm) -> Self {
        let mut cube = Self::solved();
        cube.apply_algorithm(scramble);
        cube
    }

    /// Wrap the cube for sharing between drivers.
    pub fn into_shared(self) -> SharedCube {
        Arc::new(Mutex::new(self))
    }

    pub fn get(&self, facelet: Facelet) -> Face {
        self.facelets[facelet.piece_index()]
    }

    pub fn apply(&mut self, mv: Move) {
        let cycles = &QUARTER_TURN_CYCLES[mv.face.ordinal()];
        for _ in 0..mv.turn.quarter_turns() {
            for cycle in cycles {
                let last = self.facelets[cycle[3]];
                for k in (1..4).rev() {
                    self.facelets[cycle[k]] = self.facelets[cycle[k - 1]];
                }
                self.facelets[cycle[0]] = last;
            }
        }
    }

    pub fn apply_algorithm(&mut self, algorithm: &Algorithm) {
        for &mv in algorithm.moves() {
            self.apply(mv);
        }
    }

    /// The 54-character facelet string of the current surface.
    pub fn facelet_string(&self) -> String {
        self.facelets.iter().map(|f| f.letter()).collect()
    }
}

fn lock(cube: &SharedCube) -> Option<MutexGuard<'_, SimCube>> {
    cube.lock().ok()
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated actuator
// ────────────────────────────────────────────────────────────────────────────

/// Turns the faces of a shared [`SimCube`].  Confirms instantly.
pub struct SimActuator {
    id: String,
    cube: SharedCube,
    calls: usize,
    fail_on_call: Option<usize>,
    history: Arc<Mutex<Vec<Algorithm>>>,
}

impl SimActuator {
    pub fn new(cube: SharedCube) -> Self {
        Self {
            id: "sim_actuator".to_string(),
            cube,
            calls: 0,
            fail_on_call: None,
            history: Arc::default(),
        }
    }

    /// Make the `n`-th rotate call (1-based) fail without moving the cube.
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Handle to the list of algorithms executed so far.
    pub fn history(&self) -> Arc<Mutex<Vec<Algorithm>>> {
        Arc::clone(&self.history)
    }
}

impl Actuator for SimActuator {
    fn id(&self) -> &str {
        &self.id
    }

    fn rotate(&mut self, algorithm: &Algorithm) -> Result<(), CubeError> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(CubeError::Actuation {
                device: self.id.clone(),
                details: format!("simulated fault on call {}", self.calls),
            });
        }
        let mut cube = lock(&self.cube).ok_or_else(|| CubeError::Actuation {
            device: self.id.clone(),
            details: "simulated cube lock poisoned".to_string(),
        })?;
        cube.apply_algorithm(algorithm);
        if let Ok(mut history) = self.history.lock() {
            history.push(algorithm.clone());
        }
        debug!(algorithm = %algorithm, "sim rotation applied");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated camera
// ────────────────────────────────────────────────────────────────────────────

/// Acquire/release/capture counters of a [`SimCamera`], readable after the
/// camera has been handed off.
#[derive(Debug, Default)]
pub struct SimCameraStats {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub captures: AtomicUsize,
}

impl SimCameraStats {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

/// Renders the visible facelets of a shared [`SimCube`].
///
/// Each `(facelet, x, y)` view point paints a 3×3 patch centered on `(x, y)`
/// with the color of whatever sticker currently sits at that physical
/// position; the rest of the frame is black.
pub struct SimCamera {
    id: String,
    cube: SharedCube,
    view: Vec<(Facelet, u32, u32)>,
    colors: [Rgb; 6],
    width: u32,
    height: u32,
    fail_on_capture: Option<usize>,
    stats: Arc<SimCameraStats>,
}

impl SimCamera {
    /// `colors` is indexed by [`Face::ordinal`].
    pub fn new(
        cube: SharedCube,
        view: Vec<(Facelet, u32, u32)>,
        colors: [Rgb; 6],
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: "sim_camera".to_string(),
            cube,
            view,
            colors,
            width,
            height,
            fail_on_capture: None,
            stats: Arc::default(),
        }
    }

    /// Make the `n`-th capture (1-based) fail.
    pub fn failing_on_capture(mut self, n: usize) -> Self {
        self.fail_on_capture = Some(n);
        self
    }

    pub fn stats(&self) -> Arc<SimCameraStats> {
        Arc::clone(&self.stats)
    }

    fn fault(&self, details: String) -> CubeError {
        CubeError::Capture {
            device: self.id.clone(),
            details,
        }
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn acquire(&mut self) -> Result<(), CubeError> {
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn capture(&mut self) -> Result<CameraFrame, CubeError> {
        let n = self.stats.captures.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_capture == Some(n) {
            return Err(self.fault(format!("simulated fault on capture {n}")));
        }
        let cube = lock(&self.cube)
            .ok_or_else(|| self.fault("simulated cube lock poisoned".to_string()))?;
        let mut frame = CameraFrame::filled(self.width, self.height, Rgb::new(0, 0, 0));
        for &(facelet, x, y) in &self.view {
            let color = self.colors[cube.get(facelet).ordinal()];
            for py in y.saturating_sub(1)..=y.saturating_add(1) {
                for px in x.saturating_sub(1)..=x.saturating_add(1) {
                    frame.put_pixel(px, py, color);
                }
            }
        }
        Ok(frame)
    }

    fn release(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

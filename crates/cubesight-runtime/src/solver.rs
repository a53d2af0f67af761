//! Solving a reconstructed cube and executing the solution.
//!
//! The solver itself lives outside this workspace.  [`ExternalSolver`]
//! runs it as a child process with the 54-character facelet string as its
//! last argument and reads the solution, in standard face-turn notation,
//! from stdout.  [`SolveSession`] ties reconstruction, solving and
//! execution together.

use std::process::Command;

use cubesight_types::{Algorithm, CubeError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::assembler::Assembler;

/// Anything that turns a facelet string into a solving algorithm.
pub trait Solver {
    /// # Errors
    ///
    /// [`CubeError::Solver`] if no solution can be produced.
    fn solve(&self, facelets: &str) -> Result<Algorithm, CubeError>;
}

/// A solver program invoked once per solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSolver {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExternalSolver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Solver for ExternalSolver {
    fn solve(&self, facelets: &str) -> Result<Algorithm, CubeError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(facelets)
            .output()
            .map_err(|e| CubeError::Solver(format!("failed to run '{}': {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CubeError::Solver(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<Algorithm>().map_err(|e| {
            CubeError::Solver(format!("unparsable solution {:?}: {e}", stdout.trim()))
        })
    }
}

/// Outcome of a [`SolveSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveReport {
    /// The reconstructed 54-character state.
    pub facelets: String,
    /// The executed solution; empty for an already solved cube.
    #[serde(serialize_with = "serialize_display")]
    pub solution: Algorithm,
}

fn serialize_display<S: serde::Serializer>(alg: &Algorithm, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(alg)
}

/// Reconstruct → solve → execute.
pub struct SolveSession;

impl SolveSession {
    /// Reconstruct the state through `assembler`, ask `solver` for a
    /// solution and rotate it on the assembler's actuator.
    ///
    /// # Errors
    ///
    /// Any reconstruction error, [`CubeError::Solver`], or the actuator's
    /// error while executing the solution.
    #[instrument(skip_all)]
    pub fn run(assembler: &mut Assembler, solver: &dyn Solver) -> Result<SolveReport, CubeError> {
        let facelets = assembler.reconstruct_string()?;
        info!(%facelets, "state reconstructed");

        let solution = solver.solve(&facelets).inspect_err(|e| {
            warn!(error = %e, "solver failed");
        })?;

        if solution.is_empty() {
            info!("cube already solved; nothing to execute");
        } else {
            info!(moves = solution.len(), %solution, "executing solution");
            assembler.actuator_mut().rotate(&solution)?;
        }

        Ok(SolveReport { facelets, solution })
    }
}

//! `cubesight-runtime` – runs reconstructions end to end.
//!
//! # Modules
//!
//! - [`assembler`] – [`Assembler`][assembler::Assembler]: sequences the
//!   default and FB/LR/UD observation phases over a camera and an actuator
//!   and assembles the full cube state.
//! - [`solver`] – the [`Solver`][solver::Solver] seam,
//!   [`ExternalSolver`][solver::ExternalSolver] (child-process solver) and
//!   [`SolveSession`][solver::SolveSession]: reconstruct, solve, execute.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: the global
//!   `tracing` subscriber with an optional OTLP span exporter.

pub mod assembler;
pub mod solver;
pub mod telemetry;

pub use assembler::{Assembler, AssemblerConfig};
pub use solver::{ExternalSolver, SolveReport, SolveSession, Solver};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};

//! `cubesight-hal` – Hardware Abstraction Layer.
//!
//! The reconstruction pipeline never touches a device directly; it talks to
//! the [`Camera`] and [`Actuator`] traits, which lets drivers be swapped for
//! simulators or test doubles.
//!
//! # Modules
//!
//! - [`camera`] – [`Camera`] trait, RGB24 [`CameraFrame`] and the scoped
//!   [`CameraSession`] guard.
//! - [`actuator`] – [`Actuator`] trait: synchronous, confirmed face turns.
//! - [`serial`] – [`SerialLink`]: echo-confirmed line protocol to the
//!   face-turning controller.
//! - [`file_camera`] – [`FrameFileCamera`]: replays image files as frames.
//! - [`sim`] – [`SimCube`][sim::SimCube], [`SimCamera`][sim::SimCamera] and
//!   [`SimActuator`][sim::SimActuator] for headless testing.

pub mod actuator;
pub mod camera;
pub mod file_camera;
pub mod serial;
pub mod sim;

pub use actuator::Actuator;
pub use camera::{Camera, CameraFrame, CameraSession};
pub use file_camera::FrameFileCamera;
pub use serial::SerialLink;

//! Application core: pure session logic, zero I/O.
//!
//! Session lifecycle, packet dispatch and the animation and drive state
//! shared between the packet path and the render path.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;

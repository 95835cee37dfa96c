//! Rover firmware library.
//!
//! Exposes the session core, protocol and colour maths for integration
//! testing and fuzzing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod fsm;
pub mod palette;
pub mod pins;
pub mod protocol;

// Hardware-facing modules; the sim builds of these run on the host.
pub mod adapters;
pub mod control;
pub mod drivers;

mod esp_link_shims;

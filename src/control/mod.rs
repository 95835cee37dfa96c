//! Actuation logic that sits between decoded commands and the ports.
//!
//! Both controllers own their state outright and borrow the port only for
//! the duration of a call, so the packet path and the render path never
//! hold competing handles.

pub mod animation;
pub mod drive;

//! Userspace driver for GXTP (Goodix) touchpads.
//!
//! Reads the touchpad's multitouch stream under an exclusive grab and replays
//! it as a plain virtual mouse: one-finger motion, two-finger scrolling,
//! three-finger window-management chords, pressure clicks and tap-to-click.

pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod grab;
pub mod palm;
pub mod shutdown;
pub mod sink;
pub mod touch;

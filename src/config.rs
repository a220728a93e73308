//! Fixed driver constants. Chip geometry lives in [`crate::device`].

use std::time::Duration;

// Pointer motion
pub const MOVE_SENSITIVITY: f64 = 0.6;
pub const ACCEL_FACTOR: f64 = 1.5;
/// Manhattan distance per frame above which [`ACCEL_FACTOR`] applies.
pub const ACCEL_MIN_DIST: f64 = 15.0;
pub const MIN_MOVE_PRESSURE: i32 = 2;
pub const LOW_PRESSURE_THRESHOLD: i32 = 15;
pub const SMALL_MOVE_CUTOFF: f64 = 2.0;
/// Per-axis delta at or above which a frame is treated as a sensor glitch.
pub const GLITCH_LIMIT: f64 = 400.0;

// Scrolling
pub const SCROLL_DIVIDER: f64 = 40.0;
pub const NATURAL_SCROLLING: bool = true;

// Clicking
pub const PRESS_THRESHOLD: i32 = 140;
pub const RELEASE_THRESHOLD: i32 = 80;
pub const TAP_TIMEOUT: Duration = Duration::from_millis(200);
pub const TAP_MOVEMENT_LIMIT: f64 = 40.0;
pub const COOLDOWN_AFTER_SCROLL: Duration = Duration::from_millis(250);
pub const TAP_HOLD: Duration = Duration::from_millis(15);

// Three-finger gestures
pub const GESTURE_DIST_THRESHOLD: f64 = 100.0;
pub const CHORD_HOLD: Duration = Duration::from_millis(50);

// Virtual device
pub const UINPUT_PATH: &str = "/dev/uinput";
pub const VIRTUAL_DEVICE_NAME: &str = "Goodix-Driver";
pub const VIRTUAL_VENDOR: u16 = 0x1234;
pub const VIRTUAL_PRODUCT: u16 = 0x5678;
pub const VIRTUAL_VERSION: u16 = 1;
/// Time given to udev/compositors to pick up the new device before input flows.
pub const UINPUT_SETTLE: Duration = Duration::from_millis(200);

const _: () = assert!(RELEASE_THRESHOLD < PRESS_THRESHOLD);

use std::io;

/// Failures that stop the driver.
///
/// Partial frames and a missing primary contact are handled inside the engine
/// and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no input device matching '{keyword}' found")]
    DeviceNotFound { keyword: &'static str },
    #[error("{path} not found, load the uinput module (modprobe uinput)")]
    UinputUnavailable { path: &'static str },
    #[error("touchpad read failed: {0}")]
    Transport(#[source] io::Error),
    #[error("virtual device write failed: {0}")]
    Sink(#[source] io::Error),
}

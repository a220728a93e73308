//! Turn the grabbed touchpad's multitouch reports into relative pointer
//! motion, wheel ticks, button clicks and gesture key chords.

pub mod classify;
pub mod click;
pub mod engine;
pub mod episode;
pub mod tracker;

use std::io;
use std::os::fd::AsRawFd;
use std::time::Instant;

use evdevil::event::InputEvent;

use crate::device::DeviceProfile;
use crate::error::DriverError;
use crate::event::{decode, TouchEvent};
use crate::grab::{self, GrabbedTouchpad};
use crate::shutdown;
use crate::sink::{EventSink, UinputSink};

pub use engine::Engine;

pub fn run(profile: &'static DeviceProfile) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (path, evdev) = grab::find_touchpad(profile)?;
    let mut touchpad = GrabbedTouchpad::grab(path, evdev)?;

    log::info!("[touch] creating uinput device…");
    let mut sink = UinputSink::create()?;
    shutdown::install(touchpad.raw_fd(), sink.device().as_raw_fd())?;

    let mut engine = Engine::new(profile);
    log::info!("[touch] driver started on {} ({})", touchpad.path().display(), profile.name);

    let res = drive(touchpad.events(), &mut engine, &mut sink);
    shutdown::disarm();
    log::info!("[touch] driver stopped after {} frames", engine.frames());
    res?;
    Ok(())
}

/// Feed raw events into the engine until the source fails or runs dry.
pub fn drive<I, S>(events: I, engine: &mut Engine, sink: &mut S) -> Result<(), DriverError>
where
    I: IntoIterator<Item = io::Result<InputEvent>>,
    S: EventSink,
{
    for ev in events {
        let ev = match ev {
            Ok(ev) => ev,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                log::info!("[touch] read interrupted, stopping");
                return Ok(());
            }
            Err(e) => return Err(DriverError::Transport(e)),
        };
        let Some(touch) = decode(&ev) else {
            continue;
        };
        if engine.frames() == 0 && touch == TouchEvent::Report {
            log::info!("[touch] first frame received (events are flowing)");
        }
        engine
            .handle(touch, Instant::now(), sink)
            .map_err(DriverError::Sink)?;
    }
    Ok(())
}

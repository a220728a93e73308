//! Output side: synthetic pointer/keyboard events.

use std::io;
use std::thread;
use std::time::Duration;

use evdevil::event::{InputEvent, Key, Rel};
use evdevil::uinput::UinputDevice;
use evdevil::{Bus, InputId, InputProp};

use crate::config::{
    UINPUT_SETTLE, VIRTUAL_DEVICE_NAME, VIRTUAL_PRODUCT, VIRTUAL_VENDOR, VIRTUAL_VERSION,
};
use crate::event::{key_event, rel_event, syn_report};

/// Every key the engine can press: mouse buttons plus the gesture chord keys.
pub const KEYS: [Key; 8] = [
    Key::BTN_LEFT,
    Key::BTN_RIGHT,
    Key::BTN_MIDDLE,
    Key::KEY_LEFTMETA,
    Key::KEY_TAB,
    Key::KEY_LEFTALT,
    Key::KEY_LEFTSHIFT,
    Key::KEY_D,
];

pub const REL_AXES: [Rel; 4] = [Rel::X, Rel::Y, Rel::WHEEL, Rel::HWHEEL];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Rel { axis: Rel, value: i32 },
    Key { key: Key, pressed: bool },
}

impl OutputEvent {
    pub fn press(key: Key) -> Self {
        OutputEvent::Key { key, pressed: true }
    }

    pub fn release(key: Key) -> Self {
        OutputEvent::Key { key, pressed: false }
    }

    fn to_input_event(self) -> InputEvent {
        match self {
            OutputEvent::Rel { axis, value } => rel_event(axis.raw(), value),
            OutputEvent::Key { key, pressed } => key_event(key.raw(), pressed as i32),
        }
    }
}

/// Destination of synthesized events.
///
/// Events are buffered until [`flush`](EventSink::flush), which terminates the
/// batch with `SYN_REPORT`. A flush with nothing buffered is a no-op.
pub trait EventSink {
    fn emit(&mut self, event: OutputEvent) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Block for `duration` while a synthetic button or chord is held down.
    fn hold(&mut self, duration: Duration) -> io::Result<()> {
        thread::sleep(duration);
        Ok(())
    }
}

/// The virtual mouse/keyboard exposed through `/dev/uinput`.
pub struct UinputSink {
    device: UinputDevice,
    pending: Vec<InputEvent>,
    batches: u64,
}

impl UinputSink {
    pub fn create() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let device = UinputDevice::builder()?
            .with_input_id(InputId::new(
                Bus::USB,
                VIRTUAL_VENDOR,
                VIRTUAL_PRODUCT,
                VIRTUAL_VERSION,
            ))?
            .with_props([InputProp::POINTER])?
            .with_rel_axes(REL_AXES)?
            .with_keys(KEYS)?
            .build(VIRTUAL_DEVICE_NAME)?;

        if let Ok(name) = device.sysname() {
            log::info!(
                "[uinput] device created: /sys/devices/virtual/input/{}",
                name.to_string_lossy()
            );
        }
        thread::sleep(UINPUT_SETTLE);

        Ok(Self {
            device,
            pending: Vec::with_capacity(16),
            batches: 0,
        })
    }

    pub fn device(&self) -> &UinputDevice {
        &self.device
    }
}

impl EventSink for UinputSink {
    fn emit(&mut self, event: OutputEvent) -> io::Result<()> {
        self.pending.push(event.to_input_event());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.pending.push(syn_report());
        let res = self.device.write(&self.pending);
        self.pending.clear();
        res?;

        self.batches += 1;
        if self.batches == 1 {
            log::info!("[uinput] first output batch written (events are flowing)");
        } else if self.batches % 500 == 0 {
            log::debug!("[uinput] output batches: {}", self.batches);
        }
        Ok(())
    }
}

/// What a [`RecordingSink`] saw, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Event(OutputEvent),
    Flush,
    Hold(Duration),
}

/// Sink that records instead of writing, and never sleeps.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub log: Vec<Recorded>,
    pending: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the emitted events, without flush or hold markers.
    pub fn events(&self) -> Vec<OutputEvent> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Recorded::Event(ev) => Some(*ev),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.pending = 0;
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: OutputEvent) -> io::Result<()> {
        self.log.push(Recorded::Event(event));
        self.pending += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending > 0 {
            self.log.push(Recorded::Flush);
            self.pending = 0;
        }
        Ok(())
    }

    fn hold(&mut self, duration: Duration) -> io::Result<()> {
        self.log.push(Recorded::Hold(duration));
        Ok(())
    }
}

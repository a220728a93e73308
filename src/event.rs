//! Decode the touchpad's raw evdev stream into [`TouchEvent`]s, and build raw
//! events for the virtual device.

use evdevil::event::{EventType, InputEvent};

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;

pub const SYN_REPORT: u16 = 0;
pub const SYN_DROPPED: u16 = 3;

pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
pub const ABS_MT_PRESSURE: u16 = 0x3a;

pub const BTN_TOOL_FINGER: u16 = 0x145;
pub const BTN_TOUCH: u16 = 0x14a;
pub const BTN_TOOL_DOUBLETAP: u16 = 0x14d;
pub const BTN_TOOL_TRIPLETAP: u16 = 0x14e;

/// Per-contact field carried by an `ABS_MT_*` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Pressure,
}

/// The kernel's finger-count tool keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Finger,
    DoubleTap,
    TripleTap,
}

impl Tool {
    pub fn finger_count(self) -> u8 {
        match self {
            Tool::Finger => 1,
            Tool::DoubleTap => 2,
            Tool::TripleTap => 3,
        }
    }
}

/// One decoded event from the touchpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// `ABS_MT_SLOT`: following axis updates address this slot.
    Slot(usize),
    /// Position or pressure of the currently addressed slot.
    Axis { axis: Axis, value: i32 },
    /// `ABS_MT_TRACKING_ID`; `-1` ends the contact in the addressed slot.
    TrackingId(i32),
    Tool { tool: Tool, down: bool },
    /// `BTN_TOUCH`: any finger on the surface.
    Touch(bool),
    /// `SYN_REPORT`: end of one coherent frame.
    Report,
    /// `SYN_DROPPED`: the kernel overflowed its buffer and events were lost.
    Dropped,
}

/// Decode a raw event. Events the engine has no use for yield `None`.
pub fn decode(ev: &InputEvent) -> Option<TouchEvent> {
    decode_raw(ev.event_type().raw(), ev.raw_code(), ev.raw_value())
}

pub fn decode_raw(ty: u16, code: u16, value: i32) -> Option<TouchEvent> {
    match (ty, code) {
        (EV_ABS, ABS_MT_SLOT) => Some(TouchEvent::Slot(value.max(0) as usize)),
        (EV_ABS, ABS_MT_POSITION_X) => Some(TouchEvent::Axis { axis: Axis::X, value }),
        (EV_ABS, ABS_MT_POSITION_Y) => Some(TouchEvent::Axis { axis: Axis::Y, value }),
        (EV_ABS, ABS_MT_PRESSURE) => Some(TouchEvent::Axis { axis: Axis::Pressure, value }),
        (EV_ABS, ABS_MT_TRACKING_ID) => Some(TouchEvent::TrackingId(value)),
        (EV_KEY, BTN_TOUCH) => Some(TouchEvent::Touch(value != 0)),
        (EV_KEY, BTN_TOOL_FINGER) => tool(Tool::Finger, value),
        (EV_KEY, BTN_TOOL_DOUBLETAP) => tool(Tool::DoubleTap, value),
        (EV_KEY, BTN_TOOL_TRIPLETAP) => tool(Tool::TripleTap, value),
        (EV_SYN, SYN_REPORT) => Some(TouchEvent::Report),
        (EV_SYN, SYN_DROPPED) => Some(TouchEvent::Dropped),
        _ => None,
    }
}

fn tool(tool: Tool, value: i32) -> Option<TouchEvent> {
    Some(TouchEvent::Tool { tool, down: value != 0 })
}

pub fn key_event(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::from_raw(EV_KEY), code, value)
}

pub fn rel_event(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::from_raw(EV_REL), code, value)
}

pub fn syn_report() -> InputEvent {
    InputEvent::new(EventType::from_raw(EV_SYN), SYN_REPORT, 0)
}

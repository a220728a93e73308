//! Button presses: pressure clicks while the finger is down, and tap-to-click
//! when it lifts.

use std::io;
use std::time::Instant;

use evdevil::event::Key;

use crate::config::{
    COOLDOWN_AFTER_SCROLL, PRESS_THRESHOLD, RELEASE_THRESHOLD, TAP_HOLD, TAP_MOVEMENT_LIMIT,
    TAP_TIMEOUT,
};
use crate::device::DeviceProfile;
use crate::sink::{EventSink, OutputEvent};

use super::episode::Episode;
use super::tracker::Contact;

/// Physical click emulated from pad pressure, with hysteresis.
///
/// Lives across episodes. The button is chosen when the press is asserted and
/// stays the same until release, wherever the finger moves meanwhile.
#[derive(Debug, Default)]
pub struct PressureClick {
    held: Option<Key>,
}

impl PressureClick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<Key> {
        self.held
    }

    pub fn update(
        &mut self,
        primary: Option<&Contact>,
        profile: &DeviceProfile,
        sink: &mut impl EventSink,
    ) -> io::Result<()> {
        let pressure = primary.map_or(0, |c| c.pressure);

        match self.held {
            None if pressure > PRESS_THRESHOLD => {
                let key = match primary {
                    Some(c) if profile.in_right_click_zone(c.x, c.y) => Key::BTN_RIGHT,
                    _ => Key::BTN_LEFT,
                };
                log::debug!("[touch] pressure click {:?} (pressure {})", key, pressure);
                sink.emit(OutputEvent::press(key))?;
                sink.flush()?;
                self.held = Some(key);
            }
            Some(key) if pressure < RELEASE_THRESHOLD => {
                log::debug!("[touch] pressure release {:?} (pressure {})", key, pressure);
                sink.emit(OutputEvent::release(key))?;
                sink.flush()?;
                self.held = None;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Why a lift did not count as a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapReject {
    PalmRejected,
    TooLong,
    /// Pressure went past the click threshold: it was a press, not a tap.
    Pressed,
    /// Scroll ticks went out too recently.
    ScrollCooldown,
    GestureFired,
    Moved,
}

/// Decide whether the finished episode was a tap and which button it means.
///
/// `last_position` is the primary contact from the last committed frame; when
/// it is gone the touch-down position stands in.
pub fn resolve_tap(
    ep: &Episode,
    now: Instant,
    last_scroll: Option<Instant>,
    last_position: Option<(i32, i32)>,
    profile: &DeviceProfile,
) -> Result<Key, TapReject> {
    if ep.palm_rejected {
        return Err(TapReject::PalmRejected);
    }
    if now.saturating_duration_since(ep.started) >= TAP_TIMEOUT {
        return Err(TapReject::TooLong);
    }
    if ep.max_pressure > PRESS_THRESHOLD {
        return Err(TapReject::Pressed);
    }
    if last_scroll.is_some_and(|t| now.saturating_duration_since(t) <= COOLDOWN_AFTER_SCROLL) {
        return Err(TapReject::ScrollCooldown);
    }
    if ep.gesture_fired() {
        return Err(TapReject::GestureFired);
    }

    let (sx, sy) = match (ep.start, last_position) {
        (Some(start), _) => start,
        (None, Some(last)) => last,
        (None, None) => (0, 0),
    };
    let (lx, ly) = last_position.unwrap_or((sx, sy));
    let dist = (((lx - sx) as f64).powi(2) + ((ly - sy) as f64).powi(2)).sqrt();
    if dist >= TAP_MOVEMENT_LIMIT {
        return Err(TapReject::Moved);
    }

    Ok(match ep.max_fingers {
        2 => Key::BTN_RIGHT,
        3 => Key::BTN_MIDDLE,
        _ if profile.in_right_click_zone(lx, ly) => Key::BTN_RIGHT,
        _ => Key::BTN_LEFT,
    })
}

/// A short synthetic click: press, hold briefly, release.
pub fn send_tap(key: Key, sink: &mut impl EventSink) -> io::Result<()> {
    sink.emit(OutputEvent::press(key))?;
    sink.flush()?;
    sink.hold(TAP_HOLD)?;
    sink.emit(OutputEvent::release(key))?;
    sink.flush()
}

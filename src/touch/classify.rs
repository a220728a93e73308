//! Per-frame motion: pointer movement, two-finger scrolling and three-finger
//! chords. Exactly one of them runs per frame.

use std::io;

use evdevil::event::{Key, Rel};

use crate::config::{
    ACCEL_FACTOR, ACCEL_MIN_DIST, CHORD_HOLD, GESTURE_DIST_THRESHOLD, GLITCH_LIMIT,
    LOW_PRESSURE_THRESHOLD, MIN_MOVE_PRESSURE, MOVE_SENSITIVITY, NATURAL_SCROLLING,
    SCROLL_DIVIDER, SMALL_MOVE_CUTOFF,
};
use crate::sink::{EventSink, OutputEvent};

use super::episode::{Episode, Latch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Move,
    Scroll,
    Gesture,
}

/// Pick the frame's mode from the live finger count and the episode latch.
pub fn select_mode(fingers: u8, latch: Latch) -> Mode {
    match (fingers, latch) {
        (_, Latch::GestureFired) => Mode::Idle,
        (2, _) => Mode::Scroll,
        (3, Latch::Free) => Mode::Gesture,
        (1, Latch::Free) => Mode::Move,
        _ => Mode::Idle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    PreviousApp,
    NextApp,
    Overview,
    ShowDesktop,
}

impl Chord {
    /// Match the accumulated three-finger travel against the chords in fixed
    /// order. The first one past the threshold wins, whatever the other axis says.
    pub fn detect((ax, ay): (f64, f64)) -> Option<Self> {
        let t = GESTURE_DIST_THRESHOLD;
        if ax > t {
            Some(Chord::PreviousApp)
        } else if ax < -t {
            Some(Chord::NextApp)
        } else if ay < -t {
            Some(Chord::Overview)
        } else if ay > t {
            Some(Chord::ShowDesktop)
        } else {
            None
        }
    }

    /// Keys in press order.
    pub fn keys(self) -> &'static [Key] {
        match self {
            Chord::PreviousApp => &[Key::KEY_LEFTALT, Key::KEY_LEFTSHIFT, Key::KEY_TAB],
            Chord::NextApp => &[Key::KEY_LEFTALT, Key::KEY_TAB],
            Chord::Overview => &[Key::KEY_LEFTMETA],
            Chord::ShowDesktop => &[Key::KEY_LEFTMETA, Key::KEY_D],
        }
    }
}

/// Press every key of the chord at once, hold, release in reverse order.
pub fn send_chord(chord: Chord, sink: &mut impl EventSink) -> io::Result<()> {
    for &key in chord.keys() {
        sink.emit(OutputEvent::press(key))?;
    }
    sink.flush()?;
    sink.hold(CHORD_HOLD)?;
    for &key in chord.keys().iter().rev() {
        sink.emit(OutputEvent::release(key))?;
    }
    sink.flush()
}

/// Take the whole wheel ticks out of `acc`, rounding toward zero and leaving
/// the fraction behind.
pub fn take_ticks(acc: &mut f64) -> Option<i32> {
    if acc.abs() <= SCROLL_DIVIDER {
        return None;
    }
    let ticks = (*acc / SCROLL_DIVIDER).trunc();
    *acc -= ticks * SCROLL_DIVIDER;
    Some(ticks as i32)
}

/// Pointer motion for one frame's primary delta, or `None` when the frame is
/// filtered out.
pub fn pointer_motion(dx: f64, dy: f64, pressure: i32) -> Option<(i32, i32)> {
    // not settled yet
    if pressure < MIN_MOVE_PRESSURE {
        return None;
    }
    let dist = dx.abs() + dy.abs();
    // jitter of a light touch
    if pressure < LOW_PRESSURE_THRESHOLD && dist < SMALL_MOVE_CUTOFF {
        return None;
    }
    // slot reassignment spikes
    if dx.abs() >= GLITCH_LIMIT || dy.abs() >= GLITCH_LIMIT {
        return None;
    }

    let accel = if dist > ACCEL_MIN_DIST { ACCEL_FACTOR } else { 1.0 };
    let mx = (dx * MOVE_SENSITIVITY * accel) as i32;
    let my = (dy * MOVE_SENSITIVITY * accel) as i32;
    if mx == 0 && my == 0 {
        None
    } else {
        Some((mx, my))
    }
}

/// Inputs of one classified frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub fingers: u8,
    pub delta: (f64, f64),
    /// Current pressure of the primary contact.
    pub pressure: i32,
}

/// What a frame produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Nothing,
    Moved,
    Scrolled,
    Chord(Chord),
}

pub fn classify(ep: &mut Episode, frame: Frame, sink: &mut impl EventSink) -> io::Result<Outcome> {
    let (dx, dy) = frame.delta;

    match select_mode(frame.fingers, ep.latch) {
        Mode::Idle => Ok(Outcome::Nothing),
        Mode::Gesture => {
            ep.gesture_acc.0 += dx;
            ep.gesture_acc.1 += dy;
            let Some(chord) = Chord::detect(ep.gesture_acc) else {
                return Ok(Outcome::Nothing);
            };
            log::debug!("[touch] three-finger {:?} (travel {:?})", chord, ep.gesture_acc);
            send_chord(chord, sink)?;
            ep.latch = Latch::GestureFired;
            Ok(Outcome::Chord(chord))
        }
        Mode::Scroll => {
            ep.latch = Latch::Scrolling;
            ep.scroll_acc.0 += dx;
            ep.scroll_acc.1 += dy;

            let direction = if NATURAL_SCROLLING { 1 } else { -1 };
            let mut scrolled = false;
            if let Some(ticks) = take_ticks(&mut ep.scroll_acc.1) {
                sink.emit(OutputEvent::Rel { axis: Rel::WHEEL, value: ticks * direction })?;
                scrolled = true;
            }
            // horizontal runs opposite to vertical
            if let Some(ticks) = take_ticks(&mut ep.scroll_acc.0) {
                sink.emit(OutputEvent::Rel { axis: Rel::HWHEEL, value: -ticks * direction })?;
                scrolled = true;
            }
            Ok(if scrolled { Outcome::Scrolled } else { Outcome::Nothing })
        }
        Mode::Move => {
            let Some((mx, my)) = pointer_motion(dx, dy, frame.pressure) else {
                return Ok(Outcome::Nothing);
            };
            log::trace!("[touch] move ({}, {}) -> ({}, {})", dx, dy, mx, my);
            if mx != 0 {
                sink.emit(OutputEvent::Rel { axis: Rel::X, value: mx })?;
            }
            if my != 0 {
                sink.emit(OutputEvent::Rel { axis: Rel::Y, value: my })?;
            }
            Ok(Outcome::Moved)
        }
    }
}

//! One touch-down to touch-up span, and the finger count that drives it.

use std::time::Instant;

use crate::device::DeviceProfile;
use crate::event::Tool;
use crate::palm;

use super::tracker::Contact;

/// One-shot mode an episode can lock into. Once set it holds until touch-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Latch {
    #[default]
    Free,
    /// Two-finger scrolling started; motion and gestures are off.
    Scrolling,
    /// A three-finger chord fired; everything is off.
    GestureFired,
}

#[derive(Debug, Clone)]
pub struct Episode {
    pub started: Instant,
    /// Primary contact position at touch-down.
    pub start: Option<(i32, i32)>,
    pub max_fingers: u8,
    pub max_pressure: i32,
    pub palm_rejected: bool,
    pub latch: Latch,
    pub scroll_acc: (f64, f64),
    pub gesture_acc: (f64, f64),
}

impl Episode {
    fn begin(now: Instant, fingers: u8, primary: Option<&Contact>, profile: &DeviceProfile) -> Self {
        Self {
            started: now,
            start: primary.map(|c| (c.x, c.y)),
            max_fingers: fingers,
            max_pressure: 0,
            palm_rejected: palm::is_palm(profile, primary),
            latch: Latch::Free,
            scroll_acc: (0.0, 0.0),
            gesture_acc: (0.0, 0.0),
        }
    }

    pub fn scrolling(&self) -> bool {
        self.latch == Latch::Scrolling
    }

    pub fn gesture_fired(&self) -> bool {
        self.latch == Latch::GestureFired
    }

    pub fn note_pressure(&mut self, pressure: i32) {
        self.max_pressure = self.max_pressure.max(pressure);
    }
}

/// `IDLE` (no episode) / `ACTIVE` (an episode) plus the instantaneous finger count.
#[derive(Debug, Default)]
pub struct TouchState {
    fingers: u8,
    episode: Option<Episode>,
}

impl TouchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingers(&self) -> u8 {
        self.fingers
    }

    pub fn active(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Episode> {
        self.episode.as_mut()
    }

    /// Tool keys are mutually exclusive: the last one pressed is the count. A
    /// release only clears the count if it belongs to the tool being counted,
    /// since the kernel may press the new tool before releasing the old one.
    pub fn apply_tool(&mut self, tool: Tool, down: bool) {
        let count = tool.finger_count();
        if down {
            self.fingers = count;
        } else if self.fingers == count {
            self.fingers = 0;
        }

        if let Some(ep) = self.episode.as_mut() {
            ep.max_fingers = ep.max_fingers.max(self.fingers);
        }
    }

    /// `IDLE -> ACTIVE`. A repeated touch-down keeps the running episode.
    pub fn touch_down(
        &mut self,
        now: Instant,
        primary: Option<&Contact>,
        profile: &DeviceProfile,
    ) -> &Episode {
        let fingers = self.fingers;
        self.episode
            .get_or_insert_with(|| Episode::begin(now, fingers, primary, profile))
    }

    /// `ACTIVE -> IDLE`, handing the finished episode to the caller.
    pub fn touch_up(&mut self) -> Option<Episode> {
        self.episode.take()
    }
}

//! All touch interpretation state for one device, advanced one decoded event
//! at a time.

use std::io;
use std::time::Instant;

use evdevil::event::Key;

use crate::device::DeviceProfile;
use crate::event::{Axis, TouchEvent};
use crate::sink::EventSink;

use super::classify::{self, Frame, Outcome};
use super::click::{self, PressureClick};
use super::episode::{Episode, TouchState};
use super::tracker::Tracker;

pub struct Engine {
    profile: &'static DeviceProfile,
    tracker: Tracker,
    touch: TouchState,
    click: PressureClick,
    last_scroll: Option<Instant>,
    frames: u64,
}

impl Engine {
    pub fn new(profile: &'static DeviceProfile) -> Self {
        Self {
            profile,
            tracker: Tracker::new(),
            touch: TouchState::new(),
            click: PressureClick::new(),
            last_scroll: None,
            frames: 0,
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.touch.active()
    }

    /// Button currently held by a pressure click.
    pub fn pressure_click(&self) -> Option<Key> {
        self.click.held()
    }

    pub fn last_scroll(&self) -> Option<Instant> {
        self.last_scroll
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn handle(
        &mut self,
        event: TouchEvent,
        now: Instant,
        sink: &mut impl EventSink,
    ) -> io::Result<()> {
        match event {
            TouchEvent::Slot(slot) => self.tracker.select_slot(slot),
            TouchEvent::Axis { axis, value } => {
                self.tracker.apply_axis(axis, value);
                if axis == Axis::Pressure {
                    if let Some(ep) = self.touch.active_mut() {
                        ep.note_pressure(value);
                    }
                }
            }
            TouchEvent::TrackingId(id) => self.tracker.apply_tracking_id(id),
            TouchEvent::Tool { tool, down } => self.touch.apply_tool(tool, down),
            TouchEvent::Touch(true) => self.touch_down(now),
            TouchEvent::Touch(false) => self.touch_up(now, sink)?,
            TouchEvent::Report => self.end_frame(now, sink)?,
            // the reader replays the lost state; only the motion base is stale
            TouchEvent::Dropped => {
                log::warn!("[touch] kernel dropped events, motion restarts next frame");
                self.tracker.forget_previous();
            }
        }
        Ok(())
    }

    fn touch_down(&mut self, now: Instant) {
        if self.touch.active().is_some() {
            return;
        }
        let ep = self.touch.touch_down(now, self.tracker.primary(), self.profile);
        if ep.palm_rejected {
            log::debug!("[touch] palm rejected at {:?}", ep.start);
        } else {
            log::trace!("[touch] down at {:?}", ep.start);
        }
        self.tracker.forget_previous();
    }

    fn touch_up(&mut self, now: Instant, sink: &mut impl EventSink) -> io::Result<()> {
        let Some(ep) = self.touch.touch_up() else {
            return Ok(());
        };
        let last = self.tracker.previous_primary().map(|c| (c.x, c.y));

        match click::resolve_tap(&ep, now, self.last_scroll, last, self.profile) {
            Ok(key) => {
                log::debug!("[touch] tap {:?} ({} fingers)", key, ep.max_fingers);
                click::send_tap(key, sink)?;
            }
            Err(reason) => log::trace!("[touch] up, no tap: {:?}", reason),
        }
        Ok(())
    }

    fn end_frame(&mut self, now: Instant, sink: &mut impl EventSink) -> io::Result<()> {
        self.frames += 1;

        let palm = self.touch.active().is_some_and(|ep| ep.palm_rejected);
        if !palm {
            let primary = self.tracker.primary().copied();
            let fingers = self.touch.fingers();

            if let (Some(ep), Some(c)) = (self.touch.active_mut(), primary) {
                ep.start.get_or_insert((c.x, c.y));
            }

            self.click.update(primary.as_ref(), self.profile, sink)?;

            if let (Some(delta), Some(ep), Some(c)) =
                (self.tracker.primary_delta(), self.touch.active_mut(), primary)
            {
                let frame = Frame { fingers, delta, pressure: c.pressure };
                if classify::classify(ep, frame, sink)? == Outcome::Scrolled {
                    self.last_scroll = Some(now);
                }
            }
        }

        sink.flush()?;
        // even for a palm frame, so the next delta starts from what was seen
        self.tracker.commit_frame();

        if self.frames % 500 == 0 {
            log::debug!("[touch] frames: {}", self.frames);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::event::Tool;
    use crate::sink::{OutputEvent, RecordingSink};

    struct Script {
        engine: Engine,
        sink: RecordingSink,
        now: Instant,
    }

    impl Script {
        fn new() -> Self {
            Self {
                engine: Engine::new(DeviceProfile::current()),
                sink: RecordingSink::new(),
                now: Instant::now(),
            }
        }

        fn send(&mut self, ev: TouchEvent) {
            self.engine.handle(ev, self.now, &mut self.sink).unwrap();
        }

        fn advance(&mut self, ms: u64) {
            self.now += Duration::from_millis(ms);
        }

        fn contact(&mut self, slot: usize, x: i32, y: i32, pressure: i32) {
            self.send(TouchEvent::Slot(slot));
            self.send(TouchEvent::Axis { axis: Axis::X, value: x });
            self.send(TouchEvent::Axis { axis: Axis::Y, value: y });
            self.send(TouchEvent::Axis { axis: Axis::Pressure, value: pressure });
        }

        fn down(&mut self, x: i32, y: i32, pressure: i32) {
            self.send(TouchEvent::Slot(0));
            self.send(TouchEvent::TrackingId(1));
            self.contact(0, x, y, pressure);
            self.send(TouchEvent::Touch(true));
            self.send(TouchEvent::Tool { tool: Tool::Finger, down: true });
            self.send(TouchEvent::Report);
        }

        fn frame(&mut self, x: i32, y: i32, pressure: i32) {
            self.advance(10);
            self.contact(0, x, y, pressure);
            self.send(TouchEvent::Report);
        }

        fn up(&mut self) {
            self.advance(10);
            self.send(TouchEvent::Slot(0));
            self.send(TouchEvent::TrackingId(-1));
            self.send(TouchEvent::Touch(false));
            self.send(TouchEvent::Tool { tool: Tool::Finger, down: false });
            self.send(TouchEvent::Report);
        }
    }

    #[test]
    fn palm_verdict_is_taken_once_at_touch_down() {
        let mut s = Script::new();
        s.down(1500, 200, 90);
        assert!(s.engine.episode().unwrap().palm_rejected);

        // moving out of the band and lightening up changes nothing
        s.frame(1500, 1200, 20);
        s.frame(1540, 1250, 20);
        assert!(s.engine.episode().unwrap().palm_rejected);
        assert!(s.sink.log.is_empty());
    }

    #[test]
    fn palm_frames_still_refresh_the_delta_base() {
        let mut s = Script::new();
        s.down(1500, 200, 90);
        s.frame(1600, 300, 90);
        assert_eq!(s.engine.tracker().previous_primary().map(|c| c.x), Some(1600));
    }

    #[test]
    fn first_frame_after_touch_down_has_no_delta() {
        let mut s = Script::new();
        s.frame(100, 100, 40);
        s.up();
        s.sink.clear();

        s.down(1000, 1000, 40);
        assert!(s.sink.log.is_empty());
        s.frame(1010, 1000, 40);
        assert_eq!(
            s.sink.events(),
            vec![OutputEvent::Rel { axis: evdevil::event::Rel::X, value: 6 }]
        );
    }

    #[test]
    fn max_pressure_tracks_every_update_in_the_episode() {
        let mut s = Script::new();
        s.down(1000, 1000, 30);
        s.frame(1000, 1000, 90);
        s.contact(1, 2000, 1000, 120);
        s.send(TouchEvent::Report);
        s.frame(1000, 1000, 40);
        assert_eq!(s.engine.episode().unwrap().max_pressure, 120);
    }

    #[test]
    fn drop_keeps_replayed_state_but_restarts_motion() {
        let mut s = Script::new();
        s.down(1000, 1000, 40);
        s.frame(1000, 1000, 40);
        s.send(TouchEvent::Dropped);
        s.contact(0, 1300, 1000, 40);
        s.send(TouchEvent::Report);
        assert_eq!(s.engine.tracker().primary().map(|c| c.x), Some(1300));
        assert!(s.engine.episode().is_some());
        assert!(s.sink.log.is_empty());

        s.frame(1310, 1000, 40);
        assert_eq!(s.sink.events().len(), 1);
    }

    #[test]
    fn scroll_stamps_cooldown_and_blocks_the_next_tap() {
        let mut s = Script::new();
        s.down(1000, 1000, 40);
        s.send(TouchEvent::Tool { tool: Tool::Finger, down: false });
        s.send(TouchEvent::Tool { tool: Tool::DoubleTap, down: true });
        s.frame(1000, 1100, 40);
        assert!(s.engine.last_scroll().is_some());
        s.send(TouchEvent::Tool { tool: Tool::DoubleTap, down: false });
        s.up();

        s.advance(100);
        s.down(1000, 1000, 40);
        s.up();
        assert!(!s.sink.events().contains(&OutputEvent::press(Key::BTN_LEFT)));

        s.advance(300);
        s.down(1000, 1000, 40);
        s.up();
        assert!(s.sink.events().contains(&OutputEvent::press(Key::BTN_LEFT)));
    }
}

//! Live contacts per multitouch slot, and the previous frame's copy used for
//! motion deltas.

use std::collections::BTreeMap;

use crate::event::Axis;

/// One finger, in raw device units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    pub x: i32,
    pub y: i32,
    pub pressure: i32,
}

/// All live contacts keyed by slot.
pub type Snapshot = BTreeMap<usize, Contact>;

/// Slot the primary contact is read from.
pub const PRIMARY_SLOT: usize = 0;

#[derive(Debug, Default)]
pub struct Tracker {
    slot: usize,
    current: Snapshot,
    previous: Snapshot,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_slot(&mut self, slot: usize) {
        self.slot = slot;
    }

    /// Update one field of the currently selected slot.
    pub fn apply_axis(&mut self, axis: Axis, value: i32) {
        self.apply_axis_update(self.slot, axis, value);
    }

    /// Update one field of `slot`, creating the contact if the slot is not tracked yet.
    pub fn apply_axis_update(&mut self, slot: usize, axis: Axis, value: i32) {
        let contact = self.current.entry(slot).or_default();
        match axis {
            Axis::X => contact.x = value,
            Axis::Y => contact.y = value,
            Axis::Pressure => contact.pressure = value,
        }
    }

    /// `ABS_MT_TRACKING_ID` for the selected slot: a new id starts tracking it,
    /// `-1` ends the contact.
    pub fn apply_tracking_id(&mut self, id: i32) {
        if id < 0 {
            self.apply_tracking_end(self.slot);
        } else {
            self.current.entry(self.slot).or_default();
        }
    }

    pub fn apply_tracking_end(&mut self, slot: usize) {
        self.current.remove(&slot);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    pub fn contact_count(&self) -> usize {
        self.current.len()
    }

    pub fn primary(&self) -> Option<&Contact> {
        self.current.get(&PRIMARY_SLOT)
    }

    /// Primary contact as of the last committed frame.
    pub fn previous_primary(&self) -> Option<&Contact> {
        self.previous.get(&PRIMARY_SLOT)
    }

    /// Motion of the primary contact since the last committed frame, if it was
    /// present in both.
    pub fn primary_delta(&self) -> Option<(f64, f64)> {
        let cur = self.primary()?;
        let prev = self.previous_primary()?;
        Some(((cur.x - prev.x) as f64, (cur.y - prev.y) as f64))
    }

    /// Close the frame: the current contacts become the base for the next delta.
    pub fn commit_frame(&mut self) {
        self.previous = self.snapshot();
    }

    /// Drop the delta base so the next frame produces no motion.
    pub fn forget_previous(&mut self) {
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_update_creates_slot_lazily() {
        let mut t = Tracker::new();
        t.apply_axis_update(4, Axis::Y, 900);
        t.apply_axis_update(4, Axis::Pressure, 30);
        assert_eq!(t.contact_count(), 1);
        assert_eq!(t.snapshot()[&4], Contact { x: 0, y: 900, pressure: 30 });
    }

    #[test]
    fn tracking_end_removes_only_that_slot() {
        let mut t = Tracker::new();
        t.select_slot(0);
        t.apply_tracking_id(10);
        t.apply_axis(Axis::X, 100);
        t.select_slot(1);
        t.apply_tracking_id(11);
        t.apply_axis(Axis::X, 200);
        t.apply_tracking_id(-1);

        let snap = t.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[&0].x, 100);
    }

    #[test]
    fn ending_an_untracked_slot_is_harmless() {
        let mut t = Tracker::new();
        t.apply_tracking_end(7);
        assert_eq!(t.contact_count(), 0);
    }

    #[test]
    fn delta_needs_primary_in_both_frames() {
        let mut t = Tracker::new();
        t.apply_axis_update(0, Axis::X, 100);
        t.apply_axis_update(0, Axis::Y, 100);
        assert_eq!(t.primary_delta(), None);

        t.commit_frame();
        t.apply_axis_update(0, Axis::X, 110);
        t.apply_axis_update(0, Axis::Y, 95);
        assert_eq!(t.primary_delta(), Some((10.0, -5.0)));

        t.commit_frame();
        t.apply_tracking_end(0);
        assert_eq!(t.primary_delta(), None);
    }

    #[test]
    fn commit_replaces_previous_instead_of_merging() {
        let mut t = Tracker::new();
        t.apply_axis_update(0, Axis::X, 1);
        t.apply_axis_update(1, Axis::X, 2);
        t.commit_frame();
        t.apply_tracking_end(1);
        t.commit_frame();
        assert!(t.previous.get(&1).is_none());
        assert_eq!(t.previous_primary().map(|c| c.x), Some(1));
    }

    #[test]
    fn forget_previous_suppresses_next_delta() {
        let mut t = Tracker::new();
        t.apply_axis_update(0, Axis::X, 1);
        t.commit_frame();
        t.forget_previous();
        assert_eq!(t.primary_delta(), None);
    }
}

mod gxtp;

pub use gxtp::GXTP;

/// Chip-specific parameters for touch interpretation.
#[derive(Debug, Clone, Copy)]
pub struct DeviceProfile {
    pub name: &'static str,

    // Discovery: case-insensitive substrings of the evdev device name
    pub name_keyword: &'static str,
    pub name_preferred: &'static str,

    // Bottom-right corner acting as the secondary button
    pub right_click_zone_x: i32,
    pub bottom_zone_y: i32,

    // Palm band along the top edge (next to the keyboard)
    pub palm_zone_top_y: i32,
    pub palm_pressure_threshold: i32,
}

impl DeviceProfile {
    /// Get profile for the current device (only GXTP is supported).
    pub fn current() -> &'static Self {
        &GXTP
    }

    /// Whether a position falls inside the bottom-right secondary-button zone.
    pub fn in_right_click_zone(&self, x: i32, y: i32) -> bool {
        x > self.right_click_zone_x && y > self.bottom_zone_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_click_zone_is_exclusive_of_its_edges() {
        let p = DeviceProfile::current();
        assert!(p.in_right_click_zone(3001, 1801));
        assert!(!p.in_right_click_zone(3000, 1801));
        assert!(!p.in_right_click_zone(3001, 1800));
        assert!(!p.in_right_click_zone(100, 100));
    }
}

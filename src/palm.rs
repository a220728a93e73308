use crate::device::DeviceProfile;
use crate::touch::tracker::Contact;

/// Whether a touch starting with `primary` is a palm resting on the top band.
///
/// Only a firm contact inside the band counts; a light fingertip there is
/// still a touch. No primary contact means no evidence of a palm.
pub fn is_palm(profile: &DeviceProfile, primary: Option<&Contact>) -> bool {
    primary.is_some_and(|c| {
        c.y < profile.palm_zone_top_y && c.pressure > profile.palm_pressure_threshold
    })
}

//! Locate the touchpad and hold an exclusive grab on it.
//!
//! While the device is grabbed (EVIOCGRAB) the kernel delivers its events to
//! this process only, so the desktop's own touchpad handling never sees them
//! and the virtual device is the single source of pointer input. The grab is
//! dropped together with [`GrabbedTouchpad`].
//!
//! Events are read through an [`EventReader`], which re-fetches the device
//! state after a `SYN_DROPPED` and replays it as ordinary events, so a touch
//! that began or ended inside the lost span still reaches the engine.

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

use evdevil::event::InputEvent;
use evdevil::{EventReader, Evdev};

use crate::config::UINPUT_PATH;
use crate::device::DeviceProfile;
use crate::error::DriverError;

pub fn check_uinput() -> Result<(), DriverError> {
    if Path::new(UINPUT_PATH).exists() {
        Ok(())
    } else {
        Err(DriverError::UinputUnavailable { path: UINPUT_PATH })
    }
}

/// Choose among device names: the first one containing both the keyword and
/// the preferred word, otherwise the first one containing the keyword.
/// Matching ignores case.
pub fn pick_device<S: AsRef<str>>(names: &[S], profile: &DeviceProfile) -> Option<usize> {
    let keyword = profile.name_keyword.to_lowercase();
    let preferred = profile.name_preferred.to_lowercase();

    let mut fallback = None;
    for (i, name) in names.iter().enumerate() {
        let name = name.as_ref().to_lowercase();
        if !name.contains(&keyword) {
            continue;
        }
        if name.contains(&preferred) {
            return Some(i);
        }
        fallback.get_or_insert(i);
    }
    fallback
}

/// Enumerate evdev nodes and open the one matching `profile`.
pub fn find_touchpad(
    profile: &DeviceProfile,
) -> Result<(PathBuf, Evdev), Box<dyn std::error::Error + Send + Sync>> {
    let mut candidates = Vec::new();
    for res in evdevil::enumerate()? {
        let (path, evdev) = match res {
            Ok(dev) => (dev.path().to_path_buf(), dev),
            Err(e) => {
                log::debug!("Skipping unreadable input device: {}", e);
                continue;
            }
        };
        match evdev.name() {
            Ok(name) => {
                log::debug!("{}: {}", path.display(), name);
                candidates.push((path, name, evdev));
            }
            Err(e) => log::debug!("Skipping {}: {}", path.display(), e),
        }
    }

    let names: Vec<&str> = candidates.iter().map(|(_, name, _)| name.as_str()).collect();
    let index = pick_device(&names, profile).ok_or(DriverError::DeviceNotFound {
        keyword: profile.name_keyword,
    })?;
    let (path, name, evdev) = candidates.swap_remove(index);
    log::info!("Found {} at {}", name, path.display());
    Ok((path, evdev))
}

pub struct GrabbedTouchpad {
    path: PathBuf,
    reader: EventReader,
}

impl GrabbedTouchpad {
    pub fn grab(path: PathBuf, evdev: Evdev) -> io::Result<Self> {
        evdev.grab()?;
        log::info!("Grabbed {} (exclusive)", path.display());
        // the reader replays the current state once, before any live event
        let reader = evdev.into_reader()?;
        Ok(Self { path, reader })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw_fd(&self) -> RawFd {
        self.reader.as_raw_fd()
    }

    /// Blocking stream of events, resynchronized after kernel overruns.
    /// Ends only on error.
    pub fn events(&mut self) -> impl Iterator<Item = io::Result<InputEvent>> + '_ {
        self.reader.events()
    }
}

impl Drop for GrabbedTouchpad {
    fn drop(&mut self) {
        match self.reader.evdev().ungrab() {
            Ok(()) => log::info!("Released {}", self.path.display()),
            Err(e) => log::warn!("Failed to release {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_touchpad_node() {
        let names = [
            "AT Translated Set 2 keyboard",
            "GXTP7863:00 27C6:01E0 Mouse",
            "GXTP7863:00 27C6:01E0 Touchpad",
        ];
        assert_eq!(pick_device(&names, DeviceProfile::current()), Some(2));
    }

    #[test]
    fn falls_back_to_first_keyword_match() {
        let names = ["Power Button", "gxtp7863:00 mouse", "GXTP7863:00 Stylus"];
        assert_eq!(pick_device(&names, DeviceProfile::current()), Some(1));
    }

    #[test]
    fn no_keyword_no_device() {
        let names = ["SYNA8004:00 06CB:CD8B Touchpad"];
        assert_eq!(pick_device(&names, DeviceProfile::current()), None);
        assert_eq!(pick_device::<&str>(&[], DeviceProfile::current()), None);
    }
}

use gxtp_touchpad::device::DeviceProfile;
use gxtp_touchpad::{grab, touch};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    grab::check_uinput()?;
    touch::run(DeviceProfile::current())
}

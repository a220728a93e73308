use super::DeviceProfile;

pub const GXTP: DeviceProfile = DeviceProfile {
    name: "Goodix GXTP touchpad",

    // e.g. "GXTP7863:00 27C6:01E0 Touchpad"; the same chip also exposes a "Mouse" node
    name_keyword: "GXTP",
    name_preferred: "Touchpad",

    right_click_zone_x: 3000,
    bottom_zone_y: 1800,

    palm_zone_top_y: 500,
    palm_pressure_threshold: 45,
};

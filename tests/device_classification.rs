//! End-to-end coverage for the hashed property store and the evdev
//! input-classification tree, built entirely from synthetic in-memory
//! devices (no real `/sys` dependency).

use std::sync::Arc;

use udevrs::{Udev, UdevDevice};

mod common;

fn input_device(ev: &str, abs: &str, rel: &str, key: &str, prop: &str) -> UdevDevice {
    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev).with_subsystem("input");

    let props = device.properties_list_mut();
    if !ev.is_empty() {
        props.add_entry("EV", ev);
    }
    if !abs.is_empty() {
        props.add_entry("ABS", abs);
    }
    if !rel.is_empty() {
        props.add_entry("REL", rel);
    }
    if !key.is_empty() {
        props.add_entry("KEY", key);
    }
    if !prop.is_empty() {
        props.add_entry("PROP", prop);
    }

    device
}

#[test]
fn properties_list_iteration_matches_lookup() {
    common::init();

    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev);
    device.properties_list_mut().add_entry("SYSPATH", "/sys/devices/x");
    device.properties_list_mut().add_entry("SUBSYSTEM", "input");
    device.properties_list_mut().add_entry("SYSNAME", "x");

    for entry in device.properties_list().iter() {
        assert_eq!(
            device.get_property_value(entry.name()),
            Some(entry.value())
        );
    }
}

#[test]
fn mouse_classification() {
    common::init();

    // EV=17 (EV_SYN|EV_KEY|EV_REL), REL=103 (REL_X|REL_Y|REL_WHEEL), KEY with BTN_MOUSE set.
    let mut device = input_device("17", "", "103", "70000 0 0 0 0", "");
    device.derive_evdev_properties();

    assert_eq!(device.get_property_value("ID_INPUT"), Some("1"));
    assert_eq!(device.get_property_value("ID_INPUT_MOUSE"), Some("1"));
    assert_eq!(device.get_property_value("ID_INPUT_TOUCHPAD"), None);
    assert_eq!(device.get_property_value("ID_INPUT_JOYSTICK"), None);
}

#[test]
fn touchpad_vs_touchscreen() {
    common::init();

    // EV=1b (EV_SYN|EV_KEY|EV_REL|EV_ABS), ABS X/Y, KEY BTN_TOUCH + BTN_TOOL_FINGER.
    let mut touchpad = input_device("1b", "3", "", "e420 0 0 0 0", "");
    touchpad.derive_evdev_properties();
    assert_eq!(touchpad.get_property_value("ID_INPUT_TOUCHPAD"), Some("1"));
    assert_eq!(touchpad.get_property_value("ID_INPUT_TOUCHSCREEN"), None);

    // Same ABS bits, KEY only has BTN_TOUCH (no BTN_TOOL_FINGER).
    let mut touchscreen = input_device("1b", "3", "", "400 0 0 0 0", "");
    touchscreen.derive_evdev_properties();
    assert_eq!(
        touchscreen.get_property_value("ID_INPUT_TOUCHSCREEN"),
        Some("1")
    );
    assert_eq!(touchscreen.get_property_value("ID_INPUT_TOUCHPAD"), None);
}

#[test]
fn keyboard_classification() {
    common::init();

    // EV=120013 (EV_SYN|EV_KEY|EV_MSC|EV_LED|EV_REP), KEY includes KEY_ENTER (code 28).
    let mut keyboard = input_device("120013", "", "", "10000000000 0", "");
    keyboard.derive_evdev_properties();

    assert_eq!(keyboard.get_property_value("ID_INPUT_KEY"), Some("1"));
    assert_eq!(keyboard.get_property_value("ID_INPUT_KEYBOARD"), Some("1"));
}

#[test]
fn non_input_subsystem_is_left_untouched() {
    common::init();

    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev).with_subsystem("block");
    device.derive_evdev_properties();

    assert_eq!(device.get_property_value("ID_INPUT"), None);
}

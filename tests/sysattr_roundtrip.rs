//! Exercises the sysattr read/write round-trip against a real, temporary
//! "device directory" standing in for a sysfs device node.

use std::fs;
use std::sync::Arc;

use udevrs::{Udev, UdevDevice};

mod common;

fn device_dir(name: &str) -> String {
    let dir = std::env::temp_dir().join(format!("udevrs-sysattr-test-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create fake device dir");
    dir.to_str().unwrap().to_owned()
}

#[test]
fn set_then_get_sysattr_value_round_trips() {
    common::init();

    let dir = device_dir("set-get");
    fs::write(format!("{dir}/brightness"), "0").unwrap();

    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev).with_syspath(dir.clone());

    assert!(device.set_sysattr_value("brightness", "128"));
    assert_eq!(device.get_sysattr_value("brightness"), Some("128".into()));

    // Cached value is returned without re-reading the file.
    fs::write(format!("{dir}/brightness"), "999").unwrap();
    assert_eq!(device.get_sysattr_value("brightness"), Some("128".into()));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn get_sysattr_value_strips_trailing_newline() {
    common::init();

    let dir = device_dir("newline");
    fs::write(format!("{dir}/state"), "online\n").unwrap();

    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev).with_syspath(dir.clone());

    assert_eq!(device.get_sysattr_value("state"), Some("online".into()));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn set_after_get_replaces_the_cached_value() {
    common::init();

    let dir = device_dir("get-then-set");
    fs::write(format!("{dir}/brightness"), "1").unwrap();

    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev).with_syspath(dir.clone());

    // Populate the cache via a read first.
    assert_eq!(device.get_sysattr_value("brightness"), Some("1".into()));
    // Then overwrite it; the cache must reflect the new value, not a stale
    // duplicate entry left behind by the earlier read.
    assert!(device.set_sysattr_value("brightness", "200"));
    assert_eq!(device.get_sysattr_value("brightness"), Some("200".into()));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn set_sysattr_value_rejects_symlinks_and_directories() {
    common::init();

    let dir = device_dir("reject");
    fs::create_dir_all(format!("{dir}/subdir")).unwrap();
    fs::write(format!("{dir}/real_attr"), "x").unwrap();
    std::os::unix::fs::symlink(format!("{dir}/real_attr"), format!("{dir}/link_attr")).unwrap();

    let udev = Arc::new(Udev::new());
    let mut device = UdevDevice::new(udev).with_syspath(dir.clone());

    assert!(!device.set_sysattr_value("subdir", "y"));
    assert!(!device.set_sysattr_value("link_attr", "y"));
    assert!(!device.set_sysattr_value("does_not_exist", "y"));

    let _ = fs::remove_dir_all(&dir);
}

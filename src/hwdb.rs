use std::sync::Arc;

use crate::{Result, Udev, UdevEntry, UdevList};

/// Hardware database lookups.
///
/// The upstream `libudev` couples device enumeration/monitoring to a
/// `hwdb.bin` trie database (`man 7 hwdb`) that maps modalias strings to
/// vendor/model properties. This crate observes only what the kernel's
/// device model already exposes and does not ship or parse that database:
/// every [UdevHwdb] lookup is a no-op that returns `None`, mirroring the
/// documented `ID_INPUT`-style stub contract rather than a partial or
/// incorrect trie implementation.
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct UdevHwdb {
    udev: Arc<Udev>,
    properties_list: UdevList,
}

impl UdevHwdb {
    /// Creates a new [UdevHwdb].
    ///
    /// Always succeeds: there is no on-disk database to open.
    pub fn new(udev: Arc<Udev>) -> Result<Self> {
        let properties_list = UdevList::new(Arc::clone(&udev));
        Ok(Self {
            udev,
            properties_list,
        })
    }

    /// Looks up a matching device in the hardware database.
    ///
    /// Always returns `None`: this crate does not implement hwdb lookups.
    pub fn get_properties_list_entry(&mut self, _modalias: &str, _flags: u32) -> Option<&UdevEntry> {
        None
    }

    /// Looks up a matching device modalias in the hardware database and
    /// returns the list of properties.
    ///
    /// Always returns `None`: this crate does not implement hwdb lookups.
    pub fn query(&mut self, _modalias: &str) -> Option<&UdevList> {
        None
    }

    /// Gets a reference to the (always empty) properties list [UdevList].
    pub const fn properties_list(&self) -> &UdevList {
        &self.properties_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hwdb_is_a_stub() {
        let udev = Arc::new(Udev::new());
        let mut hwdb = UdevHwdb::new(Arc::clone(&udev)).unwrap();

        assert!(hwdb.query("usb:v1D6B").is_none());
        assert!(hwdb.get_properties_list_entry("pci:v00008086", 0).is_none());
        assert!(hwdb.properties_list().is_empty());
    }
}

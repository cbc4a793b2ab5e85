use std::sync::Arc;

use crate::{murmur_hash64a, Udev, UdevEntry, UdevEntryList};

/// Initial slot-table capacity for a freshly created [UdevHashList].
const INITIAL_CAPACITY: usize = 16;

#[derive(Clone, Debug, PartialEq)]
enum Slot {
    Empty,
    Tombstone,
    Occupied(usize),
}

enum Probe {
    Found { slot: usize, entry_idx: usize },
    Insertable { slot: usize },
}

/// Hash-table backed realization of a UDEV entry list.
///
/// Unlike [UdevList](crate::UdevList), which stores entries in a plain
/// linked list, [UdevHashList] keeps entries in an append-only `entries`
/// arena (whose order *is* the insertion order) alongside an open-addressed
/// slot table used purely for O(1) lookup by name. Rehashing on growth only
/// rebuilds the slot table; the `entries` arena, and therefore the
/// insertion order, is never touched.
///
/// Used by [UdevDevice](crate::UdevDevice) for its `properties_list`, which
/// is looked up far more often than it is iterated.
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct UdevHashList {
    udev: Arc<Udev>,
    entries: Vec<Option<UdevEntry>>,
    table: Vec<Slot>,
    len: usize,
}

impl UdevHashList {
    /// Creates a new, empty [UdevHashList].
    pub fn new(udev: Arc<Udev>) -> Self {
        Self {
            udev,
            entries: Vec::new(),
            table: Vec::new(),
            len: 0,
        }
    }

    /// Creates a new [UdevHashList] populated from `list`.
    pub fn create<L: Into<UdevEntryList>>(udev: Arc<Udev>, list: L) -> Self {
        let mut new = Self::new(udev);
        new.set_list(list);
        new
    }

    fn hash(name: &str) -> u64 {
        murmur_hash64a(name.as_bytes(), 0)
    }

    fn probe(&self, name: &str) -> Probe {
        let cap = self.table.len();
        if cap == 0 {
            return Probe::Insertable { slot: 0 };
        }

        let start = (Self::hash(name) as usize) % cap;
        let mut first_free = None;

        for step in 0..cap {
            let idx = (start + step) % cap;

            match &self.table[idx] {
                Slot::Empty => {
                    return Probe::Insertable {
                        slot: first_free.unwrap_or(idx),
                    };
                }
                Slot::Tombstone => {
                    if first_free.is_none() {
                        first_free = Some(idx);
                    }
                }
                Slot::Occupied(entry_idx) => {
                    if self.entries[*entry_idx].as_ref().map(UdevEntry::name) == Some(name) {
                        return Probe::Found {
                            slot: idx,
                            entry_idx: *entry_idx,
                        };
                    }
                }
            }
        }

        Probe::Insertable {
            slot: first_free.unwrap_or(start),
        }
    }

    fn maybe_grow(&mut self) {
        if self.table.is_empty() {
            self.rehash(INITIAL_CAPACITY);
        } else if (self.len + 1) * 2 > self.table.len() {
            self.rehash(self.table.len() * 2);
        }
    }

    fn rehash(&mut self, new_cap: usize) {
        let mut table = vec![Slot::Empty; new_cap];

        for (entry_idx, entry) in self.entries.iter().enumerate() {
            let Some(entry) = entry else { continue };

            let mut idx = (Self::hash(entry.name()) as usize) % new_cap;
            while !matches!(table[idx], Slot::Empty) {
                idx = (idx + 1) % new_cap;
            }
            table[idx] = Slot::Occupied(entry_idx);
        }

        self.table = table;
    }

    /// Gets an [`Iterator`] over [UdevEntry] items, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &UdevEntry> {
        self.entries.iter().filter_map(Option::as_ref)
    }

    /// Sets the entries of this [UdevHashList] from `list`, replacing any
    /// existing entries.
    pub fn set_list<L: Into<UdevEntryList>>(&mut self, list: L) {
        self.clear();

        for entry in list.into() {
            self.add_entry(entry.name(), entry.value());

            if entry.num() != 0 {
                if let Some(e) = self.entry_by_name_mut(entry.name()) {
                    e.set_num(entry.num());
                }
            }
        }
    }

    /// Builder function that sets the entries of this [UdevHashList].
    pub fn with_list<L: Into<UdevEntryList>>(mut self, list: L) -> Self {
        self.set_list(list);
        self
    }

    /// Gets the number of live entries.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Gets whether the list is empty.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the list of all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.table.clear();
        self.len = 0;
    }

    /// Gets an optional reference to the first [UdevEntry] in insertion order.
    pub fn entry(&self) -> Option<&UdevEntry> {
        self.iter().next()
    }

    /// Gets an optional reference to an [UdevEntry] with a matching `name`.
    pub fn entry_by_name(&self, name: &str) -> Option<&UdevEntry> {
        match self.probe(name) {
            Probe::Found { entry_idx, .. } => self.entries[entry_idx].as_ref(),
            Probe::Insertable { .. } => None,
        }
    }

    /// Gets an optional mutable reference to an [UdevEntry] with a matching `name`.
    pub fn entry_by_name_mut(&mut self, name: &str) -> Option<&mut UdevEntry> {
        match self.probe(name) {
            Probe::Found { entry_idx, .. } => self.entries[entry_idx].as_mut(),
            Probe::Insertable { .. } => None,
        }
    }

    /// Adds an entry to the list.
    ///
    /// If an [UdevEntry] with the same `name` exists, its `value` is updated
    /// in place. Otherwise a new entry is appended.
    pub fn add_entry(&mut self, name: &str, value: &str) -> Option<&UdevEntry> {
        self.maybe_grow();

        match self.probe(name) {
            Probe::Found { entry_idx, .. } => {
                if let Some(entry) = self.entries[entry_idx].as_mut() {
                    entry.set_value(value);
                }
            }
            Probe::Insertable { slot } => {
                let entry_idx = self.entries.len();
                self.entries
                    .push(Some(UdevEntry::new().with_name(name).with_value(value)));
                self.table[slot] = Slot::Occupied(entry_idx);
                self.len += 1;
            }
        }

        self.entry_by_name(name)
    }

    /// Adds an entry to the list only if no entry with the same `name` exists.
    ///
    /// If an [UdevEntry] with the same `name` is already present, it is left
    /// untouched and the existing value wins. Otherwise a new entry is
    /// appended, mirroring the upsert path of [`add_entry`](Self::add_entry).
    pub fn add_entry_if_absent(&mut self, name: &str, value: &str) -> Option<&UdevEntry> {
        self.maybe_grow();

        match self.probe(name) {
            Probe::Found { .. } => {}
            Probe::Insertable { slot } => {
                let entry_idx = self.entries.len();
                self.entries
                    .push(Some(UdevEntry::new().with_name(name).with_value(value)));
                self.table[slot] = Slot::Occupied(entry_idx);
                self.len += 1;
            }
        }

        self.entry_by_name(name)
    }

    /// Removes an [UdevEntry] if an entry exists with a matching `name`.
    pub fn remove_entry(&mut self, name: &str) {
        if let Probe::Found { slot, entry_idx } = self.probe(name) {
            self.table[slot] = Slot::Tombstone;
            self.entries[entry_idx] = None;
            self.len -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_list() -> UdevHashList {
        UdevHashList::new(Arc::new(Udev::new()))
    }

    #[test]
    fn test_add_and_lookup() {
        let mut list = new_list();

        assert!(list.is_empty());
        assert!(list.add_entry("DEVPATH", "/devices/foo").is_some());
        assert!(list.add_entry("SUBSYSTEM", "input").is_some());

        assert_eq!(list.len(), 2);
        assert_eq!(list.entry_by_name("DEVPATH").map(UdevEntry::value), Some("/devices/foo"));
        assert_eq!(list.entry_by_name("SUBSYSTEM").map(UdevEntry::value), Some("input"));
        assert!(list.entry_by_name("MISSING").is_none());
    }

    #[test]
    fn test_upsert_overwrites_value() {
        let mut list = new_list();

        list.add_entry("ACTION", "add");
        list.add_entry("ACTION", "remove");

        assert_eq!(list.len(), 1);
        assert_eq!(list.entry_by_name("ACTION").map(UdevEntry::value), Some("remove"));
    }

    #[test]
    fn test_remove_entry() {
        let mut list = new_list();

        list.add_entry("A", "1");
        list.add_entry("B", "2");
        list.remove_entry("A");

        assert_eq!(list.len(), 1);
        assert!(list.entry_by_name("A").is_none());
        assert_eq!(list.entry_by_name("B").map(UdevEntry::value), Some("2"));
    }

    #[test]
    fn test_remove_then_reinsert_preserves_other_lookups() {
        let mut list = new_list();

        for i in 0..8 {
            list.add_entry(&format!("KEY{i}"), &format!("VAL{i}"));
        }

        list.remove_entry("KEY3");
        list.add_entry("KEY3", "VAL3-new");

        for i in 0..8 {
            let key = format!("KEY{i}");
            let expected = if i == 3 {
                "VAL3-new".to_string()
            } else {
                format!("VAL{i}")
            };
            assert_eq!(
                list.entry_by_name(&key).map(UdevEntry::value),
                Some(expected.as_str())
            );
        }
    }

    #[test]
    fn test_insertion_order_preserved_across_growth() {
        let mut list = new_list();
        let names: Vec<String> = (0..64).map(|i| format!("PROP{i}")).collect();

        for name in &names {
            list.add_entry(name, "v");
        }

        let iterated: Vec<&str> = list.iter().map(UdevEntry::name).collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(iterated, expected);
    }

    #[test]
    fn test_add_entry_if_absent_keeps_first_value() {
        let mut list = new_list();

        list.add_entry_if_absent("ID_INPUT_MOUSE", "1");
        list.add_entry_if_absent("ID_INPUT_MOUSE", "0");

        assert_eq!(list.len(), 1);
        assert_eq!(
            list.entry_by_name("ID_INPUT_MOUSE").map(UdevEntry::value),
            Some("1")
        );
    }

    #[test]
    fn test_set_list_replaces_entries() {
        let mut list = new_list();
        list.add_entry("OLD", "1");

        let mut replacement = UdevEntryList::new();
        replacement.push_back(UdevEntry::new().with_name("NEW").with_value("2"));

        list.set_list(replacement);

        assert_eq!(list.len(), 1);
        assert!(list.entry_by_name("OLD").is_none());
        assert_eq!(list.entry_by_name("NEW").map(UdevEntry::value), Some("2"));
    }
}

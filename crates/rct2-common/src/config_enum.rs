// config_enum.rs: symbolic names for enumerated config values

/// Maps between config file keys and in-memory values.
///
/// Implemented by [`ConfigEnum`] tables and by enumerations whose names come
/// from elsewhere (the language list, for one).
pub trait ConfigEnumLookup<T> {
    /// Symbolic key for `value`, if it has one.
    fn name_of(&self, value: T) -> Option<&str>;

    /// Value for `key`, or `default` when no entry matches.
    fn value_of(&self, key: &str, default: T) -> T;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigEnumEntry<T> {
    pub key: &'static str,
    pub value: T,
}

impl<T> ConfigEnumEntry<T> {
    pub const fn new(key: &'static str, value: T) -> Self {
        Self { key, value }
    }
}

/// Ordered key/value table. Lookups scan in order and the first match wins.
///
/// Entries must be free of destructors so tables can live in `const` items.
#[derive(Debug, Clone, Copy)]
pub struct ConfigEnum<T: 'static> {
    entries: &'static [ConfigEnumEntry<T>],
}

impl<T: 'static> ConfigEnum<T> {
    pub const fn new(entries: &'static [ConfigEnumEntry<T>]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [ConfigEnumEntry<T>] {
        self.entries
    }
}

impl<T: Copy + PartialEq + 'static> ConfigEnumLookup<T> for ConfigEnum<T> {
    fn name_of(&self, value: T) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.key)
    }

    fn value_of(&self, key: &str, default: T) -> T {
        self.entries
            .iter()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map_or(default, |e| e.value)
    }
}

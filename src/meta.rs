//! # META Chunk
//!
//! Tab/linefeed/pipe-delimited key to value(s) metadata. This is genuinely
//! new code: the wider a2kit crate's `img/meta.rs` is an unrelated
//! JSON-path macro system for its own per-format metadata editing, and
//! does not implement the WOZ META wire format at all. Grounded directly
//! in `original_source/wozardry.py`'s `_load_meta`/`_dump_meta`.

use crate::error::ContainerError;
use crate::info::MACHINE_NAMES;

pub const LANGUAGES: [&str; 31] = [
    "English", "Spanish", "French", "German", "Chinese", "Japanese", "Italian", "Dutch",
    "Portuguese", "Danish", "Finnish", "Norwegian", "Swedish", "Russian", "Polish", "Turkish",
    "Arabic", "Thai", "Czech", "Hungarian", "Catalan", "Croatian", "Greek", "Hebrew", "Romanian",
    "Slovak", "Ukrainian", "Indonesian", "Malay", "Vietnamese", "Other",
];

pub const REQUIRES_RAM: [&str; 13] = [
    "16K", "24K", "32K", "48K", "64K", "128K", "256K", "512K", "768K", "1M", "1.25M", "1.5M+",
    "Unknown",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaValue {
    Single(String),
    Multi(Vec<String>),
}

impl MetaValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            MetaValue::Single(s) => vec![s.as_str()],
            MetaValue::Multi(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// Ordered key/value(s) mapping. Order is preserved on both load and dump.
#[derive(Clone, Debug, Default)]
pub struct Meta {
    entries: Vec<(String, MetaValue)>,
}

impl Meta {
    pub fn new() -> Self {
        Meta { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Deletes `key`, if present. Harmless if `key` is absent.
    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// Sets `key` to `values`, validating forbidden characters and, for
    /// the three enumerated keys, each value against its fixed table.
    /// Replaces any existing entry for `key`.
    pub fn set(&mut self, key: &str, values: Vec<String>) -> Result<(), ContainerError> {
        for v in &values {
            if v.contains('\t') || v.contains('\n') || v.contains('|') {
                return Err(ContainerError::BadValue);
            }
        }
        validate_enumerated(key, &values)?;
        let value = if values.len() == 1 {
            MetaValue::Single(values.into_iter().next().unwrap())
        } else {
            MetaValue::Multi(values)
        };
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
        Ok(())
    }

    pub fn parse(payload: &[u8]) -> Result<Self, ContainerError> {
        let text = std::str::from_utf8(payload).map_err(|_| ContainerError::EncodingError)?;
        let mut meta = Meta::new();
        for line in text.split('\n') {
            if line.is_empty() {
                continue;
            }
            let tabs = line.matches('\t').count();
            if tabs == 0 {
                return Err(ContainerError::NotEnoughTabs);
            }
            if tabs > 1 {
                return Err(ContainerError::TooManyTabs);
            }
            let (key, rest) = line.split_once('\t').expect("exactly one tab checked above");
            if meta.entries.iter().any(|(k, _)| k == key) {
                return Err(ContainerError::DuplicateKey);
            }
            let values: Vec<String> = rest.split('|').map(|s| s.to_string()).collect();
            validate_enumerated(key, &values)?;
            let value = if values.len() == 1 {
                MetaValue::Single(values.into_iter().next().unwrap())
            } else {
                MetaValue::Multi(values)
            };
            meta.entries.push((key.to_string(), value));
        }
        Ok(meta)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let joined = value.values().join("|");
            lines.push(format!("{}\t{}", key, joined));
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out.into_bytes()
    }
}

fn validate_enumerated(key: &str, values: &[String]) -> Result<(), ContainerError> {
    match key {
        "language" => {
            for v in values {
                if !LANGUAGES.contains(&v.as_str()) {
                    return Err(ContainerError::BadLanguage);
                }
            }
        }
        "requires_ram" => {
            for v in values {
                if !REQUIRES_RAM.contains(&v.as_str()) {
                    return Err(ContainerError::BadMetaRam);
                }
            }
        }
        "requires_machine" => {
            for v in values {
                if !MACHINE_NAMES.contains(&v.as_str()) {
                    return Err(ContainerError::BadMachine);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_value_line() {
        let meta = Meta::parse(b"language\tEnglish|French\n").unwrap();
        assert_eq!(
            meta.get("language").unwrap().values(),
            vec!["English", "French"]
        );
    }

    #[test]
    fn rejects_missing_tab() {
        assert!(matches!(Meta::parse(b"no_tab_here\n"), Err(ContainerError::NotEnoughTabs)));
    }

    #[test]
    fn rejects_duplicate_key() {
        assert!(matches!(
            Meta::parse(b"side\t1\nside\t2\n"),
            Err(ContainerError::DuplicateKey)
        ));
    }

    #[test]
    fn rejects_bad_language() {
        assert!(matches!(
            Meta::parse(b"language\tKlingon\n"),
            Err(ContainerError::BadLanguage)
        ));
    }

    #[test]
    fn round_trips_through_bytes() {
        let mut meta = Meta::new();
        meta.set("language", vec!["English".to_string()]).unwrap();
        meta.set("side", vec!["A".to_string(), "B".to_string()]).unwrap();
        let bytes = meta.to_bytes();
        let reparsed = Meta::parse(&bytes).unwrap();
        assert_eq!(reparsed.get("language").unwrap().values(), vec!["English"]);
        assert_eq!(reparsed.get("side").unwrap().values(), vec!["A", "B"]);
    }

    #[test]
    fn empty_meta_emits_nothing() {
        assert!(Meta::new().to_bytes().is_empty());
    }

    #[test]
    fn remove_deletes_key() {
        let mut meta = Meta::new();
        meta.set("side", vec!["A".to_string()]).unwrap();
        meta.remove("side");
        assert!(meta.get("side").is_none());
        meta.remove("side"); // harmless if absent
    }
}

//! Minimal INI document reader.
//!
//! # Responsibility
//! - Split a UTF-8 INI text into sections of ordered `key = value` entries.
//!
//! # Invariants
//! - Lines starting with `#` or `;` are comments; blank lines are ignored.
//! - Keys before the first header belong to the global section `""`.
//! - Section names compare case-insensitively; keys keep their spelling.
//! - A repeated key inside one section overwrites the earlier value.

use std::collections::BTreeMap;

/// One parsed section with entries in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn insert(&mut self, key: String, value: String) {
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
            return;
        }
        self.entries.push((key, value));
    }

    /// Exact key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, IniSection>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Self {
        let mut document = Self::default();
        let mut current = String::new();

        for raw in text.lines() {
            let line = raw.trim().trim_start_matches('\u{feff}');
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current = section_key(&line[1..line.len() - 1]);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }

            document
                .sections
                .entry(current.clone())
                .or_default()
                .insert(key.to_string(), value.trim().to_string());
        }

        document
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(&section_key(name))
    }

    /// Reads one value, `None` when the section or key is absent.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }
}

fn section_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::IniDocument;

    const SAMPLE: &str = "\
; header comment
global = yes

[FamilyMap]
# FamilyName = BaseArticle | Category | Additional
S5_Sheet tray = GE-KT2- | 1. Кабельні лотки | -
S5_Sheet tray = GE-KT3- | 1. Кабельні лотки | -
not an entry

[Combobocks_Setting]
ThkCur = 1,2 мм
";

    #[test]
    fn parses_sections_and_global_keys() {
        let doc = IniDocument::parse(SAMPLE);
        assert_eq!(doc.get("", "global"), Some("yes"));
        assert_eq!(doc.get("Combobocks_Setting", "ThkCur"), Some("1,2 мм"));
    }

    #[test]
    fn duplicate_keys_overwrite_and_section_names_ignore_case() {
        let doc = IniDocument::parse(SAMPLE);
        let section = doc.section("familymap").expect("section should exist");
        assert_eq!(section.len(), 1);
        assert_eq!(
            section.get("S5_Sheet tray"),
            Some("GE-KT3- | 1. Кабельні лотки | -")
        );
    }

    #[test]
    fn missing_values_are_none() {
        let doc = IniDocument::parse(SAMPLE);
        assert_eq!(doc.get("Combobocks_Setting", "CoatCur"), None);
        assert_eq!(doc.get("Unknown", "ThkCur"), None);
    }
}

//! Conversion between wire field names (`VolumeSizeInGB`) and model field
//! names (`volume_size_in_gb`).
//!
//! The free functions are pure and deterministic. [`NameMapper`] adds a
//! vocabulary of the wire names that actually occur in a description, so a
//! model name can be mapped back to a wire name whose capitalization the
//! algorithm alone cannot restore.

use std::collections::{HashMap, HashSet};

/// Convert a wire name to its model name.
///
/// A new word starts at an uppercase letter that follows a lowercase letter or
/// a digit, and at the last capital of a run that is followed by a lowercase
/// letter (`HTTPServer` -> `http_server`). Digits stay with the preceding word.
pub fn to_model_name(wire_name: &str) -> String {
    let chars: Vec<char> = wire_name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (index, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words.join("_")
}

/// Convert a model name to its wire name by capitalizing every word.
pub fn to_wire_name(model_name: &str) -> String {
    model_name
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Name mapper with a reverse index of known wire names.
#[derive(Debug, Clone, Default)]
pub struct NameMapper {
    wire_by_model: HashMap<String, String>,
    ambiguous: HashSet<String>,
}

impl NameMapper {
    /// Mapper without vocabulary; behaves exactly like the free functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapper that restores the given wire names exactly.
    ///
    /// Wire names that collapse onto the same model name are dropped from the
    /// index and fall back to [`to_wire_name`].
    pub fn with_vocabulary<I, S>(wire_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapper = Self::default();
        for wire_name in wire_names {
            mapper.insert(wire_name.as_ref());
        }
        mapper
    }

    fn insert(&mut self, wire_name: &str) {
        let model_name = to_model_name(wire_name);
        if self.ambiguous.contains(&model_name) {
            return;
        }
        match self.wire_by_model.get(&model_name) {
            Some(existing) if existing != wire_name => {
                log::warn!(
                    "Wire names '{}' and '{}' both map to '{}'; using algorithmic casing",
                    existing,
                    wire_name,
                    model_name
                );
                self.wire_by_model.remove(&model_name);
                self.ambiguous.insert(model_name);
            }
            Some(_) => {}
            None => {
                self.wire_by_model
                    .insert(model_name, wire_name.to_string());
            }
        }
    }

    /// Model name for a wire name.
    pub fn to_model_name(&self, wire_name: &str) -> String {
        to_model_name(wire_name)
    }

    /// Wire name for a model name, preferring the vocabulary.
    pub fn to_wire_name(&self, model_name: &str) -> String {
        self.wire_by_model
            .get(model_name)
            .cloned()
            .unwrap_or_else(|| to_wire_name(model_name))
    }
}

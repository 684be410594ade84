//! Symbol table: id ↔ key resolution and id generation
//!
//! Attribute values in a symbol document are references of two shapes:
//!
//! - bare ids: `#123`
//! - inline literals: `#123=T:App.Foo`, binding id `123` to a key
//!
//! The table is rebuilt from the document on every flush by scanning every
//! attribute for literals. Lookups follow two deliberately different rules:
//! extraction keeps the **last** key seen for a repeated id, while reverse
//! lookup returns the **first** id (in table order) bound to a key.
//!
//! Fresh ids come from a counter held next to the entries. It starts at
//! `max(ID_FLOOR, largest id present)` so generated ids stay clear of the
//! external tool's numbering and of anything already in the file.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Document;
use crate::error::{Result, SymweaveError};

/// Minimum value the id generator may emit (exclusive)
pub const ID_FLOOR: u64 = 1_000_000;

/// Inline literal: `#<digits>=<key>`
static LITERAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^#(\d+)=(.*)$").expect("valid literal regex"));

/// Ordered id → key table extracted from one document
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: IndexMap<String, String>,
    /// Ids handed out by `literal`, as opposed to read or inserted
    generated: HashSet<String>,
    counter: Option<u64>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from every attribute value in the document.
    ///
    /// A repeated id keeps its first position but takes the last key seen.
    pub fn extract(doc: &Document) -> Self {
        let mut table = Self::new();
        for element in doc.root.descendants() {
            for (_, value) in &element.attributes {
                if let Some((id, key)) = parse_literal(value) {
                    table.entries.insert(id.to_string(), key.to_string());
                }
            }
        }
        tracing::debug!("Extracted {} symbol entries", table.entries.len());
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, key)| (id.as_str(), key.as_str()))
    }

    /// Key bound to a bare id (`#` prefix optional)
    pub fn get(&self, id: &str) -> Option<&str> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.entries.get(id).map(String::as_str)
    }

    /// Bind `id` to `key`, keeping an existing entry's position
    pub fn insert(&mut self, id: impl Into<String>, key: impl Into<String>) {
        self.entries.insert(id.into(), key.into());
    }

    /// Resolve a reference to its key.
    ///
    /// Inline literals resolve to the text after the first `=` without
    /// consulting the table; bare ids are looked up. Empty input and unknown
    /// ids resolve to `None`.
    pub fn resolve_key<'a>(&'a self, raw: &'a str) -> Option<&'a str> {
        if raw.is_empty() {
            return None;
        }
        match raw.split_once('=') {
            Some((_, key)) => Some(key),
            None => self.get(raw),
        }
    }

    /// First id in table order bound to `key`
    pub fn resolve_id(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, value)| value.as_str() == key)
            .map(|(id, _)| id.as_str())
    }

    /// First id bound to `key` that this table did not generate.
    ///
    /// Bindings written by [`SymbolTable::literal`] are skipped, so the
    /// result only names ids the document already carried.
    pub fn known_id(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(id, _)| !self.generated.contains(id.as_str()))
            .find(|(_, value)| value.as_str() == key)
            .map(|(id, _)| id.as_str())
    }

    /// Next unused id, as digits.
    ///
    /// The counter is seeded once per table from the floor or the largest
    /// numeric id present, whichever is higher, then only moves forward.
    /// Fails once the id space above the largest id is used up.
    pub fn generate_id(&mut self) -> Result<String> {
        let next = self.reserve(1)?;
        self.counter = Some(next);
        Ok(next.to_string())
    }

    /// Check that `count` more ids can be generated; returns the id the
    /// last of them would get
    pub fn reserve(&self, count: u64) -> Result<u64> {
        let current = self.current();
        current
            .checked_add(count)
            .ok_or_else(|| SymweaveError::IdExhausted {
                message: format!("cannot generate {} id(s) above {}", count, current),
            })
    }

    /// The id the next call to [`SymbolTable::generate_id`] would return
    pub fn peek_next_id(&self) -> Option<String> {
        self.reserve(1).ok().map(|next| next.to_string())
    }

    /// Write `key` as a fresh literal and register the binding
    pub fn literal(&mut self, key: &str) -> Result<String> {
        let id = self.generate_id()?;
        let literal = format_literal(&id, key);
        self.generated.insert(id.clone());
        self.entries.insert(id, key.to_string());
        Ok(literal)
    }

    /// Reference to `key`: the known bare id if any, else a fresh literal
    pub fn reference(&mut self, key: &str) -> Result<String> {
        match self.resolve_id(key) {
            Some(id) => Ok(format_bare(id)),
            None => self.literal(key),
        }
    }

    fn current(&self) -> u64 {
        match self.counter {
            Some(value) => value,
            None => self.max_numeric_id().map_or(ID_FLOOR, |max| max.max(ID_FLOOR)),
        }
    }

    fn max_numeric_id(&self) -> Option<u64> {
        self.entries
            .keys()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
    }
}

/// Split `#<digits>=<key>` into `(digits, key)`
pub fn parse_literal(value: &str) -> Option<(&str, &str)> {
    let caps = LITERAL_PATTERN.captures(value)?;
    let id = caps.get(1)?.as_str();
    let key = caps.get(2)?.as_str();
    Some((id, key))
}

/// Id portion of a reference (`#12` or `#12=key` -> `12`)
pub fn reference_id(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix('#')?;
    let id = rest.split_once('=').map_or(rest, |(id, _)| id);
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id)
}

pub fn format_literal(id: &str, key: &str) -> String {
    format!("#{}={}", id, key)
}

pub fn format_bare(id: &str) -> String {
    format!("#{}", id)
}

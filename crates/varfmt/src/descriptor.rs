//! Placeholder name resolution.
//!
//! A [`DescriptorTable`] maps placeholder names to the slots of the argument
//! arrays that will hold their values at render time. It is built once per
//! record shape, then handed to [`FormatProgram::compile`] for every format
//! string that should render records of that shape.
//!
//! ```rust
//! use varfmt::{DescriptorTable, FormatProgram};
//!
//! let mut table = DescriptorTable::new();
//! table.add_string("name", 0, None)?.add_int("len", 0)?;
//!
//! let program = FormatProgram::compile("{name}:{len}\n", &table)?;
//! assert_eq!(program.render_to_buffer(&["readA"], &[42]), b"readA:42\n");
//! # Ok::<(), varfmt::Error>(())
//! ```
//!
//! Compiled programs copy the bindings they use, so a table can be dropped or
//! reused once compilation is done.
//!
//! [`FormatProgram::compile`]: crate::FormatProgram::compile

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Which argument array a placeholder reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    String,
    Int,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::String => f.write_str("string"),
            SlotKind::Int => f.write_str("int"),
        }
    }
}

/// A placeholder resolved to its argument slot(s).
///
/// A string binding may carry a `fallback` slot. It renders
/// `strings[idx]`, or `strings[fallback]` when `strings[idx]` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderBinding {
    Str { idx: usize, fallback: Option<usize> },
    Int { idx: usize },
}

impl PlaceholderBinding {
    pub fn kind(&self) -> SlotKind {
        match self {
            PlaceholderBinding::Str { .. } => SlotKind::String,
            PlaceholderBinding::Int { .. } => SlotKind::Int,
        }
    }
}

/// Name to slot mapping used at compile time.
///
/// Names are unique; once added, a binding never changes. The table is plain
/// data and is `Send + Sync`, so it can be shared behind `&` or an `Arc`
/// while several threads compile against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorTable {
    entries: HashMap<String, PlaceholderBinding>,
}

impl DescriptorTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a string placeholder reading `strings[idx]`.
    ///
    /// With `fallback`, the placeholder renders `strings[fallback]` whenever
    /// `strings[idx]` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateName`] if `name` is already registered,
    /// whatever its kind.
    pub fn add_string(
        &mut self,
        name: &str,
        idx: usize,
        fallback: Option<usize>,
    ) -> Result<&mut Self, TableError> {
        self.insert(name, PlaceholderBinding::Str { idx, fallback })
    }

    /// Registers an integer placeholder reading `ints[idx]`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateName`] if `name` is already registered.
    pub fn add_int(&mut self, name: &str, idx: usize) -> Result<&mut Self, TableError> {
        self.insert(name, PlaceholderBinding::Int { idx })
    }

    /// Number of registered placeholders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(
        &mut self,
        name: &str,
        binding: PlaceholderBinding,
    ) -> Result<&mut Self, TableError> {
        if let Some(existing) = self.entries.get(name) {
            tracing::warn!(
                placeholder = name,
                existing = %existing.kind(),
                "rejecting duplicate placeholder"
            );
            return Err(TableError::DuplicateName {
                name: name.to_string(),
                existing: existing.kind(),
            });
        }
        self.entries.insert(name.to_string(), binding);
        Ok(self)
    }

    pub(crate) fn get(&self, name: &str) -> Option<PlaceholderBinding> {
        self.entries.get(name).copied()
    }

    /// Longest registered name that is a prefix of `text`, with its binding.
    ///
    /// `text` must be ASCII so every prefix ends on a char boundary.
    pub(crate) fn longest_prefix<'t>(
        &self,
        text: &'t str,
    ) -> Option<(&'t str, PlaceholderBinding)> {
        debug_assert!(text.is_ascii());
        (1..=text.len())
            .rev()
            .find_map(|end| self.get(&text[..end]).map(|b| (&text[..end], b)))
    }
}

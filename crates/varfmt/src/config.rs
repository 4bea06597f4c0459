//! Placeholder syntax selection and declarative table specs.
//!
//! Tables can be built in code with [`DescriptorTable`], or described in YAML
//! or JSON and loaded through [`TableSpec`]:
//!
//! ```rust
//! use varfmt::{FormatProgram, TableSpec};
//!
//! let spec = TableSpec::from_yaml(r#"
//! syntax: dollar
//! placeholders:
//!   - { name: ac, kind: string, slot: 0 }
//!   - { name: rl, kind: int, slot: 0 }
//! "#)?;
//! let table = spec.build()?;
//! let program = FormatProgram::compile_with("@$ac length=$rl", &table, spec.options())?;
//! assert_eq!(program.render_to_buffer(&["SRR1"], &[151]), b"@SRR1 length=151");
//! # Ok::<(), varfmt::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorTable, SlotKind};
use crate::error::{ConfigError, TableError};

/// How placeholders are written in a format string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// `{name}`, with `{{` and `}}` for literal braces. Whitespace inside the
    /// braces is ignored.
    #[default]
    Braces,

    /// `$name`, with `$$` for a literal dollar sign. The name is the longest
    /// registered name that prefixes the identifier following `$`; anything
    /// after it is literal text, so `$acX` is `$ac` followed by `X`.
    Dollar,
}

impl Syntax {
    /// The ASCII byte that opens a placeholder.
    pub const fn marker(self) -> u8 {
        match self {
            Syntax::Braces => b'{',
            Syntax::Dollar => b'$',
        }
    }
}

/// Options for [`FormatProgram::compile_with`](crate::FormatProgram::compile_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    #[serde(default)]
    pub syntax: Syntax,
}

impl CompileOptions {
    pub fn new(syntax: Syntax) -> Self {
        Self { syntax }
    }
}

/// One entry of a [`TableSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderSpec {
    pub name: String,
    pub kind: SlotKind,
    pub slot: usize,
    /// Only valid for `kind: string`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<usize>,
}

/// Serializable description of a descriptor table and its syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default)]
    pub syntax: Syntax,
    #[serde(default)]
    pub placeholders: Vec<PlaceholderSpec>,
}

impl TableSpec {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Compile options matching this spec's syntax.
    pub fn options(&self) -> CompileOptions {
        CompileOptions::new(self.syntax)
    }

    /// Builds the table, entry by entry, in document order.
    ///
    /// # Errors
    ///
    /// Fails on the first duplicate name, or on an `int` entry that declares
    /// a fallback slot.
    pub fn build(&self) -> Result<DescriptorTable, TableError> {
        let mut table = DescriptorTable::new();
        for entry in &self.placeholders {
            match entry.kind {
                SlotKind::String => {
                    table.add_string(&entry.name, entry.slot, entry.fallback)?;
                }
                SlotKind::Int => {
                    if entry.fallback.is_some() {
                        return Err(TableError::InvalidSlot {
                            name: entry.name.clone(),
                            reason: "int placeholders cannot have a fallback slot".to_string(),
                        });
                    }
                    table.add_int(&entry.name, entry.slot)?;
                }
            }
        }
        Ok(table)
    }
}

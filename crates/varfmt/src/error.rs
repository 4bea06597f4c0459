//! Error types for table construction, compilation and rendering.
//!
//! Each recoverable failure class has its own enum so callers can match on
//! exactly what an operation can produce:
//!
//! - [`TableError`]: building a [`DescriptorTable`](crate::DescriptorTable)
//! - [`CompileError`]: compiling a [`FormatProgram`](crate::FormatProgram)
//! - [`RenderError`]: writing a render into a file sink
//! - [`ConfigError`]: parsing a [`TableSpec`](crate::TableSpec)
//!
//! [`Error`] unifies them for callers that just want `?`.
//!
//! Passing argument arrays that are shorter than the program requires is a
//! caller bug and panics; it is not represented here. Use
//! [`FormatProgram::check_args`](crate::FormatProgram::check_args) to validate
//! the shape up front.

use std::io;

use crate::descriptor::SlotKind;

/// Errors raised while building a descriptor table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The name is already registered in this table.
    #[error("duplicate placeholder '{name}' (already bound as {existing})")]
    DuplicateName { name: String, existing: SlotKind },

    /// A table spec entry is inconsistent with its kind.
    #[error("invalid placeholder '{name}': {reason}")]
    InvalidSlot { name: String, reason: String },
}

/// Errors raised while compiling a format string.
///
/// Every variant carries the byte offset of the offending marker in the
/// format string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The placeholder name is not registered in the descriptor table.
    #[error("unknown placeholder '{name}' at offset {position}")]
    UnknownPlaceholder { name: String, position: usize },

    /// An opening marker without its closing delimiter.
    #[error("unterminated placeholder at offset {position}")]
    Unterminated { position: usize },

    /// A marker with no name inside it.
    #[error("empty placeholder name at offset {position}")]
    EmptyName { position: usize },

    /// A closing delimiter that neither closes a placeholder nor is escaped.
    #[error("unescaped '}}' at offset {position}")]
    StrayClose { position: usize },
}

impl CompileError {
    /// Byte offset of the problem in the format string.
    pub fn position(&self) -> usize {
        match self {
            CompileError::UnknownPlaceholder { position, .. }
            | CompileError::Unterminated { position }
            | CompileError::EmptyName { position }
            | CompileError::StrayClose { position } => *position,
        }
    }
}

/// Errors raised while rendering into a file sink.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The sink rejected a write. `written` bytes of this record were
    /// confirmed before the failure and the cursor was advanced by that much.
    #[error("sink write failed after {written} bytes: {source}")]
    Io {
        written: u64,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    /// Bytes of the failed record that did reach the sink.
    pub fn written(&self) -> u64 {
        match self {
            RenderError::Io { written, .. } => *written,
        }
    }
}

/// Errors raised while parsing a table spec document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid YAML table spec: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON table spec: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any error produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for varfmt operations.
pub type Result<T> = std::result::Result<T, Error>;

//! # varfmt - Compiled Format Strings for Per-Record Output
//!
//! `varfmt` turns a format string with named placeholders into a
//! [`FormatProgram`] once, then renders it for as many records as needed.
//! Placeholder names are resolved to argument-array slots at compile time, so
//! rendering a record is a straight walk over literal text and slot reads.
//!
//! ## Core Concepts
//!
//! - [`DescriptorTable`]: maps placeholder names to string or integer slots
//! - [`FormatProgram`]: a compiled format string, immutable and `Send + Sync`
//! - [`PositionedSink`]: file-like output written at an explicit offset
//! - [`Syntax`]: `{name}` (default) or `$name` placeholders
//! - [`TableSpec`]: tables described in YAML or JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use varfmt::{DescriptorTable, FormatProgram};
//!
//! let mut table = DescriptorTable::new();
//! table.add_string("name", 0, None)?;
//! table.add_int("len", 0)?;
//!
//! let program = FormatProgram::compile("{name}:{len}\n", &table)?;
//!
//! let mut out = Vec::new();
//! for (name, len) in [("readA", 42), ("readB", 7)] {
//!     program.render_into(&mut out, &[name], &[len]);
//! }
//! assert_eq!(out, b"readA:42\nreadB:7\n");
//! # Ok::<(), varfmt::Error>(())
//! ```
//!
//! ## Writing to Files
//!
//! [`FormatProgram::render_to_file`] writes at a caller-owned cursor and
//! advances it by the bytes actually written, including on failure:
//!
//! ```rust
//! use std::io::Cursor;
//! use varfmt::{DescriptorTable, FormatProgram};
//!
//! let mut table = DescriptorTable::new();
//! table.add_int("n", 0)?;
//! let program = FormatProgram::compile("{n}\n", &table)?;
//!
//! let mut sink = Cursor::new(Vec::new());
//! let mut pos = 0u64;
//! for n in 1..=3 {
//!     program.render_to_file(&mut sink, &mut pos, &[""; 0], &[n])?;
//! }
//! assert_eq!(pos, 6);
//! assert_eq!(sink.into_inner(), b"1\n2\n3\n");
//! # Ok::<(), varfmt::Error>(())
//! ```
//!
//! ## Escaping
//!
//! With the default syntax `{{` and `}}` produce literal braces; with
//! [`Syntax::Dollar`], `$$` produces a literal `$`.
//!
//! ## Logging
//!
//! Rejected table entries, compile failures, and sink write failures are
//! reported through [`tracing`] before the error is returned. Install a
//! subscriber to see them.

mod config;
mod descriptor;
mod error;
pub mod preset;
mod program;

pub use config::{CompileOptions, PlaceholderSpec, Syntax, TableSpec};
pub use descriptor::{DescriptorTable, PlaceholderBinding, SlotKind};
pub use error::{CompileError, ConfigError, Error, RenderError, Result, TableError};
pub use program::{Arity, ArityMismatch, FormatProgram, PositionedSink, Segment};

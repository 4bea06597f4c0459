//! Compiled format programs.
//!
//! A [`FormatProgram`] is a format string that has been parsed and had all its
//! placeholder names resolved against a [`DescriptorTable`]. Rendering walks
//! the compiled [`Segment`]s and never looks at the format string or the
//! table again, which is what makes per-record rendering cheap.
//!
//! ## Rendering
//!
//! | Method | Output |
//! |--------|--------|
//! | [`render_to_buffer`](FormatProgram::render_to_buffer) | a new, exactly sized `Vec<u8>` |
//! | [`render_into`](FormatProgram::render_into) | appended to a caller-owned `Vec<u8>` |
//! | [`render_to_writer`](FormatProgram::render_to_writer) | any `io::Write` |
//! | [`render_to_file`](FormatProgram::render_to_file) | a [`PositionedSink`] at a tracked offset |
//!
//! All four share one traversal, so their bytes are identical for the same
//! arguments.
//!
//! ## Arguments
//!
//! String arguments are anything that is `AsRef<[u8]>` (`&str`, `String`,
//! `Vec<u8>`, ...); integer arguments are `u64` and render in plain decimal.
//! A string placeholder with a fallback slot renders the fallback when its
//! primary value is empty.
//!
//! Argument arrays shorter than [`FormatProgram::arity`] are a caller bug and
//! panic at render time. [`FormatProgram::check_args`] validates the shape
//! without rendering.
//!
//! ## Sharing
//!
//! A compiled program is immutable and `Send + Sync`. Any number of threads
//! may render from one program at once. A file sink and its cursor are not
//! shared state of the program; callers writing to the same sink from several
//! threads must serialize those calls themselves.
//!
//! [`PositionedSink`]: crate::PositionedSink

mod compile;
mod render;
mod sink;

use std::io;

use crate::config::CompileOptions;
use crate::descriptor::{DescriptorTable, PlaceholderBinding};
use crate::error::{CompileError, RenderError};

pub use sink::PositionedSink;

/// One unit of a compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text emitted verbatim, with escapes already resolved.
    Literal(String),
    /// A placeholder resolved at compile time.
    Placeholder(PlaceholderBinding),
}

/// Minimum argument-array lengths a program needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arity {
    pub strings: usize,
    pub ints: usize,
}

/// Argument arrays too short for a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("program needs {required:?} arguments, got {strings} strings and {ints} ints")]
pub struct ArityMismatch {
    pub required: Arity,
    pub strings: usize,
    pub ints: usize,
}

/// A format string compiled against a descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProgram {
    segments: Vec<Segment>,
    arity: Arity,
    literal_len: usize,
}

impl FormatProgram {
    /// Compiles `format` using `{name}` placeholders.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown, empty, or unterminated placeholder, or an
    /// unescaped `}`. No partial program is returned.
    pub fn compile(format: &str, table: &DescriptorTable) -> Result<Self, CompileError> {
        Self::compile_with(format, table, CompileOptions::default())
    }

    /// Compiles `format` with explicit options.
    pub fn compile_with(
        format: &str,
        table: &DescriptorTable,
        options: CompileOptions,
    ) -> Result<Self, CompileError> {
        let segments = match compile::compile_segments(format, table, options.syntax) {
            Ok(segments) => segments,
            Err(err) => {
                tracing::warn!(
                    format = format,
                    position = err.position(),
                    error = %err,
                    "format string failed to compile"
                );
                return Err(err);
            }
        };

        let program = Self::from_segments(segments);
        tracing::debug!(
            segments = program.segments.len(),
            string_args = program.arity.strings,
            int_args = program.arity.ints,
            "compiled format program"
        );
        Ok(program)
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let mut arity = Arity::default();
        let mut literal_len = 0;
        for segment in &segments {
            match segment {
                Segment::Literal(text) => literal_len += text.len(),
                Segment::Placeholder(PlaceholderBinding::Str { idx, fallback }) => {
                    let highest = fallback.map_or(*idx, |f| f.max(*idx));
                    arity.strings = arity.strings.max(highest.saturating_add(1));
                }
                Segment::Placeholder(PlaceholderBinding::Int { idx }) => {
                    arity.ints = arity.ints.max(idx.saturating_add(1));
                }
            }
        }
        Self {
            segments,
            arity,
            literal_len,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Checks that argument arrays of the given lengths cover every slot the
    /// program reads.
    pub fn check_args(&self, strings: usize, ints: usize) -> Result<(), ArityMismatch> {
        if strings < self.arity.strings || ints < self.arity.ints {
            return Err(ArityMismatch {
                required: self.arity,
                strings,
                ints,
            });
        }
        Ok(())
    }

    /// Exact number of bytes a render with these arguments produces.
    pub fn rendered_len<S: AsRef<[u8]>>(&self, strings: &[S], ints: &[u64]) -> usize {
        self.literal_len + render::placeholder_len(&self.segments, strings, ints)
    }

    /// Renders into a freshly allocated buffer of exactly the rendered size.
    ///
    /// # Panics
    ///
    /// If an argument array is shorter than [`arity`](Self::arity) requires.
    pub fn render_to_buffer<S: AsRef<[u8]>>(&self, strings: &[S], ints: &[u64]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.rendered_len(strings, ints));
        render::render_vec(&self.segments, strings, ints, &mut buf);
        buf
    }

    /// Appends the render to `buf`, reserving the exact size first.
    pub fn render_into<S: AsRef<[u8]>>(&self, buf: &mut Vec<u8>, strings: &[S], ints: &[u64]) {
        buf.reserve(self.rendered_len(strings, ints));
        render::render_vec(&self.segments, strings, ints, buf);
    }

    /// Streams the render into `writer`.
    pub fn render_to_writer<W, S>(
        &self,
        writer: &mut W,
        strings: &[S],
        ints: &[u64],
    ) -> io::Result<()>
    where
        W: io::Write + ?Sized,
        S: AsRef<[u8]>,
    {
        render::render_writer(&self.segments, strings, ints, writer)
    }

    /// Writes the render into `sink` starting at `*cursor`.
    ///
    /// On success `*cursor` has advanced by the rendered length. On failure it
    /// has advanced by the bytes the sink confirmed before the error, which
    /// [`RenderError::written`] also reports. Nothing is retried besides short
    /// and interrupted writes; truncating or rewriting is up to the caller.
    ///
    /// The sink is flushed once after the last write, so buffered sinks hold
    /// no pending bytes of this record when `Ok` is returned. A failed flush
    /// is reported as [`RenderError::Io`] with the cursor already advanced.
    pub fn render_to_file<K, S>(
        &self,
        sink: &mut K,
        cursor: &mut u64,
        strings: &[S],
        ints: &[u64],
    ) -> Result<(), RenderError>
    where
        K: PositionedSink + ?Sized,
        S: AsRef<[u8]>,
    {
        let start = *cursor;
        let staged = self.rendered_len(strings, ints).min(render::STAGE_CAPACITY);
        let result = render::render_sink(&self.segments, strings, ints, sink, cursor, staged);

        result.map_err(|source| {
            let written = *cursor - start;
            tracing::warn!(
                offset = start,
                written,
                error = %source,
                "sink write failed during render"
            );
            RenderError::Io { written, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table() -> DescriptorTable {
        let mut table = DescriptorTable::new();
        table
            .add_string("name", 0, None)
            .unwrap()
            .add_string("sn", 1, Some(2))
            .unwrap()
            .add_int("len", 0)
            .unwrap()
            .add_int("id", 3)
            .unwrap();
        table
    }

    #[test]
    fn test_name_and_len() {
        let program = FormatProgram::compile("{name}:{len}\n", &table()).unwrap();
        assert_eq!(program.render_to_buffer(&["readA"], &[42]), b"readA:42\n");
    }

    #[test]
    fn test_empty_program() {
        let program = FormatProgram::compile("", &table()).unwrap();
        assert!(program.segments().is_empty());
        assert_eq!(program.arity(), Arity::default());
        assert!(program.render_to_buffer::<&str>(&[], &[]).is_empty());
        assert!(program.render_to_buffer(&["x", "y"], &[1, 2]).is_empty());
    }

    #[test]
    fn test_arity_counts_fallback_slot() {
        let program = FormatProgram::compile("{sn}{id}", &table()).unwrap();
        assert_eq!(
            program.arity(),
            Arity {
                strings: 3,
                ints: 4
            }
        );
        assert!(program.check_args(3, 4).is_ok());

        let err = program.check_args(2, 4).unwrap_err();
        assert_eq!(err.strings, 2);
        assert_eq!(err.required.strings, 3);
    }

    #[test]
    fn test_max_slot_saturates_arity() {
        let mut table = DescriptorTable::new();
        table
            .add_string("far", usize::MAX, None)
            .unwrap()
            .add_int("big", usize::MAX)
            .unwrap();

        let program = FormatProgram::compile("{far}{big}", &table).unwrap();
        assert_eq!(
            program.arity(),
            Arity {
                strings: usize::MAX,
                ints: usize::MAX
            }
        );
        assert!(program.check_args(4, 4).is_err());
    }

    #[test]
    fn test_fallback_when_primary_empty() {
        let program = FormatProgram::compile("[{sn}]", &table()).unwrap();
        assert_eq!(program.render_to_buffer(&["", "spot7", "42"], &[]), b"[spot7]");
        assert_eq!(program.render_to_buffer(&["", "", "42"], &[]), b"[42]");
    }

    #[test]
    fn test_rendered_len_matches_output() {
        let program = FormatProgram::compile("{name} {sn} {len} {id}", &table()).unwrap();
        let strings = ["abc", "", "fallback"];
        let ints = [0, 0, 0, u64::MAX];
        let out = program.render_to_buffer(&strings, &ints);
        assert_eq!(program.rendered_len(&strings, &ints), out.len());
        assert_eq!(out, b"abc fallback 0 18446744073709551615");
    }

    #[test]
    fn test_render_into_appends() {
        let program = FormatProgram::compile("{len},", &table()).unwrap();
        let mut buf = b"start:".to_vec();
        program.render_into::<&str>(&mut buf, &[], &[1]);
        program.render_into::<&str>(&mut buf, &[], &[22]);
        assert_eq!(buf, b"start:1,22,");
    }

    #[test]
    fn test_byte_string_arguments() {
        let program = FormatProgram::compile("{name}", &table()).unwrap();
        let args: Vec<Vec<u8>> = vec![vec![0xff, b'a']];
        assert_eq!(program.render_to_buffer(&args, &[]), vec![0xff, b'a']);
    }

    #[test]
    fn test_writer_matches_buffer() {
        let program = FormatProgram::compile("{name}={len}", &table()).unwrap();
        let mut out = Vec::new();
        program.render_to_writer(&mut out, &["k"], &[9]).unwrap();
        assert_eq!(out, program.render_to_buffer(&["k"], &[9]));
    }

    #[test]
    fn test_file_advances_cursor() {
        let program = FormatProgram::compile("{name}:{len}\n", &table()).unwrap();
        let mut sink = Cursor::new(Vec::new());
        let mut cursor = 0u64;

        program
            .render_to_file(&mut sink, &mut cursor, &["a"], &[1])
            .unwrap();
        program
            .render_to_file(&mut sink, &mut cursor, &["bb"], &[22])
            .unwrap();

        assert_eq!(cursor, 10);
        assert_eq!(sink.into_inner(), b"a:1\nbb:22\n");
    }

    #[test]
    fn test_file_writes_at_cursor() {
        let program = FormatProgram::compile("{name}", &table()).unwrap();
        let mut sink = Cursor::new(b"xxxxxx".to_vec());
        let mut cursor = 2u64;

        program
            .render_to_file(&mut sink, &mut cursor, &["ab"], &[])
            .unwrap();

        assert_eq!(cursor, 4);
        assert_eq!(sink.into_inner(), b"xxabxx");
    }

    #[test]
    #[should_panic(expected = "string slot 0")]
    fn test_missing_string_argument_panics() {
        let program = FormatProgram::compile("{name}", &table()).unwrap();
        program.render_to_buffer::<&str>(&[], &[]);
    }

    #[test]
    #[should_panic(expected = "int slot 3")]
    fn test_missing_int_argument_panics() {
        let program = FormatProgram::compile("{id}", &table()).unwrap();
        program.render_to_buffer::<&str>(&[], &[1, 2, 3]);
    }
}

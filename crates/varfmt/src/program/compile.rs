//! Format string compiler.
//!
//! Scans a format string once, left to right, turning it into a sequence of
//! [`Segment`]s. Literal runs are accumulated (escapes included) and flushed
//! whenever a placeholder is resolved, so a compiled program never has two
//! consecutive literal segments.
//!
//! # Brace syntax
//!
//! - `{name}` - placeholder; surrounding whitespace is trimmed (`{ name }`)
//! - `{{` and `}}` - literal `{` and `}`
//! - a lone `}` is an error, as is a `{` with no closing `}` or with another
//!   `{` before it
//!
//! # Dollar syntax
//!
//! - `$name` - placeholder; the longest registered name that prefixes the
//!   identifier run (`[A-Za-z0-9_]+`) after `$` wins, the rest of the run is
//!   literal text
//! - `$$` - literal `$`
//! - `$` not followed by an identifier character is an error

use crate::config::Syntax;
use crate::descriptor::{DescriptorTable, PlaceholderBinding};
use crate::error::CompileError;

use super::Segment;

const OPEN: u8 = Syntax::Braces.marker();
const CLOSE: u8 = b'}';
const DOLLAR: u8 = Syntax::Dollar.marker();

/// Accumulates segments, merging adjacent literal text.
#[derive(Default)]
struct SegmentBuilder {
    pending: String,
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn push_literal(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn push_placeholder(&mut self, binding: PlaceholderBinding) {
        self.flush();
        self.segments.push(Segment::Placeholder(binding));
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.segments
                .push(Segment::Literal(std::mem::take(&mut self.pending)));
        }
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments
    }
}

pub(crate) fn compile_segments(
    format: &str,
    table: &DescriptorTable,
    syntax: Syntax,
) -> Result<Vec<Segment>, CompileError> {
    let mut builder = SegmentBuilder::default();
    match syntax {
        Syntax::Braces => scan_braces(format, table, &mut builder)?,
        Syntax::Dollar => scan_dollar(format, table, &mut builder)?,
    }
    Ok(builder.finish())
}

fn scan_braces(
    format: &str,
    table: &DescriptorTable,
    out: &mut SegmentBuilder,
) -> Result<(), CompileError> {
    let bytes = format.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            OPEN | CLOSE if bytes.get(i + 1) == Some(&bytes[i]) => {
                // Escaped brace: keep one of the pair.
                out.push_literal(&format[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            OPEN => {
                out.push_literal(&format[literal_start..i]);

                // A second `{` before the closing brace leaves this one open.
                let body_start = i + 1;
                let close = bytes[body_start..]
                    .iter()
                    .position(|b| *b == OPEN || *b == CLOSE)
                    .filter(|end| bytes[body_start + end] == CLOSE)
                    .ok_or(CompileError::Unterminated { position: i })?;
                let name = format[body_start..body_start + close].trim();
                if name.is_empty() {
                    return Err(CompileError::EmptyName { position: i });
                }

                let binding = table
                    .get(name)
                    .ok_or_else(|| CompileError::UnknownPlaceholder {
                        name: name.to_string(),
                        position: i,
                    })?;
                out.push_placeholder(binding);

                i = body_start + close + 1;
                literal_start = i;
            }
            CLOSE => return Err(CompileError::StrayClose { position: i }),
            _ => i += 1,
        }
    }

    out.push_literal(&format[literal_start..]);
    Ok(())
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_dollar(
    format: &str,
    table: &DescriptorTable,
    out: &mut SegmentBuilder,
) -> Result<(), CompileError> {
    let bytes = format.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != DOLLAR {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&DOLLAR) {
            out.push_literal(&format[literal_start..=i]);
            i += 2;
            literal_start = i;
            continue;
        }

        out.push_literal(&format[literal_start..i]);

        let run_start = i + 1;
        let run_len = bytes[run_start..]
            .iter()
            .take_while(|b| is_ident_byte(**b))
            .count();
        if run_len == 0 {
            return Err(CompileError::EmptyName { position: i });
        }

        let run = &format[run_start..run_start + run_len];
        let (name, binding) =
            table
                .longest_prefix(run)
                .ok_or_else(|| CompileError::UnknownPlaceholder {
                    name: run.to_string(),
                    position: i,
                })?;
        out.push_placeholder(binding);

        i = run_start + name.len();
        literal_start = i;
    }

    out.push_literal(&format[literal_start..]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DescriptorTable {
        let mut table = DescriptorTable::new();
        table
            .add_string("name", 0, None)
            .unwrap()
            .add_string("s", 1, None)
            .unwrap()
            .add_string("sn", 2, None)
            .unwrap()
            .add_int("len", 0)
            .unwrap();
        table
    }

    fn braces(format: &str) -> Result<Vec<Segment>, CompileError> {
        compile_segments(format, &table(), Syntax::Braces)
    }

    fn dollar(format: &str) -> Result<Vec<Segment>, CompileError> {
        compile_segments(format, &table(), Syntax::Dollar)
    }

    fn lit(text: &str) -> Segment {
        Segment::Literal(text.to_string())
    }

    fn str_slot(idx: usize) -> Segment {
        Segment::Placeholder(PlaceholderBinding::Str {
            idx,
            fallback: None,
        })
    }

    fn int_slot(idx: usize) -> Segment {
        Segment::Placeholder(PlaceholderBinding::Int { idx })
    }

    #[test]
    fn test_empty_format() {
        assert!(braces("").unwrap().is_empty());
        assert!(dollar("").unwrap().is_empty());
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(braces("no placeholders").unwrap(), vec![lit("no placeholders")]);
    }

    #[test]
    fn test_literal_and_placeholders() {
        assert_eq!(
            braces("{name}:{len}\n").unwrap(),
            vec![str_slot(0), lit(":"), int_slot(0), lit("\n")]
        );
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(braces("{name}{len}").unwrap(), vec![str_slot(0), int_slot(0)]);
    }

    #[test]
    fn test_whitespace_in_name() {
        assert_eq!(braces("{ name }").unwrap(), vec![str_slot(0)]);
    }

    #[test]
    fn test_escapes_merge_into_literal() {
        assert_eq!(
            braces("a{{b}}c{name}").unwrap(),
            vec![lit("a{b}c"), str_slot(0)]
        );
        assert_eq!(braces("{{name}}").unwrap(), vec![lit("{name}")]);
    }

    #[test]
    fn test_unknown_placeholder() {
        assert_eq!(
            braces("ab{missing}").unwrap_err(),
            CompileError::UnknownPlaceholder {
                name: "missing".to_string(),
                position: 2
            }
        );
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(
            braces("x{name").unwrap_err(),
            CompileError::Unterminated { position: 1 }
        );
    }

    #[test]
    fn test_open_brace_inside_placeholder() {
        assert_eq!(
            braces("{a{b}").unwrap_err(),
            CompileError::Unterminated { position: 0 }
        );
        assert_eq!(
            braces("x {name{{len}").unwrap_err(),
            CompileError::Unterminated { position: 2 }
        );
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            braces("{ }").unwrap_err(),
            CompileError::EmptyName { position: 0 }
        );
    }

    #[test]
    fn test_stray_close() {
        assert_eq!(
            braces("a}b").unwrap_err(),
            CompileError::StrayClose { position: 1 }
        );
    }

    #[test]
    fn test_non_ascii_literal() {
        assert_eq!(
            braces("é{name}ü").unwrap(),
            vec![lit("é"), str_slot(0), lit("ü")]
        );
    }

    #[test]
    fn test_dollar_longest_prefix() {
        assert_eq!(dollar("$sn").unwrap(), vec![str_slot(2)]);
        assert_eq!(dollar("$s.$sn").unwrap(), vec![str_slot(1), lit("."), str_slot(2)]);
        assert_eq!(dollar("$snX").unwrap(), vec![str_slot(2), lit("X")]);
    }

    #[test]
    fn test_dollar_escape() {
        assert_eq!(dollar("$$name").unwrap(), vec![lit("$name")]);
        assert_eq!(dollar("cost: $$$len").unwrap(), vec![lit("cost: $"), int_slot(0)]);
    }

    #[test]
    fn test_dollar_braces_are_literal() {
        assert_eq!(dollar("{$len}").unwrap(), vec![lit("{"), int_slot(0), lit("}")]);
    }

    #[test]
    fn test_dollar_unknown_reports_run() {
        assert_eq!(
            dollar("x $abc").unwrap_err(),
            CompileError::UnknownPlaceholder {
                name: "abc".to_string(),
                position: 2
            }
        );
    }

    #[test]
    fn test_dollar_without_name() {
        assert_eq!(
            dollar("price $").unwrap_err(),
            CompileError::EmptyName { position: 6 }
        );
        assert_eq!(
            dollar("$ x").unwrap_err(),
            CompileError::EmptyName { position: 0 }
        );
    }
}

//! Segment traversal shared by every render target.
//!
//! [`traverse`] is the only code that interprets segments. Each target is a
//! small [`Emit`] adapter, so buffer, writer and sink renders cannot disagree
//! about the bytes they produce.

use std::convert::Infallible;
use std::io;

use super::sink::PositionedSink;
use super::Segment;
use crate::descriptor::PlaceholderBinding;

/// Upper bound on bytes staged before a sink write.
pub(crate) const STAGE_CAPACITY: usize = 8 * 1024;

trait Emit {
    type Error;

    fn emit(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

fn traverse<E, S>(
    segments: &[Segment],
    strings: &[S],
    ints: &[u64],
    out: &mut E,
) -> Result<(), E::Error>
where
    E: Emit,
    S: AsRef<[u8]>,
{
    let mut digits = Decimal::default();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.emit(text.as_bytes())?,
            Segment::Placeholder(PlaceholderBinding::Str { idx, fallback }) => {
                out.emit(string_value(strings, *idx, *fallback))?
            }
            Segment::Placeholder(PlaceholderBinding::Int { idx }) => {
                out.emit(digits.format(int_arg(ints, *idx)))?
            }
        }
    }
    Ok(())
}

/// Rendered length of all placeholder segments.
pub(crate) fn placeholder_len<S: AsRef<[u8]>>(
    segments: &[Segment],
    strings: &[S],
    ints: &[u64],
) -> usize {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(_) => 0,
            Segment::Placeholder(PlaceholderBinding::Str { idx, fallback }) => {
                string_value(strings, *idx, *fallback).len()
            }
            Segment::Placeholder(PlaceholderBinding::Int { idx }) => {
                decimal_len(int_arg(ints, *idx))
            }
        })
        .sum()
}

fn string_arg<S: AsRef<[u8]>>(strings: &[S], idx: usize) -> &[u8] {
    assert!(
        idx < strings.len(),
        "string slot {idx} out of bounds for {} string arguments",
        strings.len()
    );
    strings[idx].as_ref()
}

fn int_arg(ints: &[u64], idx: usize) -> u64 {
    assert!(
        idx < ints.len(),
        "int slot {idx} out of bounds for {} int arguments",
        ints.len()
    );
    ints[idx]
}

/// Primary value, or the fallback slot's value when the primary is empty.
fn string_value<S: AsRef<[u8]>>(strings: &[S], idx: usize, fallback: Option<usize>) -> &[u8] {
    let primary = string_arg(strings, idx);
    match fallback {
        Some(fallback) if primary.is_empty() => string_arg(strings, fallback),
        _ => primary,
    }
}

/// Stack buffer for formatting one `u64` in decimal.
#[derive(Default)]
struct Decimal {
    buf: [u8; 20],
}

impl Decimal {
    fn format(&mut self, mut n: u64) -> &[u8] {
        let mut pos = self.buf.len();
        loop {
            pos -= 1;
            self.buf[pos] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        &self.buf[pos..]
    }
}

fn decimal_len(n: u64) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

struct VecEmit<'a>(&'a mut Vec<u8>);

impl Emit for VecEmit<'_> {
    type Error = Infallible;

    fn emit(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.0.extend_from_slice(bytes);
        Ok(())
    }
}

pub(crate) fn render_vec<S: AsRef<[u8]>>(
    segments: &[Segment],
    strings: &[S],
    ints: &[u64],
    buf: &mut Vec<u8>,
) {
    match traverse(segments, strings, ints, &mut VecEmit(buf)) {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

struct WriterEmit<'a, W: ?Sized>(&'a mut W);

impl<W: io::Write + ?Sized> Emit for WriterEmit<'_, W> {
    type Error = io::Error;

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.write_all(bytes)
    }
}

pub(crate) fn render_writer<W, S>(
    segments: &[Segment],
    strings: &[S],
    ints: &[u64],
    writer: &mut W,
) -> io::Result<()>
where
    W: io::Write + ?Sized,
    S: AsRef<[u8]>,
{
    traverse(segments, strings, ints, &mut WriterEmit(writer))
}

/// Stages small emissions and writes them to the sink at the cursor.
///
/// The cursor only moves by bytes the sink reported as written.
struct SinkEmit<'a, K: ?Sized> {
    sink: &'a mut K,
    cursor: &'a mut u64,
    staged: Vec<u8>,
    limit: usize,
}

impl<K: PositionedSink + ?Sized> SinkEmit<'_, K> {
    fn commit(&mut self) -> io::Result<()> {
        let result = write_all_at(self.sink, self.cursor, &self.staged);
        self.staged.clear();
        result
    }
}

impl<K: PositionedSink + ?Sized> Emit for SinkEmit<'_, K> {
    type Error = io::Error;

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.staged.len() + bytes.len() > self.limit {
            self.commit()?;
        }
        if bytes.len() > self.limit {
            write_all_at(self.sink, self.cursor, bytes)
        } else {
            self.staged.extend_from_slice(bytes);
            Ok(())
        }
    }
}

fn write_all_at<K: PositionedSink + ?Sized>(
    sink: &mut K,
    cursor: &mut u64,
    mut bytes: &[u8],
) -> io::Result<()> {
    while !bytes.is_empty() {
        match sink.write_at(*cursor, bytes) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "sink accepted no bytes",
                ))
            }
            Ok(n) => {
                *cursor += n as u64;
                bytes = &bytes[n..];
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

pub(crate) fn render_sink<K, S>(
    segments: &[Segment],
    strings: &[S],
    ints: &[u64],
    sink: &mut K,
    cursor: &mut u64,
    stage: usize,
) -> io::Result<()>
where
    K: PositionedSink + ?Sized,
    S: AsRef<[u8]>,
{
    let mut out = SinkEmit {
        sink,
        cursor,
        staged: Vec::with_capacity(stage),
        limit: stage,
    };
    traverse(segments, strings, ints, &mut out)?;
    out.commit()?;
    out.sink.flush()
}

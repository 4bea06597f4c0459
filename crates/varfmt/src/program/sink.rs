use std::io::{self, Seek, SeekFrom, Write};

/// A byte sink addressed by absolute offset.
///
/// This is the output side of [`FormatProgram::render_to_file`]: the caller
/// keeps the write cursor, the sink only has to put bytes where it is told.
///
/// Every `Write + Seek` type is a sink, including [`std::fs::File`] and
/// [`std::io::Cursor`]. Implement it directly for sinks that support
/// positioned writes natively.
///
/// [`FormatProgram::render_to_file`]: crate::FormatProgram::render_to_file
pub trait PositionedSink {
    /// Writes a prefix of `bytes` at `offset`, returning how many bytes were
    /// written. Returning `Ok(0)` for a non-empty `bytes` is treated as a
    /// failed write.
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<usize>;

    /// Pushes any bytes the sink still holds to their destination. Called
    /// once at the end of every render.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Write + Seek + ?Sized> PositionedSink for T {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        self.write(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

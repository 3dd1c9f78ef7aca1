//! Chunked image copy
//!
//! The copier streams the source through a single staging buffer into the
//! destination, checking every write against the preceding read, then
//! flushes the destination. Syncing to stable storage needs a file handle
//! and is done by the caller, see [`crate::flash::sync_destination`].

use crate::config::FlashConfig;
use crate::error::{Error, Result};
use log::{debug, info};
use std::io::{self, Read, Write};

/// Counters from a finished copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyStats {
    /// Total bytes written to the destination
    pub bytes_written: u64,
    /// Number of progress lines logged
    pub progress_lines: u64,
}

/// Streams a source into a destination in fixed-size chunks
#[derive(Debug, Clone)]
pub struct Copier {
    chunk_size: usize,
    progress_interval: u64,
}

impl Copier {
    /// Create a copier, rejecting a zero chunk size or progress interval
    pub fn new(config: &FlashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            progress_interval: config.progress_interval,
        })
    }

    /// Copy exactly `source_size` bytes from `source` to `dest`, then flush
    ///
    /// Reads beyond `source_size` are never issued. A source that ends early
    /// is reported as [`Error::SourceChanged`].
    ///
    /// Each chunk is handed to `dest` in one `write` call and a count below
    /// the chunk length is [`Error::ShortWrite`]. When `dest` is a
    /// `BufWriter` whose capacity exceeds the chunk size, the buffer absorbs
    /// whole chunks and retries partial device writes itself in `flush`, so
    /// device-level short writes surface only when the chunk is at least the
    /// buffer capacity.
    pub fn copy<R: Read, W: Write>(
        &self,
        source: R,
        dest: &mut W,
        source_size: u64,
    ) -> Result<CopyStats> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(self.chunk_size)
            .map_err(|source| Error::BufferAlloc {
                size: self.chunk_size,
                source,
            })?;
        buffer.resize(self.chunk_size, 0);

        let mut source = source.take(source_size);
        let mut stats = CopyStats::default();

        loop {
            let bytes_read = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::ReadSource(e)),
            };

            let bytes_written = write_chunk(dest, &buffer[..bytes_read])?;
            if bytes_written != bytes_read {
                return Err(Error::ShortWrite {
                    expected: bytes_read,
                    written: bytes_written,
                });
            }

            let previous = stats.bytes_written;
            stats.bytes_written += bytes_written as u64;

            if crossed_interval(previous, stats.bytes_written, self.progress_interval) {
                info!("Written {} bytes...", stats.bytes_written);
                stats.progress_lines += 1;
            }
        }

        if stats.bytes_written != source_size {
            return Err(Error::SourceChanged {
                expected: source_size,
                actual: stats.bytes_written,
            });
        }

        dest.flush().map_err(Error::Flush)?;
        debug!("Flushed {} bytes to destination", stats.bytes_written);

        Ok(stats)
    }
}

/// Issue a single write for `chunk`, retrying only on interruption
fn write_chunk<W: Write>(dest: &mut W, chunk: &[u8]) -> Result<usize> {
    loop {
        match dest.write(chunk) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::WriteDestination(e)),
        }
    }
}

/// True when moving from `previous` to `total` crosses a multiple of `interval`
fn crossed_interval(previous: u64, total: u64, interval: u64) -> bool {
    total / interval > previous / interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 + 7) as u8).collect()
    }

    fn copier(chunk_size: usize, interval: u64) -> Copier {
        Copier::new(
            &FlashConfig::default()
                .with_chunk_size(chunk_size)
                .with_progress_interval(interval),
        )
        .unwrap()
    }

    /// Accepts at most `limit` bytes per write
    struct ShortWriter {
        data: Vec<u8>,
        limit: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Yields `good` bytes, then fails
    struct FailingReader {
        good: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "media error"));
            }
            let n = buf.len().min(self.good);
            buf[..n].fill(0xA5);
            self.good -= n;
            Ok(n)
        }
    }

    /// Interrupts every other call
    struct Flaky<T> {
        inner: T,
        tick: bool,
    }

    impl<T: Read> Read for Flaky<T> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.tick = !self.tick;
            if self.tick {
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.inner.read(buf)
        }
    }

    impl<T: Write> Write for Flaky<T> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.tick = !self.tick;
            if self.tick {
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    struct BrokenFlush(Vec<u8>);

    impl Write for BrokenFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_copy_identical() {
        let data = pattern(10_000);
        let mut out = Vec::new();
        let stats = copier(64, 1024)
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap();
        assert_eq!(out, data);
        assert_eq!(stats.bytes_written, 10_000);
        // 1024 * 9 = 9216 <= 10000 < 10240
        assert_eq!(stats.progress_lines, 9);
    }

    #[test]
    fn test_empty_source() {
        let mut out = Vec::new();
        let stats = copier(4096, 1024 * 1024)
            .copy(Cursor::new(Vec::<u8>::new()), &mut out, 0)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(stats, CopyStats::default());
    }

    #[test]
    fn test_progress_on_exact_boundaries() {
        let data = pattern(5 * 1024 * 1024);
        let mut out = Vec::new();
        let stats = Copier::new(&FlashConfig::default())
            .unwrap()
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap();
        assert_eq!(stats.bytes_written, 5_242_880);
        assert_eq!(stats.progress_lines, 5);
        assert_eq!(out, data);
    }

    #[test]
    fn test_unaligned_chunks_still_report_each_interval() {
        // 1000-byte chunks never land exactly on a multiple of 4096
        let data = pattern(3 * 4096 + 10);
        let mut out = Vec::new();
        let stats = copier(1000, 4096)
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap();
        assert_eq!(stats.progress_lines, 3);
        assert_eq!(out, data);
    }

    #[test]
    fn test_crossed_interval() {
        assert!(!crossed_interval(0, 0, 4));
        assert!(!crossed_interval(0, 3, 4));
        assert!(crossed_interval(0, 4, 4));
        assert!(crossed_interval(3, 9, 4));
        assert!(!crossed_interval(4, 7, 4));
    }

    #[test]
    fn test_short_write_is_fatal() {
        let data = pattern(100);
        let mut out = ShortWriter {
            data: Vec::new(),
            limit: 10,
        };
        let err = copier(32, 1024)
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ShortWrite {
                expected: 32,
                written: 10
            }
        ));
        // No retry after the mismatch
        assert_eq!(out.data.len(), 10);
    }

    #[test]
    fn test_buffered_destination_absorbs_partial_writes() {
        let data = pattern(10_000);

        // Chunks smaller than the buffer: partial device writes are retried on flush
        let mut out = io::BufWriter::with_capacity(
            8192,
            ShortWriter {
                data: Vec::new(),
                limit: 100,
            },
        );
        copier(4096, 1024)
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap();
        assert_eq!(out.get_ref().data, data);

        // Chunks at least the buffer size bypass it and the mismatch is seen
        let mut out = io::BufWriter::with_capacity(
            8192,
            ShortWriter {
                data: Vec::new(),
                limit: 100,
            },
        );
        let err = copier(8192, 1024)
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ShortWrite {
                expected: 8192,
                written: 100
            }
        ));
    }

    #[test]
    fn test_read_error_is_fatal() {
        let mut out = Vec::new();
        let err = copier(16, 1024)
            .copy(FailingReader { good: 40 }, &mut out, 100)
            .unwrap_err();
        assert!(matches!(err, Error::ReadSource(_)));
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn test_flush_error_is_fatal() {
        let data = pattern(50);
        let mut out = BrokenFlush(Vec::new());
        let err = copier(16, 1024)
            .copy(Cursor::new(&data), &mut out, data.len() as u64)
            .unwrap_err();
        assert!(matches!(err, Error::Flush(_)));
        assert_eq!(out.0, data);
    }

    #[test]
    fn test_source_shrunk() {
        let data = pattern(10);
        let mut out = Vec::new();
        let err = copier(4, 1024)
            .copy(Cursor::new(&data), &mut out, 20)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SourceChanged {
                expected: 20,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_source_grown_is_capped() {
        let data = pattern(100);
        let mut out = Vec::new();
        let stats = copier(16, 1024)
            .copy(Cursor::new(&data), &mut out, 40)
            .unwrap();
        assert_eq!(stats.bytes_written, 40);
        assert_eq!(out, &data[..40]);
    }

    #[test]
    fn test_interrupted_calls_are_retried() {
        let data = pattern(300);
        let mut out = Flaky {
            inner: Vec::new(),
            tick: false,
        };
        let source = Flaky {
            inner: Cursor::new(&data),
            tick: false,
        };
        let stats = copier(64, 1024)
            .copy(source, &mut out, data.len() as u64)
            .unwrap();
        assert_eq!(stats.bytes_written, 300);
        assert_eq!(out.inner, data);
    }
}

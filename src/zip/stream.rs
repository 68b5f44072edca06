//! Forward-only reader over the members of a ZIP archive.
//!
//! The reader walks local file headers in storage order, the same order in
//! which the members were written. It never seeks: each member's payload is
//! inflated lazily while it is the current entry, and whatever the caller
//! leaves unread is skipped when the cursor advances. This makes the reader
//! usable over any [`Read`] source, including ones with no notion of
//! position.

use std::io::{self, Read};

use flate2::Crc;
use flate2::read::DeflateDecoder;
use log::trace;

use crate::error::{Error, Result};

use super::structures::{
    CDFH_SIGNATURE, CompressionMethod, EOCD_SIGNATURE, FLAG_DATA_DESCRIPTOR, FLAG_ENCRYPTED,
    LFH_SIGNATURE, LocalFileHeader,
};

/// Streaming ZIP member reader.
///
/// Entries are enumerated exactly once, in storage order, via
/// [`next_entry`](Self::next_entry). At most one entry's content stream is
/// readable at a time: a [`ZipEntry`] mutably borrows the stream, so
/// advancing the cursor or closing the archive while an entry is alive is
/// rejected at compile time.
///
/// ```compile_fail
/// use std::io::{Cursor, Read};
///
/// let mut stream = zipscan::ZipStream::open(Cursor::new(Vec::<u8>::new())).unwrap();
/// let mut first = stream.next_entry().unwrap().unwrap();
/// stream.next_entry().unwrap(); // error: `stream` is still borrowed by `first`
/// let mut content = Vec::new();
/// first.read_to_end(&mut content).unwrap();
/// ```
///
/// The same discipline covers use-after-close:
///
/// ```compile_fail
/// use std::io::{Cursor, Read};
///
/// let mut stream = zipscan::ZipStream::open(Cursor::new(Vec::<u8>::new())).unwrap();
/// let mut entry = stream.next_entry().unwrap().unwrap();
/// stream.close(); // error: cannot move `stream` while `entry` borrows it
/// let mut content = Vec::new();
/// entry.read_to_end(&mut content).unwrap();
/// ```
///
/// A single `ZipStream` must not be shared between threads; independent
/// streams over independent sources are fine.
#[derive(Debug)]
pub struct ZipStream<R: Read> {
    source: Counted<R>,
    /// Signature bytes validated by `open` but not yet interpreted.
    peeked: Option<[u8; 4]>,
    /// Payload extent (start position, compressed length) of the most
    /// recently returned entry.
    current: Option<(u64, u64)>,
    /// Set once the central directory is reached; further `next_entry`
    /// calls keep returning `Ok(None)`.
    finished: bool,
}

impl<R: Read> ZipStream<R> {
    /// Open a streaming reader over `source`.
    ///
    /// Fails with [`Error::Format`] when the source does not start with a
    /// local file header or end-of-central-directory signature. An archive
    /// whose first record is the EOCD is valid and has no members.
    pub fn open(source: R) -> Result<Self> {
        let mut source = Counted {
            inner: source,
            pos: 0,
        };

        let mut signature = [0u8; 4];
        source.read_exact(&mut signature).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::Format("source is shorter than a record signature".to_string())
            } else {
                Error::Io(e)
            }
        })?;

        if signature != LFH_SIGNATURE && signature != EOCD_SIGNATURE {
            return Err(Error::Format(format!(
                "no ZIP record signature at start of source (got {signature:02x?})"
            )));
        }

        Ok(Self {
            source,
            peeked: Some(signature),
            current: None,
            finished: false,
        })
    }

    /// Advance to the next member, in storage order.
    ///
    /// Any unread remainder of the previous entry's payload is skipped
    /// first. Returns `Ok(None)` once the central directory is reached;
    /// calling again after that keeps returning `Ok(None)`.
    pub fn next_entry(&mut self) -> Result<Option<ZipEntry<'_, R>>> {
        if self.finished {
            return Ok(None);
        }

        self.skip_current()?;

        let signature = match self.peeked.take() {
            Some(signature) => signature,
            None => {
                let mut signature = [0u8; 4];
                self.source.read_exact(&mut signature).map_err(|e| {
                    if e.kind() == io::ErrorKind::UnexpectedEof {
                        Error::Format(
                            "archive ended without a central directory record".to_string(),
                        )
                    } else {
                        Error::Io(e)
                    }
                })?;
                signature
            }
        };

        if signature == CDFH_SIGNATURE || signature == EOCD_SIGNATURE {
            // Member data ends where the directory begins
            self.finished = true;
            return Ok(None);
        }
        if signature != LFH_SIGNATURE {
            return Err(Error::Format(format!(
                "unexpected record signature {signature:02x?}"
            )));
        }

        let header = LocalFileHeader::read_after_signature(&mut self.source)?;

        if header.flags & FLAG_ENCRYPTED != 0 {
            return Err(Error::Unsupported(format!(
                "entry {} is encrypted",
                header.file_name
            )));
        }
        if header.flags & FLAG_DATA_DESCRIPTOR != 0 {
            // Sizes live after the payload, which a forward-only reader
            // cannot know in advance
            return Err(Error::Unsupported(format!(
                "entry {} uses a data descriptor",
                header.file_name
            )));
        }
        if let CompressionMethod::Unknown(method) = header.compression_method {
            return Err(Error::Unsupported(format!(
                "compression method {} for entry {}",
                method, header.file_name
            )));
        }

        trace!(
            "entry {:?}: {} -> {} bytes, method {}",
            header.file_name,
            header.compressed_size,
            header.uncompressed_size,
            header.compression_method.as_u16()
        );

        self.current = Some((self.source.pos, header.compressed_size));

        let payload = (&mut self.source).take(header.compressed_size);
        let reader = match header.compression_method {
            CompressionMethod::Deflate => EntryReader::Deflated(DeflateDecoder::new(payload)),
            _ => EntryReader::Stored(payload),
        };

        Ok(Some(ZipEntry {
            header,
            reader,
            produced: 0,
            crc: Crc::new(),
            verified: false,
        }))
    }

    /// Release the underlying source.
    ///
    /// Dropping the stream is equivalent; this form marks the release point
    /// explicitly. Nothing can fail here, so an earlier in-progress error
    /// is never masked.
    pub fn close(self) {}

    /// Skip whatever the caller left unread of the current entry's payload.
    fn skip_current(&mut self) -> Result<()> {
        let Some((start, compressed_size)) = self.current.take() else {
            return Ok(());
        };

        // Entry reads go through a `Take` bounded at the payload, so the
        // consumed count can never exceed the compressed size.
        let consumed = self.source.pos - start;
        let remaining = compressed_size - consumed;
        if remaining == 0 {
            return Ok(());
        }

        trace!("skipping {remaining} unread payload bytes");
        let skipped = io::copy(&mut (&mut self.source).take(remaining), &mut io::sink())?;
        if skipped < remaining {
            return Err(Error::Format(
                "archive truncated inside member payload".to_string(),
            ));
        }
        Ok(())
    }
}

/// One archive member, borrowed from its [`ZipStream`].
///
/// Implements [`Read`] over the member's uncompressed payload. The stream
/// is read-once and bounded: after the declared uncompressed size has been
/// produced, reads return `Ok(0)`, and the CRC-32 recorded in the header is
/// verified against the bytes that were actually produced.
#[derive(Debug)]
pub struct ZipEntry<'a, R: Read> {
    header: LocalFileHeader,
    reader: EntryReader<'a, R>,
    produced: u64,
    crc: Crc,
    verified: bool,
}

#[derive(Debug)]
enum EntryReader<'a, R: Read> {
    Stored(io::Take<&'a mut Counted<R>>),
    Deflated(DeflateDecoder<io::Take<&'a mut Counted<R>>>),
}

impl<R: Read> ZipEntry<'_, R> {
    /// Stored member name, exactly as recorded in the archive.
    pub fn name(&self) -> &str {
        &self.header.file_name
    }

    /// Whether this entry marks a directory.
    pub fn is_dir(&self) -> bool {
        self.header.is_directory()
    }

    /// Uncompressed payload size declared in the header.
    pub fn size(&self) -> u64 {
        self.header.uncompressed_size
    }

    /// Compressed payload size declared in the header.
    pub fn compressed_size(&self) -> u64 {
        self.header.compressed_size
    }

    /// Compression method of the payload.
    pub fn compression(&self) -> CompressionMethod {
        self.header.compression_method
    }

    /// Read the remaining payload to its end.
    ///
    /// Same as [`Read::read_to_end`] but reports the crate's typed error
    /// kinds directly instead of wrapping them in [`io::Error`].
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let remaining = (self.header.uncompressed_size - self.produced) as usize;
        let mut content = Vec::with_capacity(remaining);
        let mut chunk = [0u8; 8 * 1024];
        loop {
            match self.read_typed(&mut chunk)? {
                0 => return Ok(content),
                n => content.extend_from_slice(&chunk[..n]),
            }
        }
    }

    fn read_typed(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.header.uncompressed_size - self.produced;
        if remaining == 0 {
            self.verify_crc()?;
            return Ok(0);
        }

        let capped = remaining.min(buf.len() as u64) as usize;
        let result = match &mut self.reader {
            EntryReader::Stored(r) => r.read(&mut buf[..capped]),
            EntryReader::Deflated(r) => r.read(&mut buf[..capped]),
        };
        let read = result.map_err(|e| self.read_failure(e))?;

        if read == 0 {
            return Err(Error::Decode {
                name: self.header.file_name.clone(),
                reason: format!(
                    "payload ended after {} of {} bytes",
                    self.produced, self.header.uncompressed_size
                ),
            });
        }

        self.crc.update(&buf[..read]);
        self.produced += read as u64;
        if self.produced == self.header.uncompressed_size {
            self.verify_crc()?;
        }
        Ok(read)
    }

    fn verify_crc(&mut self) -> Result<()> {
        if self.verified {
            return Ok(());
        }
        self.verified = true;
        if self.crc.sum() != self.header.crc32 {
            return Err(Error::Decode {
                name: self.header.file_name.clone(),
                reason: format!(
                    "CRC-32 mismatch: header says {:08x}, payload sums to {:08x}",
                    self.header.crc32,
                    self.crc.sum()
                ),
            });
        }
        Ok(())
    }

    fn read_failure(&self, err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                Error::Decode {
                    name: self.header.file_name.clone(),
                    reason: err.to_string(),
                }
            }
            _ => Error::Io(err),
        }
    }
}

impl<R: Read> Read for ZipEntry<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.read_typed(buf).map_err(io::Error::from)
    }
}

/// `Read` adapter that tracks how many bytes have been consumed, so a
/// partially read entry can be skipped precisely when the cursor advances.
#[derive(Debug)]
struct Counted<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.pos += read as u64;
        Ok(read)
    }
}

//! ZIP archive reading, forward-only.
//!
//! This module provides a streaming reader over ZIP archive members,
//! suitable for sources that can only be read front to back.
//!
//! ## Architecture
//!
//! The module is organized into two components:
//!
//! - `structures`: data structures for the ZIP format elements a
//!   sequential reader sees (local file headers, signatures, flag bits)
//! - [`ZipStream`]: the cursor that walks those records and hands out one
//!   member content stream at a time
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the file front to back: each local file header
//! is parsed as it is met, its payload is streamed out, and the scan ends
//! when the Central Directory begins. Nothing is ever seeked, so the source
//! only needs to implement [`std::io::Read`].
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - STORED (no compression) method
//! - DEFLATE compression method
//! - CRC-32 verification of fully read members
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No entries relying on data descriptors (general-purpose flag bit 3),
//!   whose sizes only appear after the payload
//! - No BZIP2, LZMA, or other compression methods

mod stream;
mod structures;

pub use stream::{ZipEntry, ZipStream};
pub use structures::CompressionMethod;

//! # zipscan
//!
//! Streaming reader for locating and extracting named members of ZIP
//! archives.
//!
//! This library walks an archive's entries lazily, in storage order, from
//! any [`std::io::Read`] source - an opened file, an in-memory buffer, a
//! pipe. It is aimed at the "is this member in the archive, and what does
//! it contain?" class of tasks, such as verifying bundled fixtures, rather
//! than at bulk extraction to disk.
//!
//! ## Features
//!
//! - Forward-only scanning: no seeking, no up-front central directory read
//! - Selective extraction by exact member name, driven by a [`MatchSet`]
//! - STORED and DEFLATE members, with CRC-32 verification on full reads
//! - At most one live content stream at a time, enforced at compile time
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use zipscan::{MatchSet, ZipStream};
//!
//! fn main() -> zipscan::Result<()> {
//!     // Check which of the expected members the archive contains
//!     let wanted: MatchSet = ["report.csv", "report.pdf"].into_iter().collect();
//!     let stream = ZipStream::open(File::open("bundle.zip")?)?;
//!     let found = stream.found_names(&wanted)?;
//!     for name in &found {
//!         println!("{name}");
//!     }
//!
//!     // Pull one member's uncompressed content into memory
//!     let stream = ZipStream::open(File::open("bundle.zip")?)?;
//!     let content = stream.read_member("report.csv")?;
//!     println!("{} bytes", content.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod scan;
pub mod zip;

pub use crate::error::{Error, Result};
pub use crate::scan::MatchSet;
pub use crate::zip::{CompressionMethod, ZipEntry, ZipStream};

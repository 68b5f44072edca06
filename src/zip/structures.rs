use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Local File Header (LFH) - precedes each member's payload
pub const LFH_SIGNATURE: [u8; 4] = *b"PK\x03\x04";

/// Central Directory File Header (CDFH) - first record past the member
/// data, so meeting it in storage order means the members are exhausted
pub const CDFH_SIGNATURE: [u8; 4] = *b"PK\x01\x02";

/// End of Central Directory (EOCD) - the only record in an empty archive
pub const EOCD_SIGNATURE: [u8; 4] = *b"PK\x05\x06";

/// General-purpose flag bit 0: the member payload is encrypted.
pub const FLAG_ENCRYPTED: u16 = 1 << 0;

/// General-purpose flag bit 3: sizes and CRC-32 live in a data descriptor
/// after the payload instead of in the header.
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// Parsed local file header for one archive member.
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub file_name: String,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
}

impl LocalFileHeader {
    /// Fixed-size portion of the header following the 4-byte signature.
    pub const FIXED_SIZE: usize = 26;

    /// Parse a local file header whose signature has already been consumed,
    /// leaving the reader positioned at the start of the member payload.
    pub fn read_after_signature<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fixed = [0u8; Self::FIXED_SIZE];
        reader
            .read_exact(&mut fixed)
            .map_err(|e| truncated("local file header", e))?;

        let mut cursor = Cursor::new(&fixed[..]);
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        reader
            .read_exact(&mut file_name_bytes)
            .map_err(|e| truncated("member name", e))?;
        // Use lossy conversion to handle non-UTF8 filenames gracefully
        let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();

        // A sequential reader needs nothing from the extra field; skip it
        let mut extra = vec![0u8; extra_field_length as usize];
        reader
            .read_exact(&mut extra)
            .map_err(|e| truncated("extra field", e))?;

        Ok(Self {
            file_name,
            flags,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
        })
    }

    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.file_name.ends_with('/')
    }
}

fn truncated(what: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::Format(format!("archive truncated inside {what}"))
    } else {
        Error::Io(err)
    }
}

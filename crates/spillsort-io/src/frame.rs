//! Run file header and framing constants.
//!
//! Layout on disk:
//! [ magic: u32 ][ version: u16 ][ codec: u8 ][ reserved: u8 ]
//! then, through the codec stream:
//! [ key_len: u32 ][ val_len: u32 ][ key bytes ][ val bytes ]  (per record)
//! [ sentinel: u32 = 0xFFFF_FFFF ][ blake3 checksum: 32 bytes ]  (footer)
//!
//! The header is written uncompressed so a reader can learn the codec before
//! wrapping the stream. The checksum covers every frame byte (length prefixes
//! and payloads, uncompressed), so truncation and corruption are detected
//! without any external index.

use std::io::{self, Read};

use spillsort_core::error::{Error, Result};

use crate::codec::Codec;

pub const MAGIC: u32 = 0x53504C52; // "SPLR"
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 1 + 1;

/// Key-length value marking the footer. Real keys must encode to fewer than
/// `u32::MAX` bytes; the writer enforces this.
pub const SENTINEL: u32 = u32::MAX;
pub const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct RunHeader {
    pub codec: Codec,
}

impl RunHeader {
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        out[4..6].copy_from_slice(&VERSION.to_le_bytes());
        out[6] = self.codec as u8;
        // out[7] reserved
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::corrupt("short run file header"));
        }
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let version = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
        if magic != MAGIC {
            return Err(Error::corrupt("not a run file (bad magic)"));
        }
        if version != VERSION {
            return Err(Error::corrupt(format!(
                "unsupported run file version {version}"
            )));
        }
        let codec = Codec::from_u8(bytes[6])?;
        Ok(Self { codec })
    }
}

/// `read_exact` that reports mid-frame truncation as corrupt run data rather
/// than a bare I/O error.
pub fn read_exact_frame(r: &mut impl Read, buf: &mut [u8]) -> Result<()> {
    match r.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(Error::corrupt("truncated run file"))
        }
        Err(e) => Err(Error::Io(e)),
    }
}

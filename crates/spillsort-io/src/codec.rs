//! Compression facade for run files (feature-gated).
//!
//! Keep this tiny and synchronous. We only support `None`, `Zstd`, `Lz4`.
//! The codec wraps the whole frame stream, so the footer checksum always
//! covers the uncompressed frame bytes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use spillsort_core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Codec {
    #[default]
    None = 0,
    Zstd = 1,
    Lz4 = 2,
}

impl Codec {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Codec::None),
            1 => Ok(Codec::Zstd),
            2 => Ok(Codec::Lz4),
            _ => Err(Error::corrupt(format!("unknown codec byte {v}"))),
        }
    }
}

/// Write half of a run file, dispatched on codec.
pub enum FrameSink {
    Plain(BufWriter<File>),
    #[cfg(feature = "zstd")]
    Zstd(zstd::stream::write::Encoder<'static, BufWriter<File>>),
    #[cfg(feature = "lz4")]
    Lz4(lz4_flex::frame::FrameEncoder<BufWriter<File>>),
}

impl FrameSink {
    pub fn new(codec: Codec, file: BufWriter<File>) -> Result<Self> {
        match codec {
            Codec::None => Ok(FrameSink::Plain(file)),
            Codec::Zstd => {
                #[cfg(feature = "zstd")]
                {
                    let lvl = 1; // fast compression for temp data
                    let enc = zstd::stream::write::Encoder::new(file, lvl)
                        .map_err(Error::Io)?;
                    Ok(FrameSink::Zstd(enc))
                }
                #[cfg(not(feature = "zstd"))]
                {
                    Err(Error::InvalidOperation("zstd codec not compiled in".into()))
                }
            }
            Codec::Lz4 => {
                #[cfg(feature = "lz4")]
                {
                    Ok(FrameSink::Lz4(lz4_flex::frame::FrameEncoder::new(file)))
                }
                #[cfg(not(feature = "lz4"))]
                {
                    Err(Error::InvalidOperation("lz4 codec not compiled in".into()))
                }
            }
        }
    }

    /// Flush codec state and the underlying file. Must be called before any
    /// reader opens the file; drop alone does not guarantee a complete stream.
    pub fn finish(self) -> Result<()> {
        match self {
            FrameSink::Plain(mut w) => {
                w.flush()?;
                Ok(())
            }
            #[cfg(feature = "zstd")]
            FrameSink::Zstd(enc) => {
                let mut w = enc.finish()?;
                w.flush()?;
                Ok(())
            }
            #[cfg(feature = "lz4")]
            FrameSink::Lz4(enc) => {
                let mut w = enc
                    .finish()
                    .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?;
                w.flush()?;
                Ok(())
            }
        }
    }
}

impl Write for FrameSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FrameSink::Plain(w) => w.write(buf),
            #[cfg(feature = "zstd")]
            FrameSink::Zstd(w) => w.write(buf),
            #[cfg(feature = "lz4")]
            FrameSink::Lz4(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FrameSink::Plain(w) => w.flush(),
            #[cfg(feature = "zstd")]
            FrameSink::Zstd(w) => w.flush(),
            #[cfg(feature = "lz4")]
            FrameSink::Lz4(w) => w.flush(),
        }
    }
}

/// Read half of a run file, dispatched on the codec byte from the header.
pub enum FrameSource {
    Plain(BufReader<File>),
    #[cfg(feature = "zstd")]
    Zstd(zstd::stream::read::Decoder<'static, BufReader<File>>),
    #[cfg(feature = "lz4")]
    Lz4(lz4_flex::frame::FrameDecoder<BufReader<File>>),
}

impl FrameSource {
    pub fn new(codec: Codec, file: BufReader<File>) -> Result<Self> {
        match codec {
            Codec::None => Ok(FrameSource::Plain(file)),
            Codec::Zstd => {
                #[cfg(feature = "zstd")]
                {
                    let dec = zstd::stream::read::Decoder::with_buffer(file)
                        .map_err(Error::Io)?;
                    Ok(FrameSource::Zstd(dec))
                }
                #[cfg(not(feature = "zstd"))]
                {
                    Err(Error::InvalidOperation(
                        "run file uses zstd but codec not compiled in".into(),
                    ))
                }
            }
            Codec::Lz4 => {
                #[cfg(feature = "lz4")]
                {
                    Ok(FrameSource::Lz4(lz4_flex::frame::FrameDecoder::new(file)))
                }
                #[cfg(not(feature = "lz4"))]
                {
                    Err(Error::InvalidOperation(
                        "run file uses lz4 but codec not compiled in".into(),
                    ))
                }
            }
        }
    }
}

impl Read for FrameSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FrameSource::Plain(r) => r.read(buf),
            #[cfg(feature = "zstd")]
            FrameSource::Zstd(r) => r.read(buf),
            #[cfg(feature = "lz4")]
            FrameSource::Lz4(r) => r.read(buf),
        }
    }
}

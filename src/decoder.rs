//! Decoding of the two paired binary streams.
//!
//! Image stream: 4-byte magic, then big-endian `u32` count, width and height,
//! then `count` records of exactly `width * height` bytes.
//! Label stream: 4-byte magic, big-endian `u32` count, then one byte per label.

use std::io::{self, BufReader, Read};

use byteorder::{BigEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{Error, Result, Stream};

pub const IMAGES_MAGIC: u32 = 0x0000_0803;
pub const LABELS_MAGIC: u32 = 0x0000_0801;

// Records are read through a `take` adapter, so a bogus header can't force a
// huge allocation before any pixel data shows up.
const PREALLOC_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    // Reject streams whose leading marker isn't the expected magic number.
    // Off by default: the marker is consumed but not checked.
    pub strict_magic: bool,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        DecodeOptions { strict_magic: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecords {
    pub records: Vec<Vec<u8>>,
    pub width: usize,
    pub height: usize,
}

/// Both streams decoded and cross-checked, ready to be assembled into a data set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub records: Vec<Vec<u8>>,
    pub width: usize,
    pub height: usize,
    pub labels: Vec<u8>,
}

fn truncated(stream: Stream, record: Option<usize>) -> impl FnOnce(io::Error) -> Error {
    move |source| Error::TruncatedRecord {
        stream,
        record,
        source,
    }
}

fn check_magic(stream: Stream, found: u32, expected: u32, options: DecodeOptions) -> Result<()> {
    if options.strict_magic && found != expected {
        return Err(Error::BadMagic {
            stream,
            found,
            expected,
        });
    }
    Ok(())
}

pub fn decode_images<R: Read>(reader: R, options: DecodeOptions) -> Result<ImageRecords> {
    let mut r = BufReader::new(reader);
    let header = || truncated(Stream::Images, None);

    let magic = r.read_u32::<BigEndian>().map_err(header())?;
    check_magic(Stream::Images, magic, IMAGES_MAGIC, options)?;

    let count = r.read_u32::<BigEndian>().map_err(header())? as usize;
    let width = r.read_u32::<BigEndian>().map_err(header())? as usize;
    let height = r.read_u32::<BigEndian>().map_err(header())? as usize;
    debug!(magic, count, width, height, "image stream header");

    let stride = width.checked_mul(height).ok_or_else(|| {
        header()(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("record stride {}x{} overflows", width, height),
        ))
    })?;
    // Zero-byte records carry no pixel data; a count of them is a bogus header.
    if stride == 0 && count > 0 {
        return Err(header()(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} records of {}x{} pixels", count, width, height),
        )));
    }

    let mut records = Vec::new();
    for index in 0..count {
        let mut record = Vec::with_capacity(stride.min(PREALLOC_LIMIT));
        let n = r
            .by_ref()
            .take(stride as u64)
            .read_to_end(&mut record)
            .map_err(truncated(Stream::Images, Some(index)))?;
        if n < stride {
            return Err(truncated(Stream::Images, Some(index))(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, got {}", stride, n),
            )));
        }
        records.push(record);
    }

    Ok(ImageRecords {
        records,
        width,
        height,
    })
}

/// Decodes `expected` labels. A declared count other than `expected`, or bytes
/// left over after the last label, is a count mismatch.
pub fn decode_labels<R: Read>(
    reader: R,
    expected: usize,
    options: DecodeOptions,
) -> Result<Vec<u8>> {
    let mut r = BufReader::new(reader);
    let header = || truncated(Stream::Labels, None);

    let magic = r.read_u32::<BigEndian>().map_err(header())?;
    check_magic(Stream::Labels, magic, LABELS_MAGIC, options)?;

    let declared = r.read_u32::<BigEndian>().map_err(header())? as usize;
    debug!(magic, declared, expected, "label stream header");
    if declared != expected {
        return Err(Error::CountMismatch {
            images: expected,
            labels: declared,
        });
    }

    let mut labels = Vec::with_capacity(expected.min(PREALLOC_LIMIT));
    for index in 0..expected {
        labels.push(r.read_u8().map_err(truncated(Stream::Labels, Some(index)))?);
    }

    let extra = io::copy(&mut r, &mut io::sink())? as usize;
    if extra > 0 {
        return Err(Error::CountMismatch {
            images: expected,
            labels: expected + extra,
        });
    }

    Ok(labels)
}

/// Decodes the image stream, then the label stream using the image count as
/// the expected label count.
pub fn decode<I: Read, L: Read>(images: I, labels: L, options: DecodeOptions) -> Result<Decoded> {
    let ImageRecords {
        records,
        width,
        height,
    } = decode_images(images, options)?;
    let labels = decode_labels(labels, records.len(), options)?;

    Ok(Decoded {
        records,
        width,
        height,
        labels,
    })
}

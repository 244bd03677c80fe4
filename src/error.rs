use std::{fmt, io};

use thiserror::Error;

/// Which of the two paired streams an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Images,
    Labels,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Images => f.write_str("images"),
            Self::Labels => f.write_str("labels"),
        }
    }
}

/// Everything that can go wrong while turning compressed assets into a data set
/// or while writing a reconstruction grid.
#[derive(Error, Debug)]
pub enum Error {
    #[error("asset not found: {name}")]
    NotFound { name: String },

    #[error("could not decompress {name}: {source}")]
    CorruptArchive {
        name: String,
        #[source]
        source: io::Error,
    },

    // `record` is None when the header itself was short.
    #[error("truncated {stream} stream{}: {source}", record_suffix(.record))]
    TruncatedRecord {
        stream: Stream,
        record: Option<usize>,
        #[source]
        source: io::Error,
    },

    #[error("image/label count mismatch: {images} images, {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    #[error("bad magic number in {stream} stream: {found:#010x} (expected {expected:#010x})")]
    BadMagic {
        stream: Stream,
        found: u32,
        expected: u32,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

fn record_suffix(record: &Option<usize>) -> String {
    match record {
        Some(i) => format!(" at record {}", i),
        None => " in header".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

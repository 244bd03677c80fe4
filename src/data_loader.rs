use std::{
    collections::HashMap,
    fs,
    io::{self, Cursor, Read},
    path::PathBuf,
};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use super::dataset::DataSet;
use super::decoder::{self, DecodeOptions};
use super::error::{Error, Result};

const IMAGES_SUFFIX: &str = "idx3-ubyte.gz";
const LABELS_SUFFIX: &str = "idx1-ubyte.gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Training,
    Testing,
}

impl Split {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Training => "train",
            Self::Testing => "t10k",
        }
    }

    pub fn images_name(&self) -> String {
        format!("{}-images-{}", self.prefix(), IMAGES_SUFFIX)
    }

    pub fn labels_name(&self) -> String {
        format!("{}-labels-{}", self.prefix(), LABELS_SUFFIX)
    }
}

// Resolves a logical asset name to its compressed bytes.
pub trait AssetSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

impl<S: AssetSource + ?Sized> AssetSource for &S {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        (**self).fetch(name)
    }
}

/// Assets stored as files in one directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }
}

impl AssetSource for DirSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        debug!(path = %path.display(), "reading asset");
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound { name: name.into() },
            _ => Error::Io(e),
        })
    }
}

/// Assets held in memory, e.g. bytes embedded with `include_bytes!` or
/// synthetic streams built by tests.
#[derive(Default)]
pub struct MemorySource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(name.into(), bytes.into());
    }

    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        self.assets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound { name: name.into() })
    }
}

// The whole archive is inflated here so that a damaged archive surfaces as
// CorruptArchive and never as a truncated record further down.
pub fn open_gzip(name: &str, compressed: &[u8]) -> Result<impl Read> {
    let mut decoder = GzDecoder::new(compressed);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .map_err(|source| Error::CorruptArchive {
            name: name.into(),
            source,
        })?;
    Ok(Cursor::new(data))
}

/// Loads splits from an asset source.
pub struct Loader<S> {
    source: S,
    options: DecodeOptions,
}

impl<S: AssetSource> Loader<S> {
    pub fn new(source: S) -> Self {
        Loader {
            source,
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn load(&self, split: Split) -> Result<DataSet> {
        info!(split = split.prefix(), "loading data set");

        let images_name = split.images_name();
        let labels_name = split.labels_name();
        let images = open_gzip(&images_name, &self.source.fetch(&images_name)?)?;
        let labels = open_gzip(&labels_name, &self.source.fetch(&labels_name)?)?;

        let decoded = decoder::decode(images, labels, self.options)?;
        let data = DataSet::assemble(
            decoded.records,
            decoded.labels,
            decoded.width,
            decoded.height,
        )?;

        info!(
            split = split.prefix(),
            samples = data.len(),
            width = data.width(),
            height = data.height(),
            "finished loading data set"
        );
        Ok(data)
    }

    pub fn load_training(&self) -> Result<DataSet> {
        self.load(Split::Training)
    }

    pub fn load_testing(&self) -> Result<DataSet> {
        self.load(Split::Testing)
    }
}

pub fn load<S: AssetSource>(source: &S, split: Split) -> Result<DataSet> {
    Loader::new(source).load(split)
}

pub fn load_training<S: AssetSource>(source: &S) -> Result<DataSet> {
    load(source, Split::Training)
}

pub fn load_testing<S: AssetSource>(source: &S) -> Result<DataSet> {
    load(source, Split::Testing)
}

/// Returns the (training, testing) data sets stored under `data_dir`.
pub fn load_mnist(data_dir: &str) -> Result<(DataSet, DataSet)> {
    let loader = Loader::new(DirSource::new(data_dir));
    Ok((loader.load_training()?, loader.load_testing()?))
}

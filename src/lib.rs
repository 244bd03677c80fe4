pub mod data_loader;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod evaluation;
pub mod grid;
pub mod recorders;

mod common;

pub use common::{GREYSCALE_MAX, NUM_CLASSES};
pub use data_loader::{
    load, load_mnist, load_testing, load_training, AssetSource, DirSource, Loader, MemorySource,
    Split,
};
pub use dataset::{DataSet, Sample};
pub use decoder::DecodeOptions;
pub use error::{Error, Result, Stream};
pub use evaluation::{
    accuracy_histogram, num_correct, AccuracyHistogram, Classifier, EvaluationReport,
};
pub use grid::{reconstruction_grid, save_reconstruction_grid, GridLayout, Reconstructor};

use std::{io, ops::Index, slice};

use ndarray::Array2;

use super::common::{normalize, one_hot, A2, NUM_CLASSES};
use super::error::{Error, Result, Stream};

/// One labeled bitmap.
///
/// Holds the raw bytes (0 = white, 255 = black) next to their normalized
/// `pixel / 255.0` intensities, both in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pixels: Vec<u8>,
    intensities: Vec<f32>,
    label: u8,
}

impl Sample {
    fn new(pixels: Vec<u8>, label: u8) -> Self {
        let intensities = pixels.iter().map(|&p| normalize(p)).collect();
        Sample {
            pixels,
            intensities,
            label,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensities
    }

    pub fn label(&self) -> u8 {
        self.label
    }

    pub fn label_vector(&self) -> [f32; NUM_CLASSES] {
        one_hot(self.label)
    }
}

/// An immutable collection of samples sharing the same bitmap dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    samples: Vec<Sample>,
    width: usize,
    height: usize,
}

impl DataSet {
    /// Pairs record `i` with label `i`.
    ///
    /// Fails with `CountMismatch` when the two sequences differ in length, and
    /// with `TruncatedRecord` when a record is not exactly `width * height` bytes.
    pub fn assemble(
        records: Vec<Vec<u8>>,
        labels: Vec<u8>,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        if records.len() != labels.len() {
            return Err(Error::CountMismatch {
                images: records.len(),
                labels: labels.len(),
            });
        }

        let stride = width.checked_mul(height).ok_or_else(|| Error::TruncatedRecord {
            stream: Stream::Images,
            record: None,
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                format!("record stride {}x{} overflows", width, height),
            ),
        })?;
        let wrong_length = records.iter().enumerate().find(|(_, r)| r.len() != stride);
        if let Some((index, record)) = wrong_length {
            return Err(Error::TruncatedRecord {
                stream: Stream::Images,
                record: Some(index),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("record has {} bytes, stride is {}", record.len(), stride),
                ),
            });
        }

        let samples = records
            .into_iter()
            .zip(labels)
            .map(|(pixels, label)| Sample::new(pixels, label))
            .collect();

        Ok(DataSet {
            samples,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    // Bytes per record.
    pub fn stride(&self) -> usize {
        self.width * self.height
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.label).collect()
    }

    pub fn intensity_vectors(&self) -> Vec<&[f32]> {
        self.samples.iter().map(|s| s.intensities()).collect()
    }

    pub fn label_vectors(&self) -> Vec<[f32; NUM_CLASSES]> {
        self.samples.iter().map(|s| s.label_vector()).collect()
    }

    /// All intensities as an `N x (width * height)` matrix, one sample per row.
    pub fn intensity_matrix(&self) -> A2 {
        let mut m = Array2::zeros((self.len(), self.stride()));
        for (mut row, sample) in m.rows_mut().into_iter().zip(&self.samples) {
            row.iter_mut()
                .zip(sample.intensities())
                .for_each(|(dst, &v)| *dst = v);
        }
        m
    }

    /// One-hot labels as an `N x 10` matrix.
    pub fn label_matrix(&self) -> A2 {
        let mut m = Array2::zeros((self.len(), NUM_CLASSES));
        for (mut row, sample) in m.rows_mut().into_iter().zip(&self.samples) {
            row.iter_mut()
                .zip(sample.label_vector())
                .for_each(|(dst, v)| *dst = v);
        }
        m
    }
}

impl Index<usize> for DataSet {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Sample;
    type IntoIter = slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

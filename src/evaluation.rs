use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::common::NUM_CLASSES;
use super::dataset::DataSet;

/// Maps normalized intensities to a predicted digit.
pub trait Classifier {
    fn classify(&self, intensities: &[f32]) -> usize;
}

impl<F> Classifier for F
where
    F: Fn(&[f32]) -> usize,
{
    fn classify(&self, intensities: &[f32]) -> usize {
        self(intensities)
    }
}

pub fn num_correct<C: Classifier + ?Sized>(data: &DataSet, classifier: &C) -> usize {
    data.iter()
        .filter(|s| classifier.classify(s.intensities()) == s.label() as usize)
        .count()
}

/// Per-class tallies of correct predictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyHistogram {
    pub correct: [usize; NUM_CLASSES],
    pub total: [usize; NUM_CLASSES],
}

impl AccuracyHistogram {
    // Samples labeled outside 0..NUM_CLASSES are not counted.
    pub fn from_data<C: Classifier + ?Sized>(data: &DataSet, classifier: &C) -> Self {
        let mut h = Self::default();
        for sample in data {
            let label = sample.label() as usize;
            if label >= NUM_CLASSES {
                continue;
            }
            h.total[label] += 1;
            h.correct[label] += (classifier.classify(sample.intensities()) == label) as usize;
        }
        h
    }

    /// Percentage of class `class` classified correctly, `None` when the class
    /// has no samples.
    pub fn percentage(&self, class: usize) -> Option<f32> {
        match self.total.get(class) {
            Some(&total) if total > 0 => Some(100.0 * self.correct[class] as f32 / total as f32),
            _ => None,
        }
    }

    pub fn percentages(&self) -> [Option<f32>; NUM_CLASSES] {
        std::array::from_fn(|c| self.percentage(c))
    }
}

impl fmt::Display for AccuracyHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in 0..NUM_CLASSES {
            if class > 0 {
                f.write_str(", ")?;
            }
            match self.percentage(class) {
                Some(p) => write!(f, "{}: {:.2}%", class, p)?,
                None => write!(f, "{}: n/a", class)?,
            }
        }
        Ok(())
    }
}

pub fn accuracy_histogram<C>(data: &DataSet, classifier: &C) -> AccuracyHistogram
where
    C: Classifier + ?Sized,
{
    let h = AccuracyHistogram::from_data(data, classifier);
    for class in (0..NUM_CLASSES).filter(|&c| h.total[c] == 0) {
        warn!(class, "no samples for class, accuracy undefined");
    }
    h
}

/// Summary of a classifier's performance on one data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub correct: usize,
    // Fraction in [0, 1]; None for an empty data set.
    pub accuracy: Option<f32>,
    pub histogram: AccuracyHistogram,
}

impl EvaluationReport {
    pub fn evaluate<C: Classifier + ?Sized>(data: &DataSet, classifier: &C) -> Self {
        let histogram = accuracy_histogram(data, classifier);
        let correct = num_correct(data, classifier);
        let samples = data.len();

        EvaluationReport {
            samples,
            correct,
            accuracy: (samples > 0).then(|| correct as f32 / samples as f32),
            histogram,
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} correct ({})", self.correct, self.samples, self.histogram)
    }
}

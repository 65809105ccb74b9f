//! Pixel-level scoring of a detected mask against ground truth.
//!
//! A metric whose denominator is zero is undefined and reported as `None`, never as `NaN`
//! or a substituted zero.

use std::fmt;

use image::{GrayImage, Luma, RgbImage};

use crate::{
    colors::SignClass,
    error::{Result, ensure_non_empty, ensure_same_dimensions},
    morphology::{OFF, ON},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
}

impl ConfusionMatrix {
    /// Tallies every pixel position. Any non-zero value counts as on.
    pub fn from_masks(detected: &GrayImage, ground_truth: &GrayImage) -> Result<Self> {
        ensure_non_empty("detected", detected.dimensions())?;
        ensure_non_empty("ground truth", ground_truth.dimensions())?;
        ensure_same_dimensions(ground_truth.dimensions(), detected.dimensions())?;

        let mut matrix = Self::default();
        for (found, truth) in detected.pixels().zip(ground_truth.pixels()) {
            match (truth[0] != OFF, found[0] != OFF) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_negative += 1,
                (false, true) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn metrics(&self) -> Metrics {
        let tp = self.true_positive;
        let fp = self.false_positive;
        let tn = self.true_negative;
        let fn_ = self.false_negative;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = match (precision, recall) {
            (Some(_), Some(_)) => ratio(2 * tp, 2 * tp + fp + fn_),
            _ => None,
        };

        Metrics {
            precision,
            recall,
            accuracy: ratio(tp + tn, self.total()),
            specificity: ratio(tn, fp + tn),
            f1,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator != 0).then(|| numerator as f64 / denominator as f64)
}

/// Binary-classification metrics; `None` marks an undefined metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub accuracy: Option<f64>,
    pub specificity: Option<f64>,
    pub f1: Option<f64>,
}

struct MetricDisplay(Option<f64>);

impl fmt::Display for MetricDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.4}"),
            None => write!(f, "undefined"),
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision {}, recall {}, accuracy {}, specificity {}, f1 {}",
            MetricDisplay(self.precision),
            MetricDisplay(self.recall),
            MetricDisplay(self.accuracy),
            MetricDisplay(self.specificity),
            MetricDisplay(self.f1)
        )
    }
}

/// A labelled scoring result.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub label: String,
    pub confusion: ConfusionMatrix,
    pub metrics: Metrics,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.metrics)
    }
}

/// Scores `detected` against `ground_truth`. Both masks must share dimensions.
pub fn evaluate(
    detected: &GrayImage,
    ground_truth: &GrayImage,
    label: impl Into<String>,
) -> Result<Evaluation> {
    let confusion = ConfusionMatrix::from_masks(detected, ground_truth)?;
    let evaluation = Evaluation {
        label: label.into(),
        confusion,
        metrics: confusion.metrics(),
    };
    log::debug!("{evaluation} ({confusion:?})");
    Ok(evaluation)
}

/// Mask of the pixels of `ground_truth` that have exactly the color of `class`.
pub fn ground_truth_mask(ground_truth: &RgbImage, class: SignClass) -> GrayImage {
    let color = class.ground_truth_color();
    GrayImage::from_fn(ground_truth.width(), ground_truth.height(), |x, y| {
        Luma([if *ground_truth.get_pixel(x, y) == color { ON } else { OFF }])
    })
}

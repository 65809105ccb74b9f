//! Color-coded sign segmentation built on [imageproc].
//!
//! A hue model trained on a swatch localizes the sign coarsely, a lightness range isolates its
//! red body, the body's external contours are filled into a silhouette, and corner-seeded flood
//! fills split the interior into black and white classes. Each class mask can then be scored
//! against a pixel-labelled ground truth.

pub mod colors;
pub mod config;
pub mod contours;
pub mod decompose;
pub mod error;
pub mod evaluation;
pub mod histogram;
pub mod morphology;
pub mod pipeline;
pub mod rect;
pub mod segment;

pub use colors::SignClass;
pub use config::{PipelineConfig, ThresholdMode};
pub use error::{Result, SegmentationError};
pub use evaluation::{ConfusionMatrix, Evaluation, Metrics, evaluate};
pub use pipeline::{Pipeline, SignMasks, evaluate_classes};

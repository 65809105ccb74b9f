//! One parameterized run from a training swatch and a photo to per-class masks.
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use sign_segmentation::{Pipeline, PipelineConfig};
//!
//! let training = RgbImage::from_pixel(8, 8, Rgb([210, 20, 20]));
//! let photo = RgbImage::from_pixel(32, 32, Rgb([230, 240, 250]));
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let masks = pipeline.run(&training, &photo)?;
//! assert!(masks.silhouette.regions.is_empty());
//! # Ok::<(), sign_segmentation::SegmentationError>(())
//! ```

use image::{GrayImage, Rgb, RgbImage};

use crate::{
    colors::SignClass,
    config::PipelineConfig,
    contours::{self, Silhouette},
    decompose::decompose,
    error::{Result, ensure_non_empty, ensure_same_dimensions},
    evaluation::{Evaluation, evaluate, ground_truth_mask},
    histogram::{HueModel, back_projection_mask},
    morphology, segment,
};

/// Every mask and composite produced by one run, all sized like the photo.
#[derive(Debug, Clone, PartialEq)]
pub struct SignMasks {
    /// Permissive hue back-projection mask.
    pub coarse: GrayImage,
    /// Refined red-class mask.
    pub red: GrayImage,
    pub silhouette: Silhouette,
    /// The photo inside the silhouette over the background sentinel.
    pub crop: RgbImage,
    pub black: GrayImage,
    pub white: GrayImage,
}

impl SignMasks {
    pub fn mask(&self, class: SignClass) -> &GrayImage {
        match class {
            SignClass::Red => &self.red,
            SignClass::Black => &self.black,
            SignClass::White => &self.white,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validates `config` up front so that no run can fail on a tuning value.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Segments the sign in `photo` using the hue of `training`.
    ///
    /// Both images are checked before any stage runs. The run holds no state between calls,
    /// so identical inputs always produce identical masks.
    pub fn run(&self, training: &RgbImage, photo: &RgbImage) -> Result<SignMasks> {
        ensure_non_empty("training", training.dimensions())?;
        ensure_non_empty("test", photo.dimensions())?;
        let config = &self.config;

        let model = HueModel::from_training(training, config.num_bins)?;
        let coarse = back_projection_mask(photo, &model, config)?;
        let red = segment::red_mask(photo, Some(&coarse), config)?;

        let silhouette = contours::fill_silhouette(&red, config)?;
        if morphology::touches_border(&silhouette.mask) {
            log::warn!(
                "sign silhouette touches the image border; corner-seeded flood fills may \
                 treat interior pixels as exterior"
            );
        }
        let crop = contours::crop(photo, &silhouette.mask, Rgb(config.background_sentinel))?;

        let decomposition = decompose(&crop, &red, config)?;
        log::debug!(
            "run complete: {} region(s), {} red pixels",
            silhouette.regions.len(),
            morphology::count_on(&red)
        );

        Ok(SignMasks {
            coarse,
            red,
            silhouette,
            crop,
            black: decomposition.black,
            white: decomposition.white,
        })
    }
}

/// Scores the red, black and white masks of a run against one ground-truth image,
/// in that order.
pub fn evaluate_classes(masks: &SignMasks, ground_truth: &RgbImage) -> Result<Vec<Evaluation>> {
    ensure_non_empty("ground truth", ground_truth.dimensions())?;
    ensure_same_dimensions(masks.red.dimensions(), ground_truth.dimensions())?;

    SignClass::ALL
        .iter()
        .map(|&class| {
            let truth = ground_truth_mask(ground_truth, class);
            evaluate(masks.mask(class), &truth, class.label())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentationError;

    const SKY: Rgb<u8> = Rgb([230, 240, 250]);
    const RED: Rgb<u8> = Rgb([200, 30, 30]);
    const FILL: Rgb<u8> = Rgb([245, 245, 245]);
    const INK: Rgb<u8> = Rgb([15, 15, 15]);

    fn inside(x: u32, y: u32, lo: u32, hi: u32) -> bool {
        (lo..hi).contains(&x) && (lo..hi).contains(&y)
    }

    fn is_ink(x: u32, y: u32) -> bool {
        (27..33).contains(&x) && (24..36).contains(&y)
    }

    /// A 60x60 scene: red square ring 15..45 with a 5 pixel wall, white fill and an ink bar.
    fn scene() -> RgbImage {
        RgbImage::from_fn(60, 60, |x, y| {
            if !inside(x, y, 15, 45) {
                SKY
            } else if !inside(x, y, 20, 40) {
                RED
            } else if is_ink(x, y) {
                INK
            } else {
                FILL
            }
        })
    }

    fn ground_truth() -> RgbImage {
        RgbImage::from_fn(60, 60, |x, y| {
            if !inside(x, y, 15, 45) {
                Rgb([0, 0, 255])
            } else if !inside(x, y, 20, 40) {
                SignClass::Red.ground_truth_color()
            } else if is_ink(x, y) {
                SignClass::Black.ground_truth_color()
            } else {
                SignClass::White.ground_truth_color()
            }
        })
    }

    fn training() -> RgbImage {
        RgbImage::from_pixel(6, 6, Rgb([210, 20, 20]))
    }

    fn defined(metric: Option<f64>) -> f64 {
        metric.expect("metric should be defined")
    }

    #[test]
    fn run_separates_the_three_classes() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let masks = pipeline.run(&training(), &scene()).unwrap();

        assert_eq!(masks.red.get_pixel(17, 30)[0], morphology::ON);
        assert_eq!(masks.red.get_pixel(2, 2)[0], morphology::OFF);
        assert_eq!(masks.coarse.get_pixel(17, 30)[0], morphology::ON);
        assert_eq!(masks.coarse.get_pixel(2, 2)[0], morphology::OFF);

        assert_eq!(masks.silhouette.regions.len(), 1);
        assert_eq!(masks.silhouette.mask.get_pixel(30, 30)[0], morphology::ON);
        assert_eq!(*masks.crop.get_pixel(2, 2), Rgb([0, 255, 0]));
        assert_eq!(*masks.crop.get_pixel(30, 30), INK);

        assert_eq!(masks.black.get_pixel(30, 30)[0], morphology::ON);
        assert_eq!(masks.white.get_pixel(30, 30)[0], morphology::OFF);
        assert_eq!(masks.white.get_pixel(22, 30)[0], morphology::ON);
        assert_eq!(masks.black.get_pixel(22, 30)[0], morphology::OFF);
        for class in SignClass::ALL {
            assert_eq!(masks.mask(class).dimensions(), (60, 60));
        }
    }

    #[test]
    fn run_scores_well_against_ground_truth() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let masks = pipeline.run(&training(), &scene()).unwrap();
        let evaluations = evaluate_classes(&masks, &ground_truth()).unwrap();

        let labels: Vec<_> = evaluations.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["red", "black", "white"]);
        for evaluation in &evaluations {
            assert_eq!(evaluation.confusion.total(), 60 * 60);
        }

        let red = evaluations[0].metrics;
        assert_eq!(defined(red.recall), 1.0);
        assert!(defined(red.precision) > 0.85);

        let black = evaluations[1].metrics;
        assert!(defined(black.f1) > 0.95);

        let white = evaluations[2].metrics;
        assert_eq!(defined(white.precision), 1.0);
        // Closing the red body rounds off the inner corners of the fill.
        assert!(defined(white.recall) > 0.8);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let first = pipeline.run(&training(), &scene()).unwrap();
        let second = pipeline.run(&training(), &scene()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_inputs_fail_before_any_stage() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        assert!(matches!(
            pipeline.run(&RgbImage::new(0, 0), &scene()),
            Err(SegmentationError::EmptyImage("training"))
        ));
        assert!(matches!(
            pipeline.run(&training(), &RgbImage::new(10, 0)),
            Err(SegmentationError::EmptyImage("test"))
        ));

        let bad = PipelineConfig {
            num_bins: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Pipeline::new(bad),
            Err(SegmentationError::InvalidHistogramBins(0))
        ));
    }

    #[test]
    fn ground_truth_must_match_the_photo() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let masks = pipeline.run(&training(), &scene()).unwrap();
        assert!(matches!(
            evaluate_classes(&masks, &RgbImage::new(59, 60)),
            Err(SegmentationError::DimensionMismatch { .. })
        ));
    }
}

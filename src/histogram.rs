//! Hue histogram model and its back-projection onto a test photo.

use image::{GrayImage, Luma, RgbImage};

use crate::{
    colors::{HUE_RANGE, hue_channel},
    config::PipelineConfig,
    error::{Result, SegmentationError, ensure_non_empty},
    morphology,
};

/// Min-max normalized hue histogram built from a training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct HueModel {
    bins: Vec<f32>,
}

impl HueModel {
    /// Builds the histogram of the training sample's hue channel over `num_bins` uniform bins
    /// spanning `[0, 180)`, rescaled so the fullest bin is 255 and the emptiest is 0.
    ///
    /// A flat histogram cannot be rescaled and maps every bin to 0.
    pub fn from_training(training: &RgbImage, num_bins: usize) -> Result<Self> {
        if num_bins < 2 {
            return Err(SegmentationError::InvalidHistogramBins(num_bins));
        }
        ensure_non_empty("training", training.dimensions())?;

        let hue = hue_channel(training);
        let mut counts = vec![0u32; num_bins];
        for pixel in hue.pixels() {
            counts[bin_of(pixel[0], num_bins)] += 1;
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        let min = counts.iter().copied().min().unwrap_or(0);
        let bins = if max == min {
            log::warn!("hue histogram is flat across {num_bins} bins; model scores every hue 0");
            vec![0.0; num_bins]
        } else {
            let scale = 255.0 / (max - min) as f32;
            counts.iter().map(|&c| (c - min) as f32 * scale).collect()
        };
        log::debug!("hue model bins: {bins:?}");

        Ok(Self { bins })
    }

    /// The normalized bin values, each in `[0, 255]`.
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// The normalized value of the bin `hue` falls into.
    pub fn score(&self, hue: u8) -> f32 {
        self.bins[bin_of(hue, self.bins.len())]
    }
}

fn bin_of(hue: u8, num_bins: usize) -> usize {
    (usize::from(hue) * num_bins / usize::from(HUE_RANGE)).min(num_bins - 1)
}

/// Scores every pixel of `image` by the model value of its hue.
pub fn back_project(image: &RgbImage, model: &HueModel) -> GrayImage {
    let hue = hue_channel(image);
    GrayImage::from_fn(hue.width(), hue.height(), |x, y| {
        let score = model.score(hue.get_pixel(x, y)[0]);
        Luma([score.round().clamp(0.0, 255.0) as u8])
    })
}

/// Coarse, deliberately permissive region mask from hue back-projection.
///
/// The probability map is binarized, dilated and optionally closed with disks.
pub fn back_projection_mask(
    image: &RgbImage,
    model: &HueModel,
    config: &PipelineConfig,
) -> Result<GrayImage> {
    ensure_non_empty("test", image.dimensions())?;

    let probability = back_project(image, model);
    let (mask, level) = morphology::binarize(&probability, config.back_projection_threshold);
    log::debug!("back projection binarized at level {level}");

    let mut mask = morphology::dilate_disk(&mask, config.back_projection_dilate_radius);
    if let Some(radius) = config.back_projection_close_radius {
        mask = morphology::close_disk(&mask, radius);
    }
    log::debug!(
        "back projection mask covers {} pixels",
        morphology::count_on(&mask)
    );
    Ok(mask)
}

//! Lightness-based isolation of the red sign body.

use image::{GrayImage, Rgb, RgbImage, imageops};

use crate::{
    colors::lightness_channel,
    config::{PipelineConfig, ThresholdMode},
    error::{Result, ensure_non_empty, ensure_same_dimensions},
    morphology,
};

/// Keeps the pixels of `image` where `mask` is on and zeroes the rest.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if mask.get_pixel(x, y)[0] != morphology::OFF {
            *image.get_pixel(x, y)
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Refined red-class mask of `image`.
///
/// The HLS lightness channel is kept within `config.lightness_range` and closed, the photo is
/// masked with it and binarized, then optionally intersected with `coarse` (the
/// back-projection mask, when `config.fuse_back_projection` is set) and closed once more.
pub fn red_mask(
    image: &RgbImage,
    coarse: Option<&GrayImage>,
    config: &PipelineConfig,
) -> Result<GrayImage> {
    ensure_non_empty("test", image.dimensions())?;

    let (low, high) = config.lightness_range;
    let body = morphology::in_range(&lightness_channel(image), low, high);
    let body = morphology::close_disk(&body, config.segment_close_radius);

    let masked = apply_mask(image, &body);
    let (mut mask, _) = morphology::binarize(
        &imageops::grayscale(&masked),
        ThresholdMode::Fixed(config.segment_binarize_level),
    );

    if config.fuse_back_projection
        && let Some(coarse) = coarse
    {
        ensure_same_dimensions(mask.dimensions(), coarse.dimensions())?;
        mask = morphology::and(&mask, coarse);
    }

    if let Some(radius) = config.segment_refine_radius {
        mask = morphology::close_disk(&mask, radius);
    }

    let on = morphology::count_on(&mask);
    if on == 0 {
        log::warn!("refined red mask is empty");
    } else {
        log::debug!("refined red mask covers {on} pixels");
    }
    Ok(mask)
}

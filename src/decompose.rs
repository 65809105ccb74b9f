//! Splits a sign's interior into black-class and white-class masks.
//!
//! Every pass seeds a flood fill at the top-left pixel, which must lie outside the sign:
//! whatever is reachable from there is exterior. A sign touching the image border breaks
//! that assumption and interior pixels get misclassified as exterior.

use image::{GrayImage, Luma, Rgb, RgbImage, imageops};

use crate::{
    config::{PipelineConfig, ThresholdMode},
    error::{Result, ensure_non_empty, ensure_same_dimensions},
    morphology::{self, OFF, flood_fill_mut},
};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// The interior of a sign split by color class.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub black: GrayImage,
    pub white: GrayImage,
    /// Pixels enclosed by the sign body, both classes together.
    pub interior: GrayImage,
}

/// Rescales all channel values of `image` so the smallest becomes 0 and the largest 255.
fn normalize_min_max(image: &RgbImage) -> RgbImage {
    let min = image.as_raw().iter().copied().min().unwrap_or(0);
    let max = image.as_raw().iter().copied().max().unwrap_or(0);
    if max == min {
        return image.clone();
    }
    let scale = 255.0 / f32::from(max - min);
    let mut normalized = image.clone();
    for value in normalized.iter_mut() {
        *value = (f32::from(*value - min) * scale).round() as u8;
    }
    normalized
}

/// Pixels enclosed by the sign body in `coverage`, as a mask.
///
/// The composite is laid over black where the body is, inverted so that everything outside the
/// body is lit, and the part reachable from the corner is switched off again.
fn interior_areas(
    composite: &RgbImage,
    coverage: &GrayImage,
    config: &PipelineConfig,
) -> GrayImage {
    let body = RgbImage::from_fn(composite.width(), composite.height(), |x, y| {
        if coverage.get_pixel(x, y)[0] != OFF {
            *composite.get_pixel(x, y)
        } else {
            BLACK
        }
    });
    let gray = imageops::grayscale(&normalize_min_max(&body));
    let mut inner = morphology::binarize_inverted(&gray, config.coverage_level);
    flood_fill_mut(&mut inner, 0, 0, Luma([OFF]));
    inner
}

/// Splits the interior of the sign in `composite` into black and white masks.
///
/// `composite` is the crop produced by [`crate::contours::crop`], `red_mask` the refined
/// red-class mask. Both must share dimensions.
pub fn decompose(
    composite: &RgbImage,
    red_mask: &GrayImage,
    config: &PipelineConfig,
) -> Result<Decomposition> {
    ensure_non_empty("composite", composite.dimensions())?;
    ensure_same_dimensions(composite.dimensions(), red_mask.dimensions())?;

    let sentinel = Rgb(config.background_sentinel);
    let (coverage, _) =
        morphology::binarize(red_mask, ThresholdMode::Fixed(config.coverage_level));
    let interior = interior_areas(composite, &coverage, config);
    log::debug!(
        "sign interior covers {} pixels",
        morphology::count_on(&interior)
    );

    // Body in white, interior in photo colors, everything else black.
    let mut canvas = RgbImage::from_fn(composite.width(), composite.height(), |x, y| {
        if interior.get_pixel(x, y)[0] != OFF {
            *composite.get_pixel(x, y)
        } else if coverage.get_pixel(x, y)[0] != OFF {
            WHITE
        } else {
            BLACK
        }
    });

    flood_fill_mut(&mut canvas, 0, 0, sentinel);
    let dark = morphology::binarize_inverted(&imageops::grayscale(&canvas), config.black_level);
    let black = morphology::close_disk(&dark, config.black_close_radius);
    let black_overlay = morphology::invert(&black);

    flood_fill_mut(&mut canvas, 0, 0, BLACK);
    // The body was painted white only to keep it out of the black class; it must not pull the
    // Otsu level above a mid-gray fill.
    let mut gray = imageops::grayscale(&canvas);
    for (x, y, pixel) in gray.enumerate_pixels_mut() {
        if interior.get_pixel(x, y)[0] == OFF && coverage.get_pixel(x, y)[0] != OFF {
            *pixel = Luma([0]);
        }
    }
    let (bright, level) = morphology::binarize(&gray, ThresholdMode::Otsu);
    log::debug!("white class candidates split at level {level}");

    // Light pixels enclosed by the black class that the global split missed.
    let mut enclosed = black_overlay;
    flood_fill_mut(&mut enclosed, 0, 0, Luma([OFF]));
    let white = morphology::and(&morphology::or(&bright, &enclosed), &interior);

    log::debug!(
        "decomposed sign into {} black and {} white pixels",
        morphology::count_on(&black),
        morphology::count_on(&white)
    );
    Ok(Decomposition {
        black,
        white,
        interior,
    })
}

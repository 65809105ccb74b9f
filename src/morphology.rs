//! Mask cleaning and mask algebra shared by the pipeline stages.
//!
//! Masks are [`GrayImage`]s holding 0 (off) or 255 (on). The structuring element for every
//! morphological operation is a disk, i.e. the L2 ball of the given radius.

use image::{GrayImage, ImageBuffer, Luma, Pixel};
use imageproc::{
    contrast::{ThresholdType, otsu_level, threshold},
    distance_transform::Norm,
    morphology,
};

use crate::config::ThresholdMode;

pub const ON: u8 = 255;
pub const OFF: u8 = 0;

/// Binarizes `image`, returning the mask and the level that was applied.
///
/// Pixels strictly above the level become [`ON`].
pub fn binarize(image: &GrayImage, mode: ThresholdMode) -> (GrayImage, u8) {
    let level = match mode {
        ThresholdMode::Fixed(level) => level,
        ThresholdMode::Otsu => otsu_level(image),
    };
    (threshold(image, level, ThresholdType::Binary), level)
}

/// Pixels at or below `level` become [`ON`], all others [`OFF`].
pub fn binarize_inverted(image: &GrayImage, level: u8) -> GrayImage {
    threshold(image, level, ThresholdType::BinaryInverted)
}

/// Pixels inside the inclusive range `[low, high]` become [`ON`].
pub fn in_range(image: &GrayImage, low: u8, high: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y)[0];
        Luma([if (low..=high).contains(&value) { ON } else { OFF }])
    })
}

/// Dilates with a disk of the given radius. Radius 0 is the identity.
pub fn dilate_disk(mask: &GrayImage, radius: u8) -> GrayImage {
    morphology::dilate(mask, Norm::L2, radius)
}

/// Closes (dilate then erode) with a disk of the given radius. Radius 0 is the identity.
pub fn close_disk(mask: &GrayImage, radius: u8) -> GrayImage {
    morphology::close(mask, Norm::L2, radius)
}

pub fn invert(mask: &GrayImage) -> GrayImage {
    map_mask(mask, |on| !on)
}

pub fn and(a: &GrayImage, b: &GrayImage) -> GrayImage {
    zip_masks(a, b, |x, y| x && y)
}

pub fn or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    zip_masks(a, b, |x, y| x || y)
}

fn map_mask(mask: &GrayImage, f: impl Fn(bool) -> bool) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if f(mask.get_pixel(x, y)[0] != OFF) { ON } else { OFF }])
    })
}

fn zip_masks(a: &GrayImage, b: &GrayImage, f: impl Fn(bool, bool) -> bool) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let on = f(a.get_pixel(x, y)[0] != OFF, b.get_pixel(x, y)[0] != OFF);
        Luma([if on { ON } else { OFF }])
    })
}

/// Number of non-zero pixels.
pub fn count_on(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != OFF).count()
}

/// Whether any non-zero pixel lies on the outermost row or column.
pub fn touches_border(mask: &GrayImage) -> bool {
    let (width, height) = mask.dimensions();
    mask.enumerate_pixels()
        .any(|(x, y, p)| p[0] != OFF && (x == 0 || y == 0 || x + 1 == width || y + 1 == height))
}

/// Replaces the 4-connected region of pixels equal to the seed pixel with `fill`.
///
/// Does nothing when the seed lies outside the image or already holds `fill`.
pub fn flood_fill_mut<P>(image: &mut ImageBuffer<P, Vec<P::Subpixel>>, x: u32, y: u32, fill: P)
where
    P: Pixel + PartialEq,
{
    let (width, height) = image.dimensions();
    if x >= width || y >= height {
        return;
    }
    let target = *image.get_pixel(x, y);
    if target == fill {
        return;
    }

    let mut stack = vec![(x, y)];
    while let Some((x, y)) = stack.pop() {
        if *image.get_pixel(x, y) != target {
            continue;
        }
        image.put_pixel(x, y, fill);
        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn square_mask(size: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let inside = (from..to).contains(&x) && (from..to).contains(&y);
            Luma([if inside { ON } else { OFF }])
        })
    }

    #[test]
    fn fixed_binarize_is_strictly_above() {
        let image = GrayImage::from_raw(4, 1, vec![0, 219, 220, 221]).unwrap();
        let (mask, level) = binarize(&image, ThresholdMode::Fixed(220));
        assert_eq!(level, 220);
        assert_eq!(mask.into_raw(), vec![OFF, OFF, OFF, ON]);
    }

    #[test]
    fn otsu_binarize_separates_two_populations() {
        let image = GrayImage::from_fn(10, 1, |x, _| Luma([if x < 5 { 20 } else { 200 }]));
        let (mask, level) = binarize(&image, ThresholdMode::Otsu);
        assert!((20..200).contains(&level));
        assert_eq!(count_on(&mask), 5);
        assert!(mask.get_pixel(9, 0)[0] == ON && mask.get_pixel(0, 0)[0] == OFF);
    }

    #[test]
    fn inverted_binarize_keeps_dark_pixels() {
        let image = GrayImage::from_raw(3, 1, vec![10, 85, 86]).unwrap();
        assert_eq!(binarize_inverted(&image, 85).into_raw(), vec![ON, ON, OFF]);
    }

    #[test]
    fn in_range_is_inclusive() {
        let image = GrayImage::from_raw(5, 1, vec![74, 75, 120, 180, 181]).unwrap();
        assert_eq!(
            in_range(&image, 75, 180).into_raw(),
            vec![OFF, ON, ON, ON, OFF]
        );
    }

    #[test]
    fn closing_bridges_a_narrow_gap() {
        // Two bars separated by a one-pixel column.
        let mask = GrayImage::from_fn(15, 9, |x, y| {
            Luma([if (2..7).contains(&y) && x != 7 && (2..13).contains(&x) { ON } else { OFF }])
        });
        let closed = close_disk(&mask, 2);
        assert_eq!(closed.get_pixel(7, 4)[0], ON);
        assert_eq!(closed.get_pixel(0, 0)[0], OFF);
    }

    #[test]
    fn dilation_grows_by_the_radius() {
        let mask = square_mask(11, 5, 6);
        let grown = dilate_disk(&mask, 2);
        assert_eq!(grown.get_pixel(7, 5)[0], ON);
        assert_eq!(grown.get_pixel(8, 5)[0], OFF);
        assert_eq!(grown.get_pixel(7, 7)[0], OFF);
        assert_eq!(dilate_disk(&mask, 0), mask);
    }

    #[test]
    fn mask_algebra() {
        let a = square_mask(6, 0, 3);
        let b = square_mask(6, 2, 5);
        assert_eq!(count_on(&and(&a, &b)), 1);
        assert_eq!(count_on(&or(&a, &b)), 9 + 9 - 1);
        assert_eq!(count_on(&invert(&a)), 36 - 9);
        assert_eq!(invert(&invert(&a)), a);
    }

    #[test]
    fn border_contact_is_detected() {
        assert!(!touches_border(&square_mask(6, 1, 5)));
        assert!(touches_border(&square_mask(6, 0, 2)));
        assert!(touches_border(&square_mask(6, 4, 6)));
    }

    #[test]
    fn flood_fill_stops_at_a_closed_ring() {
        // Ring from 1..5 with a hollow 2..4 center.
        let mut mask = GrayImage::from_fn(6, 6, |x, y| {
            let ring = (1..5).contains(&x) && (1..5).contains(&y);
            let hole = (2..4).contains(&x) && (2..4).contains(&y);
            Luma([if ring && !hole { ON } else { OFF }])
        });
        flood_fill_mut(&mut mask, 0, 0, Luma([ON]));
        assert_eq!(count_on(&mask), 36 - 4);
        assert_eq!(mask.get_pixel(2, 2)[0], OFF);
    }

    #[test]
    fn flood_fill_is_four_connected_on_color() {
        let mut image = RgbImage::from_fn(3, 3, |x, y| {
            if x == y { Rgb([9, 9, 9]) } else { Rgb([0, 0, 0]) }
        });
        flood_fill_mut(&mut image, 1, 0, Rgb([0, 255, 0]));
        // The diagonal splits the black pixels into two 4-connected halves.
        assert_eq!(*image.get_pixel(2, 0), Rgb([0, 255, 0]));
        assert_eq!(*image.get_pixel(2, 1), Rgb([0, 255, 0]));
        assert_eq!(*image.get_pixel(0, 1), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(1, 1), Rgb([9, 9, 9]));

        let before = image.clone();
        flood_fill_mut(&mut image, 5, 5, Rgb([1, 2, 3]));
        assert_eq!(image, before);
    }
}

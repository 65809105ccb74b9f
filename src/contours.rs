//! Solid silhouettes from external contours, and the sentinel-backed crop composite.

use image::{GrayImage, Luma, Rgb, RgbImage, math::Rect};
use imageproc::{
    contours::{BorderType, Contour, find_contours},
    drawing::draw_polygon_mut,
    edges::canny,
    point::Point,
};
use num::{Num, NumCast};
use num_traits::AsPrimitive;

use crate::{
    config::PipelineConfig,
    error::{Result, ensure_non_empty, ensure_same_dimensions},
    morphology,
    rect::pixel_bounds,
};

/// Filled outlines of every external region of a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Silhouette {
    /// Solid mask: each external region filled, interior holes included.
    pub mask: GrayImage,
    /// Pixel bounds of each filled region, longest outline first.
    pub regions: Vec<Rect>,
}

/// Calculates the closed perimeter of a contour.
///
/// The perimeter is the sum of Euclidean distances between consecutive points, closing the
/// loop by including the distance between the last and first point. Contours with 0 or 1
/// point have a perimeter of `0.0`.
pub fn closed_perimeter<T>(contour: &Contour<T>) -> f64
where
    T: Num + NumCast + Copy + PartialEq + Eq + AsPrimitive<f64>,
{
    contour
        .points
        .iter()
        .zip(contour.points.iter().cycle().skip(1))
        .map(|(p1, p2)| {
            let dx: f64 = p2.x.as_() - p1.x.as_();
            let dy: f64 = p2.y.as_() - p1.y.as_();
            dx.hypot(dy)
        })
        .sum()
}

/// Keeps only external contours (outer borders with no enclosing contour), paired with their
/// perimeters and sorted by perimeter in descending order.
///
/// Contours whose perimeter is below `min_perimeter` are dropped.
pub fn external_by_perimeter_owned<T>(
    contours: Vec<Contour<T>>,
    min_perimeter: f64,
) -> Vec<(Contour<T>, f64)>
where
    T: Num + NumCast + Copy + PartialEq + Eq + AsPrimitive<f64>,
{
    let mut external: Vec<(Contour<T>, f64)> = contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|contour| {
            let perimeter = closed_perimeter(&contour);
            (contour, perimeter)
        })
        .filter(|(_, perimeter)| *perimeter >= min_perimeter)
        .collect();

    external.sort_unstable_by(|a, b| b.1.total_cmp(&a.1));

    external
}

/// Paints a contour and its interior onto `canvas`.
fn fill_contour(canvas: &mut GrayImage, points: &[Point<i32>]) {
    let mut polygon = points;
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon = &polygon[..polygon.len() - 1];
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(canvas, polygon, Luma([morphology::ON]));
    }
    // The polygon is spanned by pixel centers; plot the outline itself as well.
    for p in points {
        if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y))
            && x < canvas.width()
            && y < canvas.height()
        {
            canvas.put_pixel(x, y, Luma([morphology::ON]));
        }
    }
}

/// Traces the external contours of `mask` and fills each one solid.
///
/// Edges found by Canny are merged with the mask before tracing, so a broken edge map cannot
/// open an outline. Every external region yields one solid blob regardless of its holes.
pub fn fill_silhouette(mask: &GrayImage, config: &PipelineConfig) -> Result<Silhouette> {
    ensure_non_empty("mask", mask.dimensions())?;

    let edges = canny(mask, config.canny_low, config.canny_high);
    let outline = morphology::or(&edges, mask);

    let contours = find_contours::<i32>(&outline);
    let external = external_by_perimeter_owned(contours, config.min_contour_perimeter);
    log::debug!("filling {} external contours", external.len());

    let mut canvas = GrayImage::new(mask.width(), mask.height());
    let mut regions = Vec::with_capacity(external.len());
    for (contour, _) in &external {
        fill_contour(&mut canvas, &contour.points);
        if let Some(bounds) = pixel_bounds(&contour.points) {
            regions.push(bounds);
        }
    }

    Ok(Silhouette {
        mask: canvas,
        regions,
    })
}

/// Copies `image` wherever `silhouette` is on onto a canvas filled with `sentinel`.
pub fn crop(image: &RgbImage, silhouette: &GrayImage, sentinel: Rgb<u8>) -> Result<RgbImage> {
    ensure_same_dimensions(image.dimensions(), silhouette.dimensions())?;
    Ok(RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if silhouette.get_pixel(x, y)[0] != morphology::OFF {
            *image.get_pixel(x, y)
        } else {
            sentinel
        }
    }))
}

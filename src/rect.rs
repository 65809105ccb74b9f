use image::math::Rect;
use imageproc::point::Point;
use num_traits::{Num, ToPrimitive};

/// Calculates the axis-aligned pixel bounds of a set of points.
///
/// The points are treated as pixel positions, so the returned `Rect` includes both the
/// minimum and the maximum row and column: a single point has width and height 1.
/// Coordinates below zero are clamped to zero.
///
/// Returns `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use sign_segmentation::rect::pixel_bounds;
///
/// let outline = [Point::new(3, 4), Point::new(9, 4), Point::new(9, 6), Point::new(3, 6)];
/// let bounds = pixel_bounds(&outline).unwrap();
///
/// assert_eq!((bounds.x, bounds.y, bounds.width, bounds.height), (3, 4, 7, 3));
/// ```
pub fn pixel_bounds<T>(points: &[Point<T>]) -> Option<Rect>
where
    T: Copy + PartialOrd + Num + ToPrimitive,
{
    let (first, rest) = points.split_first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    // `T` is only `PartialOrd`, so floats are accepted too.
    for p in rest {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    let x = min_x.to_u32().unwrap_or(0);
    let y = min_y.to_u32().unwrap_or(0);

    let width = max_x.to_u32().unwrap_or(0).saturating_sub(x) + 1;
    let height = max_y.to_u32().unwrap_or(0).saturating_sub(y) + 1;

    Some(Rect {
        x,
        y,
        width,
        height,
    })
}

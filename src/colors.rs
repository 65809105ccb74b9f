use image::{GrayImage, Luma, Rgb, RgbImage};
use palette::{FromColor, Hsl, Hsv, Srgb};

/// Upper bound (exclusive) of 8-bit hue values, which store degrees halved.
pub const HUE_RANGE: u16 = 180;

/// The color classes a sign is decomposed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignClass {
    Red,
    Black,
    White,
}

impl SignClass {
    pub const ALL: [SignClass; 3] = [SignClass::Red, SignClass::Black, SignClass::White];

    /// The exact color marking this class in a ground-truth image.
    pub fn ground_truth_color(self) -> Rgb<u8> {
        match self {
            SignClass::Red => Rgb([255, 0, 0]),
            SignClass::Black => Rgb([0, 0, 0]),
            SignClass::White => Rgb([255, 255, 255]),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignClass::Red => "red",
            SignClass::Black => "black",
            SignClass::White => "white",
        }
    }
}

fn to_srgb(pixel: &Rgb<u8>) -> Srgb<f32> {
    Srgb::new(pixel[0], pixel[1], pixel[2]).into_format()
}

/// Hue of a pixel on the 8-bit scale `[0, 180)`. Achromatic pixels have hue 0.
pub(crate) fn hue_u8(pixel: &Rgb<u8>) -> u8 {
    let hsv: Hsv = Hsv::from_color(to_srgb(pixel));
    let halved = (hsv.hue.into_positive_degrees() / 2.0).round() as u16;
    (halved % HUE_RANGE) as u8
}

/// HLS lightness of a pixel on the 8-bit scale `[0, 255]`.
pub(crate) fn lightness_u8(pixel: &Rgb<u8>) -> u8 {
    let hsl: Hsl = Hsl::from_color(to_srgb(pixel));
    (hsl.lightness * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Extracts the HSV hue channel of a color image.
pub fn hue_channel(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([hue_u8(image.get_pixel(x, y))])
    })
}

/// Extracts the HLS lightness channel of a color image.
pub fn lightness_channel(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([lightness_u8(image.get_pixel(x, y))])
    })
}

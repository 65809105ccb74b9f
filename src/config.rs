//! Tuning parameters for the sign segmentation pipeline.
//!
//! Every threshold, kernel radius and range used by the stages is a named field here.
//! [`PipelineConfig::default`] reproduces the reference behavior.
//!
//! ```
//! use sign_segmentation::config::{PipelineConfig, ThresholdMode};
//!
//! let config = PipelineConfig::from_json_str(r#"{ "back_projection_threshold": "Otsu" }"#)?;
//! assert_eq!(config.back_projection_threshold, ThresholdMode::Otsu);
//! assert_eq!(config.num_bins, 6);
//! # Ok::<(), sign_segmentation::SegmentationError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};

/// How a probability map is binarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMode {
    /// Pixels strictly above the level become 255.
    Fixed(u8),
    /// The level is chosen by Otsu's method on the map itself.
    Otsu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hue histogram bins over `[0, 180)`. Must be at least 2.
    pub num_bins: usize,

    /// Binarization of the back-projected probability map.
    pub back_projection_threshold: ThresholdMode,

    /// Radius of the disk dilating the back-projection mask.
    pub back_projection_dilate_radius: u8,

    /// Radius of the disk closing the dilated back-projection mask, if any.
    pub back_projection_close_radius: Option<u8>,

    /// Inclusive HLS lightness range kept as sign body.
    pub lightness_range: (u8, u8),

    /// Radius of the disk closing the lightness mask.
    pub segment_close_radius: u8,

    /// Grayscale level above which a masked color pixel counts as foreground.
    pub segment_binarize_level: u8,

    /// Radius of the optional final closing of the refined mask.
    pub segment_refine_radius: Option<u8>,

    /// AND the refined mask with the back-projection mask.
    pub fuse_back_projection: bool,

    /// Canny hysteresis thresholds used before contour tracing.
    ///
    /// The edge map is merged with the red mask rather than traced on its own, so these only
    /// widen an outline by the edge pixels Canny adds. Every region of the mask is filled
    /// whatever the thresholds are.
    pub canny_low: f32,
    pub canny_high: f32,

    /// Contours with a shorter closed perimeter are not filled.
    pub min_contour_perimeter: f64,

    /// Fill color outside the silhouette in the crop composite.
    pub background_sentinel: [u8; 3],

    /// Mask level above which a pixel counts as sign coverage.
    pub coverage_level: u8,

    /// Grayscale level at or below which an interior pixel is black class.
    pub black_level: u8,

    /// Radius of the disk closing the black-class mask.
    pub black_close_radius: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_bins: 6,
            back_projection_threshold: ThresholdMode::Fixed(220),
            back_projection_dilate_radius: 5,
            back_projection_close_radius: Some(5),
            lightness_range: (75, 180),
            segment_close_radius: 5,
            segment_binarize_level: 0,
            segment_refine_radius: Some(4),
            fuse_back_projection: false,
            canny_low: 100.0,
            canny_high: 200.0,
            min_contour_perimeter: 0.0,
            background_sentinel: [0, 255, 0],
            coverage_level: 10,
            black_level: 85,
            black_close_radius: 2,
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// The parsed configuration is validated before it is returned.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SegmentationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is within its usable range.
    pub fn validate(&self) -> Result<()> {
        if self.num_bins < 2 {
            return Err(SegmentationError::InvalidHistogramBins(self.num_bins));
        }
        let (low, high) = self.lightness_range;
        if low > high {
            return Err(SegmentationError::InvalidConfig(format!(
                "lightness range {low}..={high} is empty"
            )));
        }
        if !(self.canny_low.is_finite() && self.canny_high.is_finite())
            || self.canny_low < 0.0
            || self.canny_low > self.canny_high
        {
            return Err(SegmentationError::InvalidConfig(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} and {}",
                self.canny_low, self.canny_high
            )));
        }
        if !self.min_contour_perimeter.is_finite() || self.min_contour_perimeter < 0.0 {
            return Err(SegmentationError::InvalidConfig(format!(
                "min_contour_perimeter must be a non-negative finite number, got {}",
                self.min_contour_perimeter
            )));
        }
        Ok(())
    }
}

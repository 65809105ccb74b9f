/// Errors surfaced by the segmentation pipeline and the evaluation engine.
///
/// Undefined metrics are not errors; see [`crate::evaluation::Metrics`].
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    /// Two images that must share a size do not.
    #[error("image dimensions differ: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// A hue histogram needs at least two bins.
    #[error("hue histogram needs at least 2 bins, got {0}")]
    InvalidHistogramBins(usize),

    /// An input image has zero area.
    #[error("{0} image is empty")]
    EmptyImage(&'static str),

    /// A tuning value is out of range, or a configuration document is malformed.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SegmentationError>;

/// Fails with [`SegmentationError::EmptyImage`] when `dimensions` has zero area.
pub(crate) fn ensure_non_empty(name: &'static str, dimensions: (u32, u32)) -> Result<()> {
    if dimensions.0 == 0 || dimensions.1 == 0 {
        return Err(SegmentationError::EmptyImage(name));
    }
    Ok(())
}

/// Fails with [`SegmentationError::DimensionMismatch`] when the sizes differ.
pub(crate) fn ensure_same_dimensions(expected: (u32, u32), found: (u32, u32)) -> Result<()> {
    if expected != found {
        return Err(SegmentationError::DimensionMismatch { expected, found });
    }
    Ok(())
}

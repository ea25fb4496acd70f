// THEORY:
// A `ColorSpec` is the matching predicate for one detection pass: a target color
// plus a per-channel tolerance. It is a parameter, not a stored entity.
//
// A pixel matches when every channel is within `tolerance` of the target:
//     |r - tr| <= tol AND |g - tg| <= tol AND |b - tb| <= tol
// The tolerance is held as a `u8`, so once a `ColorSpec` exists it is in 0..=255
// by construction. Out-of-range values are rejected by `ColorSpec::new` before
// any scan starts.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::MarkupError;
use serde::{Deserialize, Serialize};

pub type Tolerance = u8;

/// Tolerance used by the reference markup passes.
pub const DEFAULT_TOLERANCE: Tolerance = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSpec {
    pub target: Pixel,
    pub tolerance: Tolerance,
}

impl ColorSpec {
    /// Validates `tolerance` against 0..=255.
    pub fn new(target: Pixel, tolerance: i64) -> Result<Self, MarkupError> {
        let tolerance = Tolerance::try_from(tolerance).map_err(|_| {
            tracing::warn!(tolerance, "rejecting out-of-range tolerance");
            MarkupError::InvalidTolerance(tolerance)
        })?;
        Ok(Self { target, tolerance })
    }

    pub const fn exact(target: Pixel) -> Self {
        Self {
            target,
            tolerance: 0,
        }
    }

    #[inline]
    pub fn matches(&self, pixel: &Pixel) -> bool {
        self.target.max_channel_delta(pixel) <= self.tolerance
    }
}

//! Canvas size normalization before export.
//!
//! Two mutually exclusive policies are supported and must be chosen
//! explicitly through [`ResizePolicy`]:
//!
//! - `MaxDimension(D)`: downscale only, so the longest side is at most `D`
//! - `FixedHeight(H)`: always scale to height `H`, upscaling if needed
//!
//! Normalization never aborts an export. Any failure is reported as
//! [`NormalizeOutcome::Failed`] and the frames are exported at the original
//! resolution.

use serde::{Deserialize, Serialize};

use crate::errors::{LapseError, Result};
use crate::host::{DocumentHost, ResampleFilter};
use crate::model::CanvasSize;

/// Default longest side for the `MaxDimension` policy
pub const DEFAULT_MAX_DIMENSION: u32 = 1000;

/// How the canvas is resized before the first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Export at the document's own resolution
    Unchanged,
    /// Downscale so that the longest side is at most this many pixels
    MaxDimension(u32),
    /// Scale to exactly this height, up or down, keeping aspect ratio
    FixedHeight(u32),
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::MaxDimension(DEFAULT_MAX_DIMENSION)
    }
}

/// Result of the normalization step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum NormalizeOutcome {
    /// Policy is `Unchanged`; the host was not consulted
    Disabled,
    /// Canvas already satisfies the policy
    WithinLimit { size: CanvasSize },
    /// Canvas was resampled
    Resized { from: CanvasSize, to: CanvasSize },
    /// Normalization failed; export continues unresized
    Failed { reason: String },
}

/// `value * numerator / denominator`, rounded to nearest, at least 1
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let den = u128::from(denominator);
    let scaled = (u128::from(value) * u128::from(numerator) * 2 + den) / (2 * den);
    u32::try_from(scaled.max(1)).unwrap_or(u32::MAX)
}

/// Compute the size the canvas should be resized to
///
/// # Returns
/// `Ok(None)` when no resize is needed, `Ok(Some(size))` otherwise
///
/// # Errors
/// * `InvalidCanvasSize` - If a side of `current` is zero
/// * `InvalidConfig` - If the policy's target is zero
pub fn target_size(policy: ResizePolicy, current: CanvasSize) -> Result<Option<CanvasSize>> {
    if policy == ResizePolicy::Unchanged {
        return Ok(None);
    }
    if current.is_empty() {
        return Err(LapseError::InvalidCanvasSize {
            width: current.width,
            height: current.height,
        });
    }

    match policy {
        ResizePolicy::Unchanged => Ok(None),
        ResizePolicy::MaxDimension(0) | ResizePolicy::FixedHeight(0) => {
            Err(LapseError::InvalidConfig {
                reason: "resize target must be greater than zero".to_string(),
            })
        }
        ResizePolicy::MaxDimension(max) => {
            if current.longest_side() <= max {
                return Ok(None);
            }
            let target = if current.width >= current.height {
                CanvasSize::new(max, scale(current.height, max, current.width))
            } else {
                CanvasSize::new(scale(current.width, max, current.height), max)
            };
            Ok(Some(target))
        }
        ResizePolicy::FixedHeight(height) => {
            let target = CanvasSize::new(scale(current.width, height, current.height), height);
            Ok((target != current).then_some(target))
        }
    }
}

/// Apply the resize policy to the host's canvas, at most once
///
/// Never fails: every error is logged and returned as
/// [`NormalizeOutcome::Failed`].
pub fn normalize_canvas<H>(host: &mut H, policy: ResizePolicy, filter: ResampleFilter) -> NormalizeOutcome
where
    H: DocumentHost + ?Sized,
{
    if policy == ResizePolicy::Unchanged {
        return NormalizeOutcome::Disabled;
    }

    let outcome = match host
        .canvas_size()
        .and_then(|current| Ok((current, target_size(policy, current)?)))
    {
        Err(err) => NormalizeOutcome::Failed {
            reason: err.to_string(),
        },
        Ok((size, None)) => NormalizeOutcome::WithinLimit { size },
        Ok((from, Some(to))) => match host.resize_canvas(to, filter) {
            Ok(()) => NormalizeOutcome::Resized { from, to },
            Err(err) => NormalizeOutcome::Failed {
                reason: err.to_string(),
            },
        },
    };

    match &outcome {
        NormalizeOutcome::Failed { reason } => {
            tracing::warn!(?policy, reason = %reason, "canvas normalization failed, exporting unresized");
        }
        other => tracing::debug!(?policy, outcome = ?other, "canvas normalized"),
    }

    outcome
}

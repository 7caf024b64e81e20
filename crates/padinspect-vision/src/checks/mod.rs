// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Defect checks — independent, stateless heuristics run against the extracted
// pad region and its bounding box.

pub mod color;
pub mod integrity;
pub mod shape;
pub mod stain;

pub use color::ColorDeviationCheck;
pub use integrity::StructuralIntegrityCheck;
pub use shape::AspectRatioCheck;
pub use stain::StainCheck;

use image::RgbImage;
use padinspect_core::{BoundingBox, DefectLabel};

use crate::frame::luma_bt601;

/// Immutable input shared by every check of one inspection.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    /// Pixels under the pad box, copied out of the original frame.
    pub region: &'a RgbImage,
    /// The box the region was cut from, as reported by the locator.
    pub bbox: BoundingBox,
}

impl<'a> CheckInput<'a> {
    pub fn new(region: &'a RgbImage, bbox: BoundingBox) -> Self {
        Self { region, bbox }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The check ran and found nothing.
    Pass,
    /// The check ran and raised a defect.
    Defect(DefectLabel),
    /// The check could not form an opinion (empty region, zero height).
    /// This is neither a pass nor a defect.
    Indeterminate,
}

impl CheckOutcome {
    /// The raised label, if any.
    pub fn defect(self) -> Option<DefectLabel> {
        match self {
            Self::Defect(label) => Some(label),
            Self::Pass | Self::Indeterminate => None,
        }
    }

    /// `Defect(label)` when `fires`, `Pass` otherwise.
    pub fn from_flag(fires: bool, label: DefectLabel) -> Self {
        if fires { Self::Defect(label) } else { Self::Pass }
    }
}

/// A single defect heuristic.
///
/// Implementations hold only their thresholds and never mutate the input,
/// so any set of checks can run in any order (or in parallel) against the
/// same `CheckInput`.
pub trait DefectCheck: Send + Sync {
    /// Stable identifier used in logs and in `indeterminate_checks`.
    fn name(&self) -> &'static str;

    fn check(&self, input: &CheckInput<'_>) -> CheckOutcome;
}

/// Fraction of region pixels whose BT.601 luma is at or below `threshold`, or
/// `None` for an empty region.
pub(crate) fn dark_pixel_ratio(region: &RgbImage, threshold: u8) -> Option<f64> {
    let total = region.width() as u64 * region.height() as u64;
    if total == 0 {
        return None;
    }
    let dark = region
        .pixels()
        .filter(|p| luma_bt601(p) <= threshold)
        .count() as u64;
    Some(dark as f64 / total as f64)
}

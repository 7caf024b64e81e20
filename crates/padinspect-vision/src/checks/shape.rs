// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cut check — the pad's width/height ratio must stay inside the expected
// range. Works on the locator's box only; region pixels are ignored.

use padinspect_core::{AspectRange, DefectLabel};
use tracing::{debug, warn};

use super::{CheckInput, CheckOutcome, DefectCheck};

#[derive(Debug, Clone, Copy, Default)]
pub struct AspectRatioCheck {
    range: AspectRange,
}

impl AspectRatioCheck {
    pub fn new(range: AspectRange) -> Self {
        Self { range }
    }

    /// Evaluate a raw width/height pair. Zero height has no ratio and yields
    /// `Indeterminate`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> CheckOutcome {
        if height == 0 {
            warn!(check = self.name(), width, "Zero box height; no opinion");
            return CheckOutcome::Indeterminate;
        }
        let ratio = width as f64 / height as f64;
        debug!(
            ratio,
            min = self.range.min,
            max = self.range.max,
            "Aspect ratio"
        );
        CheckOutcome::from_flag(
            !self.range.contains(ratio),
            DefectLabel::CutRatio { ratio },
        )
    }
}

impl DefectCheck for AspectRatioCheck {
    fn name(&self) -> &'static str {
        "aspect_ratio"
    }

    fn check(&self, input: &CheckInput<'_>) -> CheckOutcome {
        self.check_dimensions(input.bbox.width, input.bbox.height)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural integrity check — very dark pixels are taken as holes, tears or
// missing material showing the background through the pad.

use padinspect_core::{DarkPixelConfig, DefectLabel};
use tracing::{debug, warn};

use super::{CheckInput, CheckOutcome, DefectCheck, dark_pixel_ratio};

/// Fires when the share of pixels at or below luma 50 exceeds 2% (defaults).
#[derive(Debug, Clone, Copy)]
pub struct StructuralIntegrityCheck {
    config: DarkPixelConfig,
}

impl StructuralIntegrityCheck {
    pub fn new(config: DarkPixelConfig) -> Self {
        Self { config }
    }
}

impl Default for StructuralIntegrityCheck {
    fn default() -> Self {
        Self::new(DarkPixelConfig::INTEGRITY)
    }
}

impl DefectCheck for StructuralIntegrityCheck {
    fn name(&self) -> &'static str {
        "structural_integrity"
    }

    fn check(&self, input: &CheckInput<'_>) -> CheckOutcome {
        let Some(ratio) = dark_pixel_ratio(input.region, self.config.threshold) else {
            warn!(check = self.name(), "Empty region; no opinion");
            return CheckOutcome::Indeterminate;
        };
        debug!(ratio, max_ratio = self.config.max_ratio, "Structural dark ratio");
        CheckOutcome::from_flag(
            ratio > self.config.max_ratio,
            DefectLabel::StructuralDegradation,
        )
    }
}

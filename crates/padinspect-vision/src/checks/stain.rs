// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stain check — dark spots on an otherwise light pad.

use padinspect_core::{DarkPixelConfig, DefectLabel};
use tracing::{debug, warn};

use super::{CheckInput, CheckOutcome, DefectCheck, dark_pixel_ratio};

/// Fires when the share of pixels at or below the stain threshold (default
/// luma 100) exceeds the configured ratio (default 1%).
#[derive(Debug, Clone, Copy)]
pub struct StainCheck {
    config: DarkPixelConfig,
}

impl StainCheck {
    pub fn new(config: DarkPixelConfig) -> Self {
        Self { config }
    }
}

impl Default for StainCheck {
    fn default() -> Self {
        Self::new(DarkPixelConfig::STAIN)
    }
}

impl DefectCheck for StainCheck {
    fn name(&self) -> &'static str {
        "stain"
    }

    fn check(&self, input: &CheckInput<'_>) -> CheckOutcome {
        let Some(ratio) = dark_pixel_ratio(input.region, self.config.threshold) else {
            warn!(check = self.name(), "Empty region; no opinion");
            return CheckOutcome::Indeterminate;
        };
        debug!(ratio, max_ratio = self.config.max_ratio, "Stain ratio");
        CheckOutcome::from_flag(ratio > self.config.max_ratio, DefectLabel::Stain)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// padinspect-vision — Visual inspection of a light rectangular pad.
//
// Provides the bright-region locator, the defect checks (color deviation,
// stain, cut ratio, structural integrity), the inspection orchestrator that
// combines them into a verdict, annotation of the frame, and the JSON report.

pub mod annotate;
pub mod checks;
pub mod frame;
pub mod inspect;
pub mod locate;
pub mod report;
pub mod source;

// Re-export the primary structs so callers can use `padinspect_vision::Inspector` etc.
pub use annotate::Annotator;
pub use checks::{CheckInput, CheckOutcome, DefectCheck};
pub use frame::ImageProcessor;
pub use inspect::{Evaluation, InspectionResult, Inspector};
pub use locate::{LocateMiss, PadLocation, RegionLocator};
pub use report::InspectionReport;
pub use source::{FileSource, ImageSource};

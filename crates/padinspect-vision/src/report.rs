// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inspection report — the JSON document handed to downstream consumers. The
// annotated frame travels as base64-wrapped PNG, never as raw pixels.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use padinspect_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::frame::encode_to_format;
use crate::inspect::InspectionResult;

/// Serializable summary of one inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub pad_found: bool,
    /// `[x, y, width, height]` of the pad box.
    pub pad_coords: Option<[u32; 4]>,
    pub status: String,
    pub errors: Vec<String>,
    pub processed_image_base64: Option<String>,
}

impl InspectionReport {
    /// Build a report, PNG-encoding the annotated frame when there is one.
    /// An encoding failure leaves `processed_image_base64` empty.
    pub fn from_result(result: &InspectionResult) -> Self {
        let processed_image_base64 = result.annotated_image.as_ref().and_then(encode_base64_png);
        Self {
            pad_found: result.pad_found,
            pad_coords: result.pad_box.map(|bbox| bbox.to_array()),
            status: result.status.as_str().to_owned(),
            errors: result.defects.iter().map(ToString::to_string).collect(),
            processed_image_base64,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON document to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "Report written");
        Ok(())
    }

    /// Decode the embedded PNG back into bytes, if present and valid base64.
    pub fn processed_image_png(&self) -> Option<Vec<u8>> {
        let encoded = self.processed_image_base64.as_ref()?;
        STANDARD.decode(encoded).ok()
    }
}

fn encode_base64_png(image: &RgbImage) -> Option<String> {
    if image.width() == 0 || image.height() == 0 {
        warn!("Annotated image is empty; omitting it from the report");
        return None;
    }
    match encode_to_format(image, ImageFormat::Png) {
        Ok(png) => {
            debug!(png_bytes = png.len(), "Annotated image encoded");
            Some(STANDARD.encode(png))
        }
        Err(err) => {
            warn!(error = %err, "Could not encode annotated image; omitting it from the report");
            None
        }
    }
}

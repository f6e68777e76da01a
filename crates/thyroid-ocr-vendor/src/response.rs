//! Vendor response payload parsing.

use serde::{Deserialize, Serialize};

use crate::{OcrError, VendorResult};

/// One recognized text line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextDetection {
    pub detected_text: String,
    /// Vendor confidence, 0–100
    #[serde(default)]
    pub confidence: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    response: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseBody {
    error: Option<VendorError>,
    text_detections: Option<Vec<TextDetection>>,
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VendorError {
    code: Option<String>,
    message: String,
}

/// Parse a vendor JSON payload into its text detections, in vendor order.
///
/// A provider-reported error wins over any detections in the same payload.
pub fn parse_vendor_response(body: &str) -> VendorResult<Vec<TextDetection>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let response = envelope
        .response
        .ok_or_else(|| OcrError::ResponseFormat("missing Response object".into()))?;

    if let Some(error) = response.error {
        tracing::warn!(
            code = error.code.as_deref().unwrap_or("unknown"),
            request_id = response.request_id.as_deref().unwrap_or(""),
            "vendor reported an error"
        );
        return Err(OcrError::Vendor(error.message));
    }

    response
        .text_detections
        .ok_or_else(|| OcrError::ResponseFormat("missing TextDetections".into()))
}

/// Parse a payload straight into the fragment list the extractor consumes.
pub fn fragments_from_response(body: &str) -> VendorResult<Vec<String>> {
    Ok(parse_vendor_response(body)?
        .into_iter()
        .map(|d| d.detected_text)
        .collect())
}

//! Transport seam and the end-to-end recognition flow.

use std::sync::atomic::{AtomicUsize, Ordering};

use thyroid_ocr_core::{ExtractionReport, Extractor, ReportMode};

use crate::{fragments_from_response, OcrError, VendorConfig, VendorResult};

/// Sends an image to the vendor and returns the raw JSON body.
///
/// Implementations own request signing and HTTP.
pub trait OcrTransport {
    fn recognize(&self, config: &VendorConfig, image_base64: &str) -> VendorResult<String>;
}

/// Remove a leading `data:image/<type>;base64,` prefix, if present.
pub fn strip_data_url(image: &str) -> &str {
    let Some(rest) = image.strip_prefix("data:image/") else {
        return image;
    };
    match rest.split_once(";base64,") {
        Some((subtype, data))
            if !subtype.is_empty()
                && subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            data
        }
        _ => image,
    }
}

/// Recognize a report image and extract its fields.
///
/// A blank image is rejected before the transport is called.
pub fn recognize_report<T: OcrTransport + ?Sized>(
    transport: &T,
    config: &VendorConfig,
    image: &str,
    mode: ReportMode,
) -> VendorResult<ExtractionReport> {
    let image_base64 = strip_data_url(image).trim();
    if image_base64.is_empty() {
        tracing::warn!("rejected request without an image");
        return Err(OcrError::InvalidImage);
    }

    let body = transport
        .recognize(config, image_base64)
        .inspect_err(|e| tracing::warn!(kind = e.kind(), error = %e, "OCR transport failed"))?;

    let fragments = fragments_from_response(&body)
        .inspect_err(|e| tracing::warn!(kind = e.kind(), error = %e, "OCR response rejected"))?;
    tracing::debug!(fragments = fragments.len(), "OCR response parsed");

    Ok(Extractor::new().extract(fragments.as_slice(), mode))
}

/// Canned transport for tests and offline runs.
pub struct MockTransport {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl MockTransport {
    /// Always answer with `body`.
    pub fn responding(body: impl Into<String>) -> Self {
        Self {
            reply: Ok(body.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with a network error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Build a vendor payload from plain text lines.
    pub fn with_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let detections: Vec<serde_json::Value> = lines
            .iter()
            .map(|l| serde_json::json!({ "DetectedText": l.as_ref(), "Confidence": 99 }))
            .collect();
        let body = serde_json::json!({
            "Response": { "TextDetections": detections, "RequestId": "mock" }
        });
        Self::responding(body.to_string())
    }

    /// Number of `recognize` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrTransport for MockTransport {
    fn recognize(&self, _config: &VendorConfig, _image_base64: &str) -> VendorResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(OcrError::Network)
    }
}

//! Screen reading
//!
//! Two layers:
//! - `TextRecognizer`: the OCR engine's two primitives over a decoded image
//! - `ScreenReader`: what navigation and workflows ask of a raw screenshot
//!   (text inside a region, or every text box with its screen position)
//!
//! `OcrScreenReader` bridges the two by decoding and cropping the screenshot
//! and translating crop-local box centers back to screen coordinates.

mod http;
mod ocr;

pub use http::HttpTextRecognizer;
pub use ocr::OcrScreenReader;

use crate::error::VisionError;
use image::DynamicImage;
use resonance_device::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Best single reading of an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub text: String,
    pub confidence: f32,
}

/// Detected text box, positioned at its center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub position: Point,
    pub text: String,
    pub confidence: f32,
}

impl TextBox {
    #[must_use]
    pub fn new(x: i32, y: i32, text: impl Into<String>) -> Self {
        Self {
            position: Point::new(x, y),
            text: text.into(),
            confidence: 1.0,
        }
    }
}

/// OCR engine primitives
#[async_trait::async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize the single best text line in the image
    async fn recognize(&self, image: &DynamicImage) -> Result<Recognition, VisionError>;

    /// Detect every text box; positions are in the image's own frame
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<TextBox>, VisionError>;
}

/// Text queries against a raw screenshot
#[async_trait::async_trait]
pub trait ScreenReader: Send + Sync {
    /// Text recognized inside `region`, trimmed
    async fn read_text(&self, screenshot: &[u8], region: Rect) -> Result<String, VisionError>;

    /// Text boxes inside `region` (whole screen if `None`), in screen coordinates
    async fn find_text(
        &self,
        screenshot: &[u8],
        region: Option<Rect>,
    ) -> Result<Vec<TextBox>, VisionError>;
}

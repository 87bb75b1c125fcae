use super::{Recognition, TextBox, TextRecognizer};
use crate::error::VisionError;
use image::{DynamicImage, ImageFormat};
use resonance_device::Point;
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;

/// Client for an OCR sidecar
///
/// Each call posts the image as PNG. `POST {endpoint}/recognize` answers
/// `{"text": "...", "confidence": 0.98}`; `POST {endpoint}/detect` answers
/// `{"boxes": [{"x": 12, "y": 40, "text": "...", "confidence": 0.9}]}` with
/// box centers in the posted image's frame.
#[derive(Debug, Clone)]
pub struct HttpTextRecognizer {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    boxes: Vec<DetectedBox>,
}

#[derive(Debug, Deserialize)]
struct DetectedBox {
    x: i32,
    y: i32,
    text: String,
    #[serde(default)]
    confidence: f32,
}

impl HttpTextRecognizer {
    /// Create a client for `endpoint` (e.g. `http://127.0.0.1:8866`)
    ///
    /// # Errors
    /// - `VisionError::Http` if the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, path: &str, image: &DynamicImage) -> Result<reqwest::Response, VisionError> {
        let mut body = Cursor::new(Vec::new());
        image.write_to(&mut body, ImageFormat::Png)?;
        let response = self
            .client
            .post(format!("{}/{path}", self.endpoint))
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(body.into_inner())
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

#[async_trait::async_trait]
impl TextRecognizer for HttpTextRecognizer {
    async fn recognize(&self, image: &DynamicImage) -> Result<Recognition, VisionError> {
        Ok(self.post("recognize", image).await?.json().await?)
    }

    async fn detect(&self, image: &DynamicImage) -> Result<Vec<TextBox>, VisionError> {
        let response: DetectResponse = self.post("detect", image).await?.json().await?;
        Ok(response
            .boxes
            .into_iter()
            .map(|b| TextBox {
                position: Point::new(b.x, b.y),
                text: b.text,
                confidence: b.confidence,
            })
            .collect())
    }
}

use super::{ScreenReader, TextBox, TextRecognizer};
use crate::error::VisionError;
use image::DynamicImage;
use resonance_device::Rect;

/// `ScreenReader` over any `TextRecognizer`
#[derive(Debug, Clone)]
pub struct OcrScreenReader<R> {
    recognizer: R,
}

impl<R: TextRecognizer> OcrScreenReader<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }
}

fn decode(screenshot: &[u8]) -> Result<DynamicImage, VisionError> {
    Ok(image::load_from_memory(screenshot)?)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn crop(image: &DynamicImage, region: Rect) -> Result<DynamicImage, VisionError> {
    let (width, height) = (image.width(), image.height());
    let clamped = region
        .clamp_to(width as i32, height as i32)
        .ok_or(VisionError::RegionOutOfBounds {
            region,
            width,
            height,
        })?;
    Ok(image.crop_imm(
        clamped.x1 as u32,
        clamped.y1 as u32,
        clamped.width() as u32,
        clamped.height() as u32,
    ))
}

#[async_trait::async_trait]
impl<R: TextRecognizer> ScreenReader for OcrScreenReader<R> {
    async fn read_text(&self, screenshot: &[u8], region: Rect) -> Result<String, VisionError> {
        let cropped = crop(&decode(screenshot)?, region)?;
        let recognition = self.recognizer.recognize(&cropped).await?;
        tracing::trace!(
            "Read {:?} in {region} ({:.2})",
            recognition.text,
            recognition.confidence
        );
        Ok(recognition.text.trim().to_string())
    }

    async fn find_text(
        &self,
        screenshot: &[u8],
        region: Option<Rect>,
    ) -> Result<Vec<TextBox>, VisionError> {
        let image = decode(screenshot)?;
        let Some(region) = region else {
            return self.recognizer.detect(&image).await;
        };
        let cropped = crop(&image, region)?;
        let origin = region.origin();
        let boxes = self.recognizer.detect(&cropped).await?;
        Ok(boxes
            .into_iter()
            .map(|b| TextBox {
                position: b.position.offset(origin),
                ..b
            })
            .collect())
    }
}

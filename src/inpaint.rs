//! The hand-off to an external inpainting service.
//!
//! This crate only builds the request and interprets the reply. Transport,
//! encoding (base64, content types) and authentication live in whatever
//! implements [`Inpainter`].

use image::ImageFormat;

use crate::geometry::ImageDimensions;

/// Everything the service needs to regenerate the selected area.
#[derive(Debug, Clone, PartialEq)]
pub struct InpaintRequest {
    /// Original image bytes, exactly as uploaded.
    pub image: Vec<u8>,
    /// Format of [`image`](Self::image).
    pub image_format: ImageFormat,
    /// PNG-encoded mask with the same dimensions as the image.
    pub mask: Vec<u8>,
    /// Optional free-text guidance, e.g. "fill with blue sky".
    pub prompt: Option<String>,
    /// Pixel size shared by image and mask.
    pub dimensions: ImageDimensions,
}

impl InpaintRequest {
    /// MIME type of the original image.
    #[must_use]
    pub fn image_mime_type(&self) -> &'static str {
        self.image_format.to_mime_type()
    }
}

/// Opaque failure reported by the service glue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InpaintFailure(pub String);

/// An external service that fills the masked region of an image.
pub trait Inpainter {
    /// Process one request, returning the new image bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`InpaintFailure`] for any transport or model error.
    fn inpaint(&self, request: &InpaintRequest) -> Result<Vec<u8>, InpaintFailure>;
}

impl<F> Inpainter for F
where
    F: Fn(&InpaintRequest) -> Result<Vec<u8>, InpaintFailure>,
{
    fn inpaint(&self, request: &InpaintRequest) -> Result<Vec<u8>, InpaintFailure> {
        self(request)
    }
}

/// Normalize user guidance: blank text means no guidance.
#[must_use]
pub fn normalize_prompt(prompt: &str) -> Option<String> {
    let trimmed = prompt.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prompt_becomes_none() {
        assert_eq!(normalize_prompt(""), None);
        assert_eq!(normalize_prompt("   \n"), None);
        assert_eq!(
            normalize_prompt("  match the wood texture "),
            Some("match the wood texture".to_string())
        );
    }

    #[test]
    fn closures_act_as_inpainters() {
        let echo = |req: &InpaintRequest| -> Result<Vec<u8>, InpaintFailure> {
            Ok(req.mask.clone())
        };
        let request = InpaintRequest {
            image: vec![1, 2, 3],
            image_format: ImageFormat::Png,
            mask: vec![9],
            prompt: None,
            dimensions: ImageDimensions::new(1, 1).unwrap(),
        };
        assert_eq!(echo.inpaint(&request).unwrap(), vec![9]);
        assert_eq!(request.image_mime_type(), "image/png");
    }

    #[test]
    fn failure_displays_its_message() {
        assert_eq!(InpaintFailure("quota".into()).to_string(), "quota");
    }
}

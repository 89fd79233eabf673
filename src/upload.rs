//! Upload checks applied before an image is decoded.

use image::ImageFormat;

use crate::error::{Error, Result};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which uploads are accepted.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Largest accepted file in bytes.
    pub max_bytes: usize,
    /// Formats accepted after sniffing the file header.
    pub accepted: Vec<ImageFormat>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted: vec![
                ImageFormat::Png,
                ImageFormat::Jpeg,
                ImageFormat::Gif,
                ImageFormat::WebP,
                ImageFormat::Bmp,
            ],
        }
    }
}

impl UploadPolicy {
    /// Check an upload and return its sniffed format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] when the bytes are not a
    /// recognised, accepted image, and [`Error::FileTooLarge`] when they
    /// exceed [`max_bytes`](Self::max_bytes).
    pub fn validate(&self, bytes: &[u8]) -> Result<ImageFormat> {
        let format = image::guess_format(bytes)
            .map_err(|_| Error::UnsupportedFormat("not an image file".to_string()))?;
        if !self.accepted.contains(&format) {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
        if bytes.len() > self.max_bytes {
            return Err(Error::FileTooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn rejects_non_image_bytes() {
        let err = UploadPolicy::default()
            .validate(b"hello, world")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_formats_outside_the_policy() {
        let policy = UploadPolicy {
            accepted: vec![ImageFormat::Jpeg],
            ..UploadPolicy::default()
        };
        assert!(matches!(
            policy.validate(PNG_MAGIC),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_oversized_uploads() {
        let policy = UploadPolicy {
            max_bytes: 4,
            ..UploadPolicy::default()
        };
        let err = policy.validate(PNG_MAGIC).unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { size: 8, limit: 4 }));
    }

    #[test]
    fn accepts_png_header() {
        assert_eq!(
            UploadPolicy::default().validate(PNG_MAGIC).unwrap(),
            ImageFormat::Png
        );
    }
}

//! Error types for the watermark-eraser crate.

/// Errors that can occur while loading images, selecting a region and
/// building inpainting requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to decode uploaded or returned image bytes.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The upload exceeds the configured size ceiling.
    #[error("file is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected upload in bytes.
        size: usize,
        /// Configured ceiling in bytes.
        limit: usize,
    },

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The decoded image has a zero width or height.
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },

    /// Submit was requested without an image or without a selection.
    #[error("Please upload an image and select a watermark area first.")]
    MissingInput,

    /// Submit was requested with a zero-area selection.
    #[error("the selected area is empty")]
    EmptySelection,

    /// Submit was requested while a drag gesture is still open.
    #[error("finish the selection before submitting")]
    SelectionInProgress,

    /// An inpainting request is already in flight.
    #[error("an inpainting request is already pending")]
    RequestPending,

    /// A processed result is shown; the session must be reset before editing.
    #[error("a result is already shown, start over to edit again")]
    ResultShown,

    /// The processed image was requested before one is available.
    #[error("no processed image is available")]
    NoResult,

    /// A result was delivered while no request was pending.
    #[error("no inpainting request is pending")]
    NotSubmitting,

    /// The external inpainting service reported a failure.
    #[error("inpainting failed: {0}")]
    InpaintFailed(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let too_large = Error::FileTooLarge {
            size: 20,
            limit: 10,
        };
        let msg = too_large.to_string();
        assert!(msg.contains("20 bytes"));
        assert!(msg.contains("10 byte limit"));

        let empty = Error::EmptyImage {
            width: 0,
            height: 12,
        };
        assert!(empty.to_string().contains("0x12"));
    }

    #[test]
    fn missing_input_message_is_user_facing() {
        assert_eq!(
            Error::MissingInput.to_string(),
            "Please upload an image and select a watermark area first."
        );
    }
}

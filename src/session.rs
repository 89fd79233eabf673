//! The editing session: one image, one selection, at most one request.
//!
//! All state lives in a single [`State`] enum whose variants carry the data
//! valid in that phase, so "has image", "has selection" and "has result" can
//! never disagree with each other.
//!
//! ```text
//! Empty --load--> ImageLoaded <--drag--> Selecting
//!                     |  ^
//!               submit|  |failure
//!                     v  |
//!                  Submitting --success--> ResultReady --reset--> Empty
//! ```

use image::imageops::{self, FilterType};
use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{DisplayGeometry, ImageDimensions, Point, SelectionRect};
use crate::inpaint::{normalize_prompt, InpaintFailure, InpaintRequest, Inpainter};
use crate::mask;
use crate::overlay::{self, OverlayStyle};
use crate::selection::SelectionTracker;
use crate::upload::UploadPolicy;

/// File name offered when the processed image is downloaded.
pub const DOWNLOAD_FILE_NAME: &str = "watermark_removed.png";

/// Message shown after the inpainting service fails.
pub const INPAINT_FAILED_MESSAGE: &str = "Inpainting failed. The AI model could not process the request. Try a different selection or image.";

/// Coarse phase of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image loaded.
    Empty,
    /// Image loaded, no drag in progress.
    ImageLoaded,
    /// A drag gesture is in progress.
    Selecting,
    /// A request has been handed to the inpainting service.
    Submitting,
    /// The processed image is available; selection is disabled.
    ResultReady,
}

/// Session settings.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Upload checks.
    pub upload: UploadPolicy,
    /// Selection overlay appearance.
    pub overlay: OverlayStyle,
}

#[derive(Debug)]
struct SourceImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    pixels: RgbaImage,
    dims: ImageDimensions,
}

/// Decoded once on arrival; redraws reuse the pixels.
#[derive(Debug)]
struct ProcessedImage {
    bytes: Vec<u8>,
    pixels: RgbaImage,
}

impl ProcessedImage {
    fn decode(bytes: Vec<u8>, dims: ImageDimensions) -> Result<Self> {
        let mut pixels = image::load_from_memory(&bytes)
            .map_err(Error::Decode)?
            .to_rgba8();
        if pixels.dimensions() != (dims.width(), dims.height()) {
            debug!(
                "resizing result from {}x{} to {}x{}",
                pixels.width(),
                pixels.height(),
                dims.width(),
                dims.height()
            );
            pixels = imageops::resize(&pixels, dims.width(), dims.height(), FilterType::Lanczos3);
        }
        Ok(Self { bytes, pixels })
    }
}

#[derive(Debug)]
enum State {
    Empty,
    Editing {
        source: SourceImage,
        tracker: SelectionTracker,
    },
    Submitting {
        source: SourceImage,
        tracker: SelectionTracker,
    },
    ResultReady {
        source: SourceImage,
        tracker: SelectionTracker,
        result: ProcessedImage,
    },
}

/// Owns the loaded image, the selection and the request lifecycle.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: State,
    prompt: String,
    error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: State::Empty,
            prompt: String::new(),
            error: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Empty => Phase::Empty,
            State::Editing { tracker, .. } if tracker.is_dragging() => Phase::Selecting,
            State::Editing { .. } => Phase::ImageLoaded,
            State::Submitting { .. } => Phase::Submitting,
            State::ResultReady { .. } => Phase::ResultReady,
        }
    }

    fn source(&self) -> Option<&SourceImage> {
        match &self.state {
            State::Empty => None,
            State::Editing { source, .. }
            | State::Submitting { source, .. }
            | State::ResultReady { source, .. } => Some(source),
        }
    }

    /// The selection tracker, once an image is loaded.
    #[must_use]
    pub fn tracker(&self) -> Option<&SelectionTracker> {
        match &self.state {
            State::Empty => None,
            State::Editing { tracker, .. }
            | State::Submitting { tracker, .. }
            | State::ResultReady { tracker, .. } => Some(tracker),
        }
    }

    /// Size of the loaded image.
    #[must_use]
    pub fn dimensions(&self) -> Option<ImageDimensions> {
        self.source().map(|s| s.dims)
    }

    /// The live selection.
    #[must_use]
    pub fn selection(&self) -> Option<SelectionRect> {
        self.tracker().and_then(SelectionTracker::selection)
    }

    /// User-facing message from the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Guidance text sent with the next request.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replace the guidance text. Ignored while a request is pending.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        if matches!(self.state, State::Submitting { .. }) {
            debug!("prompt change ignored while a request is pending");
            return;
        }
        self.prompt = prompt.into();
    }

    /// Validate and decode an uploaded image, replacing whatever was loaded.
    ///
    /// Decoding finishes before gestures are enabled, so pointer events can
    /// never see a half-loaded image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestPending`] while a request is in flight, an
    /// upload error from [`UploadPolicy::validate`], [`Error::Decode`] for
    /// undecodable data, or [`Error::EmptyImage`]. The session is unchanged on
    /// error and the message is available from [`error`](Self::error).
    pub fn load_image(&mut self, bytes: Vec<u8>) -> Result<ImageDimensions> {
        match self.decode_source(bytes) {
            Ok(source) => {
                let dims = source.dims;
                info!("loaded {:?} image {}x{}", source.format, dims.width(), dims.height());
                self.state = State::Editing {
                    source,
                    tracker: SelectionTracker::new(dims),
                };
                self.error = None;
                Ok(dims)
            }
            Err(e) => {
                warn!("image rejected: {e}");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn decode_source(&self, bytes: Vec<u8>) -> Result<SourceImage> {
        if matches!(self.state, State::Submitting { .. }) {
            return Err(Error::RequestPending);
        }
        let format = self.config.upload.validate(&bytes)?;
        let pixels = image::load_from_memory_with_format(&bytes, format)
            .map_err(Error::Decode)?
            .to_rgba8();
        let dims = ImageDimensions::new(pixels.width(), pixels.height()).ok_or(
            Error::EmptyImage {
                width: pixels.width(),
                height: pixels.height(),
            },
        )?;
        Ok(SourceImage {
            bytes,
            format,
            pixels,
            dims,
        })
    }

    /// Tracker that may receive pointer events mapped through `geom`.
    fn gesture_tracker(&mut self, geom: &DisplayGeometry) -> Option<&mut SelectionTracker> {
        if !geom.is_valid() {
            debug!("pointer event ignored: canvas has no size");
            return None;
        }
        match &mut self.state {
            State::Editing { source, tracker } if geom.native == source.dims => Some(tracker),
            _ => None,
        }
    }

    /// Pointer pressed at display position `pos`.
    ///
    /// Returns `true` when a new gesture started. Gestures are refused with no
    /// image, while a request is pending and while a result is shown.
    pub fn pointer_down(&mut self, pos: Point, geom: &DisplayGeometry) -> bool {
        self.gesture_tracker(geom)
            .is_some_and(|tracker| tracker.start(geom.map_to_image(pos)))
    }

    /// Pointer moved to display position `pos`. Returns the updated rectangle during a drag.
    pub fn pointer_move(&mut self, pos: Point, geom: &DisplayGeometry) -> Option<SelectionRect> {
        self.gesture_tracker(geom)?.update(geom.map_to_image(pos))
    }

    fn tracker_mut(&mut self) -> Option<&mut SelectionTracker> {
        match &mut self.state {
            State::Empty => None,
            State::Editing { tracker, .. }
            | State::Submitting { tracker, .. }
            | State::ResultReady { tracker, .. } => Some(tracker),
        }
    }

    /// Pointer released. Ends an open drag in any phase that has one.
    pub fn pointer_up(&mut self) {
        if let Some(tracker) = self.tracker_mut() {
            tracker.end();
        }
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        if let Some(tracker) = self.tracker_mut() {
            tracker.exit();
        }
    }

    /// Drop the selection. Returns `false` when there is nothing editable.
    pub fn clear_selection(&mut self) -> bool {
        if let State::Editing { tracker, .. } = &mut self.state {
            tracker.clear();
            true
        } else {
            false
        }
    }

    /// Whether the submit action should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        match &self.state {
            State::Editing { source, tracker } if !tracker.is_dragging() => tracker
                .selection()
                .is_some_and(|r| r.covers_pixels(source.dims)),
            _ => false,
        }
    }

    /// Build the request for the current selection and mark it in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] without an image or selection,
    /// [`Error::SelectionInProgress`] while a drag is open,
    /// [`Error::EmptySelection`] for a selection that covers no pixel,
    /// [`Error::RequestPending`] or [`Error::ResultShown`] in the wrong phase.
    /// Errors are also kept as the session's user-facing message and leave the
    /// session otherwise unchanged.
    pub fn submit(&mut self) -> Result<InpaintRequest> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                warn!("submit rejected: {e}");
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        self.state = match std::mem::replace(&mut self.state, State::Empty) {
            State::Editing { source, tracker } => State::Submitting { source, tracker },
            other => other,
        };
        self.error = None;
        info!(
            "submitting {}x{} image with {} byte mask",
            request.dimensions.width(),
            request.dimensions.height(),
            request.mask.len()
        );
        Ok(request)
    }

    fn build_request(&self) -> Result<InpaintRequest> {
        let (source, tracker) = match &self.state {
            State::Empty => return Err(Error::MissingInput),
            State::Submitting { .. } => return Err(Error::RequestPending),
            State::ResultReady { .. } => return Err(Error::ResultShown),
            State::Editing { source, tracker } => (source, tracker),
        };
        if tracker.is_dragging() {
            return Err(Error::SelectionInProgress);
        }
        let rect = tracker.selection().ok_or(Error::MissingInput)?;
        if !rect.covers_pixels(source.dims) {
            return Err(Error::EmptySelection);
        }
        let mask = mask::encode_png(&mask::rasterize(source.dims, Some(&rect)))?;
        Ok(InpaintRequest {
            image: source.bytes.clone(),
            image_format: source.format,
            mask,
            prompt: normalize_prompt(&self.prompt),
            dimensions: source.dims,
        })
    }

    /// Deliver the service's answer for the pending request.
    ///
    /// On success the result is decoded once and cached, and selection is
    /// locked. On failure, including an undecodable result, the session
    /// returns to editing with the selection intact so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSubmitting`] when no request is pending, or the
    /// failure itself ([`Error::InpaintFailed`] or [`Error::Decode`]).
    pub fn complete(
        &mut self,
        outcome: std::result::Result<Vec<u8>, InpaintFailure>,
    ) -> Result<()> {
        let (source, mut tracker) = match std::mem::replace(&mut self.state, State::Empty) {
            State::Submitting { source, tracker } => (source, tracker),
            other => {
                self.state = other;
                return Err(Error::NotSubmitting);
            }
        };

        let processed = outcome
            .map_err(|failure| Error::InpaintFailed(failure.0))
            .and_then(|bytes| ProcessedImage::decode(bytes, source.dims));

        match processed {
            Ok(result) => {
                info!("inpainting result ready");
                tracker.lock();
                self.state = State::ResultReady {
                    source,
                    tracker,
                    result,
                };
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("inpainting failed: {e}");
                self.state = State::Editing { source, tracker };
                self.error = Some(INPAINT_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Submit and wait for `inpainter` in one step.
    ///
    /// # Errors
    ///
    /// Returns any error from [`submit`](Self::submit) or [`complete`](Self::complete).
    pub fn run(&mut self, inpainter: &impl Inpainter) -> Result<()> {
        let request = self.submit()?;
        let outcome = inpainter.inpaint(&request);
        self.complete(outcome)
    }

    /// Forget the image, selection, result, prompt and message.
    pub fn reset(&mut self) {
        debug!("session reset");
        self.state = State::Empty;
        self.prompt.clear();
        self.error = None;
    }

    /// The frame to display: the cached result, or the source with the
    /// selection overlay. `None` before an image is loaded.
    #[must_use]
    pub fn render(&self) -> Option<RgbaImage> {
        match &self.state {
            State::Empty => None,
            State::ResultReady { result, .. } => Some(result.pixels.clone()),
            State::Editing { source, tracker } | State::Submitting { source, tracker } => {
                let mut frame = source.pixels.clone();
                if let Some(rect) = tracker.selection() {
                    overlay::draw_selection(&mut frame, &rect, &self.config.overlay);
                }
                Some(frame)
            }
        }
    }

    /// Bytes of the processed image as returned by the service.
    #[must_use]
    pub fn result_bytes(&self) -> Option<&[u8]> {
        match &self.state {
            State::ResultReady { result, .. } => Some(&result.bytes),
            _ => None,
        }
    }

    /// The processed image as PNG at the source dimensions, ready to be saved
    /// as [`DOWNLOAD_FILE_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoResult`] when no result is shown, or
    /// [`Error::Image`] if encoding fails.
    pub fn result_png(&self) -> Result<Vec<u8>> {
        let State::ResultReady { result, .. } = &self.state else {
            return Err(Error::NoResult);
        };
        let mut bytes = Vec::new();
        result
            .pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

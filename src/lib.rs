//! Select a watermark on an image and build the mask an inpainting service
//! needs to erase it.
//!
//! The user drags a rectangle over an image shown at some on-screen scale.
//! Pointer positions are mapped to image pixels, accumulated into a single
//! selection, and rasterized into a black/white mask the same size as the
//! image. The image, the mask and optional guidance text are then handed to an
//! external [`Inpainter`].
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_eraser::{DisplayGeometry, Point, Session};
//!
//! let mut session = Session::default();
//! let dims = session.load_image(std::fs::read("photo.png").unwrap()).unwrap();
//!
//! // Canvas shown 400px wide inside an 800x600 layout slot.
//! let geom = DisplayGeometry::fit_within(dims, 400.0, 600.0);
//! session.pointer_down(Point::new(50.0, 50.0), &geom);
//! session.pointer_move(Point::new(150.0, 125.0), &geom);
//! session.pointer_up();
//!
//! let request = session.submit().unwrap();
//! std::fs::write("mask.png", &request.mask).unwrap();
//! ```
//!
//! # Masks without a session
//!
//! ```
//! use watermark_eraser::{mask, ImageDimensions, SelectionRect};
//!
//! let dims = ImageDimensions::new(800, 600).unwrap();
//! let rect = SelectionRect { x: 100.0, y: 100.0, width: 200.0, height: 150.0 };
//! let m = mask::rasterize(dims, Some(&rect));
//! assert_eq!(mask::edit_pixel_count(&m), 200 * 150);
//! ```

#![deny(missing_docs)]

pub mod error;
mod export;
pub mod geometry;
pub mod inpaint;
pub mod mask;
pub mod overlay;
pub mod selection;
mod session;
pub mod upload;

pub use export::{
    default_mask_path, export_directory, export_file, is_supported_image, preview_path,
    prompt_path, save_image, ExportOptions, ExportResult,
};
pub use error::{Error, Result};
pub use geometry::{DisplayGeometry, ImageDimensions, Point, SelectionRect};
pub use inpaint::{InpaintFailure, InpaintRequest, Inpainter};
pub use selection::{SelectionTracker, TrackerState};
pub use session::{
    Phase, Session, SessionConfig, DOWNLOAD_FILE_NAME, INPAINT_FAILED_MESSAGE,
};
pub use upload::UploadPolicy;

//! File-level mask export: load an image, replay a selection gesture and
//! write the inpainting mask (plus optional preview and prompt) to disk.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::{DisplayGeometry, ImageDimensions, Point, SelectionRect};
use crate::session::{Session, SessionConfig};

/// Options controlling mask export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Where the drag gesture starts.
    pub from: Point,
    /// Where the drag gesture is released.
    pub to: Point,
    /// On-screen canvas size the gesture coordinates refer to.
    /// `None` means the coordinates are already image pixels.
    pub display: Option<(f32, f32)>,
    /// Guidance text, written next to the mask when present.
    pub prompt: Option<String>,
    /// Also write the selection overlay preview.
    pub preview: bool,
    /// Session settings (upload limits, overlay style).
    pub session: SessionConfig,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl ExportOptions {
    /// Gesture spanning an image-space rectangle.
    #[must_use]
    pub fn with_rect(mut self, rect: SelectionRect) -> Self {
        self.from = Point::new(rect.x, rect.y);
        self.to = Point::new(rect.x + rect.width, rect.y + rect.height);
        self
    }

    fn geometry(&self, native: ImageDimensions) -> DisplayGeometry {
        match self.display {
            Some((displayed_width, displayed_height)) => DisplayGeometry {
                origin: Point::default(),
                displayed_width,
                displayed_height,
                native,
            },
            None => DisplayGeometry::identity(native),
        }
    }
}

/// Result of exporting a mask for a single image file.
#[derive(Debug)]
pub struct ExportResult {
    /// Path of the source image.
    pub path: PathBuf,
    /// Whether export succeeded.
    pub success: bool,
    /// Whether the file was skipped (empty selection).
    pub skipped: bool,
    /// Committed selection in image pixels.
    pub selection: Option<SelectionRect>,
    /// Human-readable status message.
    pub message: String,
}

impl ExportResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            skipped: false,
            selection: None,
            message: String::new(),
        }
    }
}

/// Export the mask for one image file.
///
/// `output` receives the PNG mask. A zero-area selection is reported as
/// skipped rather than failed.
#[must_use]
pub fn export_file(input: &Path, output: &Path, opts: &ExportOptions) -> ExportResult {
    let mut result = ExportResult::new(input);

    if ImageFormat::from_path(output).ok() != Some(ImageFormat::Png) {
        result.message = format!("Mask output must be a .png file: {}", output.display());
        return result;
    }

    let bytes = match std::fs::read(input) {
        Ok(b) => b,
        Err(e) => {
            result.message = format!("Failed to read: {e}");
            return result;
        }
    };

    let mut session = Session::new(opts.session.clone());
    let dims = match session.load_image(bytes) {
        Ok(d) => d,
        Err(e) => {
            result.message = format!("Failed to load: {e}");
            return result;
        }
    };

    let geom = opts.geometry(dims);
    if !geom.is_valid() {
        result.message = "Display size must be positive".to_string();
        return result;
    }

    session.pointer_down(opts.from, &geom);
    session.pointer_move(opts.to, &geom);
    session.pointer_up();
    result.selection = session.selection();
    debug!("{}: selection {:?}", input.display(), result.selection);

    if !session.can_submit() {
        result.skipped = true;
        result.success = true;
        result.message = "Selection is empty, nothing to mask".to_string();
        return result;
    }

    if let Some(prompt) = &opts.prompt {
        session.set_prompt(prompt.as_str());
    }
    // Render before submitting so the preview shows the selection overlay.
    let preview = if opts.preview { session.render() } else { None };

    let request = match session.submit() {
        Ok(r) => r,
        Err(e) => {
            result.message = format!("Failed to build mask: {e}");
            return result;
        }
    };

    let written = write_outputs(output, &request.mask, request.prompt.as_deref(), preview.as_ref());
    match written {
        Ok(()) => {
            info!("wrote mask {}", output.display());
            result.success = true;
            result.message = "Mask written".to_string();
        }
        Err(e) => {
            result.message = format!("Failed to save: {e}");
        }
    }

    result
}

fn write_outputs(
    output: &Path,
    mask: &[u8],
    prompt: Option<&str>,
    preview: Option<&RgbaImage>,
) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, mask)?;
    if let Some(prompt) = prompt {
        std::fs::write(prompt_path(output), prompt)?;
    }
    if let Some(frame) = preview {
        save_image(frame, &preview_path(output))?;
    }
    Ok(())
}

/// Export masks for all supported images in a directory.
///
/// Uses parallel iteration when the `cli` feature is enabled (via rayon).
/// Returns an [`ExportResult`] for each image found.
#[must_use]
pub fn export_directory(input_dir: &Path, output_dir: &Path, opts: &ExportOptions) -> Vec<ExportResult> {
    let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
        Ok(rd) => rd
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| is_supported_image(p))
            .collect(),
        Err(e) => {
            let mut failed = ExportResult::new(input_dir);
            failed.message = format!("Failed to read directory: {e}");
            return vec![failed];
        }
    };

    if !output_dir.exists() {
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            let mut failed = ExportResult::new(output_dir);
            failed.message = format!("Failed to create output directory: {e}");
            return vec![failed];
        }
    }

    let export_one = |input: &PathBuf| {
        let output = output_dir.join(mask_file_name(input));
        export_file(input, &output, opts)
    };

    #[cfg(feature = "cli")]
    {
        use rayon::prelude::*;
        entries.par_iter().map(export_one).collect()
    }

    #[cfg(not(feature = "cli"))]
    {
        entries.iter().map(export_one).collect()
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
        ),
        None => false,
    }
}

fn mask_file_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}_mask.png")
}

/// Generate a default mask path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_mask.png"`.
#[must_use]
pub fn default_mask_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(mask_file_name(input))
}

/// Preview image written next to a mask: `"photo_mask.png"` becomes `"photo_mask_preview.png"`.
#[must_use]
pub fn preview_path(mask: &Path) -> PathBuf {
    let stem = mask.file_stem().unwrap_or_default().to_string_lossy();
    mask.with_file_name(format!("{stem}_preview.png"))
}

/// Prompt text written next to a mask: `"photo_mask.png"` becomes `"photo_mask.txt"`.
#[must_use]
pub fn prompt_path(mask: &Path) -> PathBuf {
    mask.with_extension("txt")
}

/// Save an RGBA frame with format-specific settings.
///
/// JPEG has no alpha channel, so frames are flattened to RGB first.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgba8(img.clone());

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 95);
            encoder.encode_image(&dyn_img.to_rgb8())?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

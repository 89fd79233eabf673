//! Image-space geometry and the display-to-image coordinate mapper.
//!
//! The image is shown on a canvas whose backing store has the image's native
//! size but whose on-screen size is scaled to fit the available space. Pointer
//! events arrive in on-screen pixels; everything downstream (selection, mask)
//! works in native image pixels.

/// Natural pixel size of a loaded image. Both sides are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDimensions {
    width: u32,
    height: u32,
}

impl ImageDimensions {
    /// Create dimensions, returning `None` when either side is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }

    /// Number of pixels.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f32(self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

/// A position in either display or image space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, width] x [0, height]` of the given image.
    #[must_use]
    pub fn clamped_to(self, dims: ImageDimensions) -> Self {
        let (w, h) = dims.as_f32();
        Self {
            x: self.x.clamp(0.0, w),
            y: self.y.clamp(0.0, h),
        }
    }
}

/// An axis-aligned selection in image-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width, never negative.
    pub width: f32,
    /// Height, never negative.
    pub height: f32,
}

impl SelectionRect {
    /// Normalized rectangle spanned by two opposite corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// The rectangle covering the whole image.
    #[must_use]
    pub fn full(dims: ImageDimensions) -> Self {
        let (width, height) = dims.as_f32();
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Area in square pixels.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// A click without a drag produces a rectangle with no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Clip the rectangle so it lies inside the image.
    #[must_use]
    pub fn clamped_to(&self, dims: ImageDimensions) -> Self {
        let top_left = Point::new(self.x, self.y).clamped_to(dims);
        let bottom_right = Point::new(self.x + self.width, self.y + self.height).clamped_to(dims);
        Self::from_corners(top_left, bottom_right)
    }

    /// Integer pixel range `[x0, x1) x [y0, y1)` covered by the rectangle.
    ///
    /// A pixel at integer coordinate `px` is covered when
    /// `x <= px < x + width`, which makes the range `[ceil(x), ceil(x + width))`.
    /// The range is clipped to the image and may be empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_bounds(&self, dims: ImageDimensions) -> (u32, u32, u32, u32) {
        let to_px = |v: f32, limit: u32| (v.max(0.0).ceil() as u32).min(limit);
        let x0 = to_px(self.x, dims.width());
        let y0 = to_px(self.y, dims.height());
        let x1 = to_px(self.x + self.width, dims.width()).max(x0);
        let y1 = to_px(self.y + self.height, dims.height()).max(y0);
        (x0, y0, x1, y1)
    }

    /// Whether at least one pixel falls inside the rectangle.
    ///
    /// A rectangle can have positive area yet cover no pixel, e.g.
    /// `{10.5, 10.5, 0.4, 0.4}`; its mask would select nothing.
    #[must_use]
    pub fn covers_pixels(&self, dims: ImageDimensions) -> bool {
        let (x0, y0, x1, y1) = self.pixel_bounds(dims);
        x0 < x1 && y0 < y1
    }
}

/// How an image is placed on screen: where the canvas starts and how large
/// it is drawn, versus the native size of its backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    /// Top-left corner of the canvas in pointer coordinates.
    pub origin: Point,
    /// On-screen width of the canvas.
    pub displayed_width: f32,
    /// On-screen height of the canvas.
    pub displayed_height: f32,
    /// Native image size backing the canvas.
    pub native: ImageDimensions,
}

impl DisplayGeometry {
    /// Geometry where the image is shown at its native size with no offset.
    #[must_use]
    pub fn identity(native: ImageDimensions) -> Self {
        let (displayed_width, displayed_height) = native.as_f32();
        Self {
            origin: Point::default(),
            displayed_width,
            displayed_height,
            native,
        }
    }

    /// Fit the image into a container while preserving its aspect ratio.
    ///
    /// A container wider than the image's aspect ratio is height-bound,
    /// otherwise the canvas spans the container width.
    #[must_use]
    pub fn fit_within(native: ImageDimensions, container_width: f32, container_height: f32) -> Self {
        let (w, h) = native.as_f32();
        let image_ratio = w / h;
        let container_ratio = container_width / container_height;
        let (displayed_width, displayed_height) = if container_ratio > image_ratio {
            (container_height * image_ratio, container_height)
        } else {
            (container_width, container_width / image_ratio)
        };
        Self {
            origin: Point::default(),
            displayed_width,
            displayed_height,
            native,
        }
    }

    /// Same geometry with the canvas placed at `origin`.
    #[must_use]
    pub fn with_origin(self, origin: Point) -> Self {
        Self { origin, ..self }
    }

    /// Whether the canvas has a positive on-screen size.
    ///
    /// [`map_to_image`](Self::map_to_image) must only be called on valid geometry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.displayed_width > 0.0 && self.displayed_height > 0.0
    }

    /// Map a pointer position to native image pixels.
    ///
    /// Each axis is scaled independently. The result is not clamped, so a
    /// pointer outside the canvas maps outside the image.
    ///
    /// Precondition: [`is_valid`](Self::is_valid) holds. With a zero displayed
    /// size the division produces infinities or NaN.
    #[must_use]
    pub fn map_to_image(&self, pointer: Point) -> Point {
        let (native_w, native_h) = self.native.as_f32();
        Point {
            x: (pointer.x - self.origin.x) * (native_w / self.displayed_width),
            y: (pointer.y - self.origin.y) * (native_h / self.displayed_height),
        }
    }
}

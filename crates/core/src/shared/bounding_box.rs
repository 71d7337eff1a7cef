use serde::{Deserialize, Serialize};

/// Fractional face rectangle as reported by the recognition service.
///
/// All four values are relative to the source image dimensions. Boxes are
/// trusted as produced; `left + width <= 1` and `top + height <= 1` are not
/// enforced locally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Absolute pixel rectangle: upper-left `(x0, y0)`, lower-right `(x1, y1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Scales the box to pixel coordinates of a `image_width` x `image_height` image.
    ///
    /// Malformed boxes yield degenerate or inverted rectangles; no error is raised.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        let w = image_width as f64;
        let h = image_height as f64;
        let x0 = self.left * w;
        let y0 = self.top * h;
        PixelRect {
            x0,
            y0,
            x1: x0 + self.width * w,
            y1: y0 + self.height * h,
        }
    }
}

impl PixelRect {
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x0, self.y0, self.x1, self.y1)
    }
}

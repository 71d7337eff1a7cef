use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;

use crate::imaging::domain::image_loader::{ImageLoadError, ImageLoader};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::BOX_OUTLINE_RGB;

#[derive(Error, Debug)]
pub enum DrawError {
    #[error(transparent)]
    Load(#[from] ImageLoadError),
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Decodes raw image bytes (any format the `image` crate recognises) to RGB.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, DrawError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(DrawError::Decode)
}

/// Draws a one-pixel outline of `bbox` onto `image` and returns it for chaining.
///
/// The outline is clipped to the image; inverted or empty rectangles draw
/// whatever part of their edges falls inside, without failing.
pub fn draw_rectangle<'a>(image: &'a mut RgbImage, bbox: &BoundingBox) -> &'a mut RgbImage {
    let rect = bbox.to_pixel_rect(image.width(), image.height());
    // Edges past the image are pinned one pixel outside it so they stay hidden.
    let max_x = f64::from(image.width());
    let max_y = f64::from(image.height());
    let pin = |v: f64, max: f64| v.round().clamp(-1.0, max) as i32;
    let x0 = pin(rect.x0.min(rect.x1), max_x);
    let x1 = pin(rect.x0.max(rect.x1), max_x);
    let y0 = pin(rect.y0.min(rect.y1), max_y);
    let y1 = pin(rect.y0.max(rect.y1), max_y);

    let outline = Rect::at(x0, y0).of_size((x1 - x0) as u32 + 1, (y1 - y0) as u32 + 1);
    draw_hollow_rect_mut(image, outline, Rgb(BOX_OUTLINE_RGB));
    image
}

/// Loads `reference`, outlines every box on it and saves the result to `output`.
pub fn annotate(
    loader: &dyn ImageLoader,
    reference: &str,
    boxes: &[BoundingBox],
    output: &Path,
) -> Result<(), DrawError> {
    let bytes = loader.load(reference)?;
    let mut image = decode_image(&bytes)?;
    for bbox in boxes {
        draw_rectangle(&mut image, bbox);
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| DrawError::Save {
            path: output.display().to_string(),
            source: Box::new(e),
        })?;
    }
    image.save(output).map_err(|e| DrawError::Save {
        path: output.display().to_string(),
        source: Box::new(e),
    })?;
    log::info!("Annotated image written to {}", output.display());
    Ok(())
}

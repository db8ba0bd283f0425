use std::path::Path;

use image::{GrayImage, ImageFormat};
use ndarray::Array2;

use crate::consts::EPSILON;
use crate::error::{ParallaxError, Result};
use crate::frame::{is_special, Frame};

/// Load a single-band image file into a Frame.
///
/// Integer formats are scaled to [0, 1]; float formats keep their values,
/// including NaN special pixels.
pub fn load_image(path: &Path) -> Result<Frame> {
    if !path.is_file() {
        return Err(ParallaxError::InputMissing(path.to_path_buf()));
    }
    let gray = image::open(path)?.to_luma32f();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in gray.enumerate_pixels() {
        data[[row as usize, col as usize]] = pixel.0[0];
    }

    Ok(Frame::new(data))
}

/// Scale a frame into 8 bits using a fixed `[lo, hi]` range.
///
/// Special pixels become 0; everything else is normalized to [0, 1],
/// clamped, then scaled to [0, 255].
pub fn normalize_to_u8(frame: &Frame, lo: f32, hi: f32) -> Array2<u8> {
    let span = (hi - lo).max(EPSILON);
    frame.data.mapv(|v| {
        if is_special(v) {
            0
        } else {
            (((v - lo) / span).clamp(0.0, 1.0) * 255.0).round() as u8
        }
    })
}

/// Save an 8-bit grayscale array as TIFF.
pub fn save_u8_tiff(data: &Array2<u8>, path: &Path) -> Result<()> {
    to_gray_image(data).save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a frame already in [0, 1] as 8-bit grayscale, choosing format from
/// the file extension.
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    let data = normalize_to_u8(frame, 0.0, 1.0);
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => ImageFormat::Png,
        _ => ImageFormat::Tiff,
    };
    to_gray_image(&data).save_with_format(path, format)?;
    Ok(())
}

fn to_gray_image(data: &Array2<u8>) -> GrayImage {
    let (h, w) = data.dim();
    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &val) in data.indexed_iter() {
        img.put_pixel(col as u32, row as u32, image::Luma([val]));
    }
    img
}

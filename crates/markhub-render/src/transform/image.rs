//! Image structural transforms: crop, resize, rotate.

use std::io::Cursor;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;

/// Image format for a file extension, defaulting to PNG.
pub fn format_for_extension(ext: &str) -> ImageFormat {
    ImageFormat::from_extension(ext).unwrap_or(ImageFormat::Png)
}

fn decode(doc: &Bytes) -> AppResult<DynamicImage> {
    image::load_from_memory(doc).map_err(|e| {
        AppError::with_source(ErrorKind::Validation, "Failed to decode image document", e)
    })
}

fn encode(img: DynamicImage, format: ImageFormat) -> AppResult<Bytes> {
    // JPEG has no alpha channel.
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to encode image", e))?;
    Ok(Bytes::from(out.into_inner()))
}

/// Crop to the box `(left, top)`..`(right, bottom)` in pixels.
pub fn crop(
    doc: &Bytes,
    format: ImageFormat,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
) -> AppResult<Bytes> {
    let img = decode(doc)?;
    let (width, height) = (img.width(), img.height());
    if left >= right || top >= bottom || right > width || bottom > height {
        return Err(AppError::validation(format!(
            "Invalid crop box ({left}, {top}, {right}, {bottom}) for {width}x{height} image"
        )));
    }
    encode(
        img.crop_imm(left, top, right - left, bottom - top),
        format,
    )
}

/// Resize to exactly `width` x `height` pixels.
pub fn resize(doc: &Bytes, format: ImageFormat, width: u32, height: u32) -> AppResult<Bytes> {
    if width == 0 || height == 0 {
        return Err(AppError::validation("Resize dimensions must be non-zero"));
    }
    let img = decode(doc)?;
    encode(img.resize_exact(width, height, FilterType::Lanczos3), format)
}

/// Rotate clockwise by `angle` degrees (90, 180, or 270).
pub fn rotate(doc: &Bytes, format: ImageFormat, angle: i32) -> AppResult<Bytes> {
    let img = decode(doc)?;
    let rotated = match angle {
        90 => img.rotate90(),
        180 => img.rotate180(),
        270 => img.rotate270(),
        other => {
            return Err(AppError::validation(format!(
                "Rotation angle must be 90, 180 or 270, got {other}"
            )));
        }
    };
    encode(rotated, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample(width: u32, height: u32) -> Bytes {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[test]
    fn test_crop_bounds_checked() {
        let doc = sample(10, 10);
        assert!(crop(&doc, ImageFormat::Png, 2, 2, 8, 8).is_ok());
        assert!(crop(&doc, ImageFormat::Png, 8, 8, 2, 2).is_err());
        assert!(crop(&doc, ImageFormat::Png, 0, 0, 11, 5).is_err());
    }

    #[test]
    fn test_crop_dimensions() {
        let doc = sample(10, 10);
        let out = crop(&doc, ImageFormat::Png, 2, 3, 8, 7).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (6, 4));
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let doc = sample(10, 4);
        let out = rotate(&doc, ImageFormat::Png, 90).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (4, 10));

        // The top-left marker moves to the top-right corner.
        let rgba = img.to_rgba8();
        assert_eq!(*rgba.get_pixel(3, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_resize_exact() {
        let doc = sample(10, 10);
        let out = resize(&doc, ImageFormat::Png, 5, 7).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (5, 7));
        assert!(resize(&doc, ImageFormat::Png, 0, 7).is_err());
    }
}

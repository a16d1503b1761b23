//! Image tensor conversion and resizing

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat as CodecFormat, RgbImage};
use ndarray::{Array4, ArrayView3};

use crate::error::{NodeError, Result};
use crate::types::{ImageTensor, RGB_CHANNELS};

/// Encoded image formats accepted by the vendor API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    const fn codec(&self) -> CodecFormat {
        match self {
            Self::Png => CodecFormat::Png,
            Self::Jpeg => CodecFormat::Jpeg,
        }
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert one `(height, width, 3)` frame to an 8-bit RGB image
pub fn frame_to_image(frame: ArrayView3<'_, f32>) -> Result<RgbImage> {
    let (height, width, channels) = frame.dim();
    if channels != RGB_CHANNELS {
        return Err(NodeError::InvalidShape(format!(
            "expected {RGB_CHANNELS} channels, got {channels}"
        )));
    }
    let width = u32::try_from(width)
        .map_err(|_| NodeError::InvalidShape(format!("frame width {width} too large")))?;
    let height = u32::try_from(height)
        .map_err(|_| NodeError::InvalidShape(format!("frame height {height} too large")))?;

    let mut image = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let (row, col) = (y as usize, x as usize);
        for c in 0..RGB_CHANNELS {
            pixel[c] = to_u8(frame[(row, col, c)]);
        }
    }
    Ok(image)
}

/// First frame of a tensor as an 8-bit RGB image
pub fn tensor_to_image(tensor: &ImageTensor) -> Result<RgbImage> {
    frame_to_image(tensor.frame(0)?)
}

/// Encode an RGB image
pub fn encode_image(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format.codec())?;
    Ok(buffer.into_inner())
}

/// Encode the first frame of `tensor` in the requested byte format
pub fn image_tensor_to_bytes(tensor: &ImageTensor, format: ImageFormat) -> Result<Vec<u8>> {
    encode_image(&tensor_to_image(tensor)?, format)
}

/// Shrink so the longer side equals `max_size`; never upscales
///
/// The shorter side is scaled proportionally and truncated (at least 1).
pub fn resize_longest_side(image: &RgbImage, max_size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_size || max_size == 0 {
        return image.clone();
    }

    let scale = |side: u32| -> u32 {
        let scaled = u64::from(max_size) * u64::from(side) / u64::from(longest);
        (scaled as u32).max(1)
    };
    let (new_width, new_height) = if width >= height {
        (max_size, scale(height))
    } else {
        (scale(width), max_size)
    };

    imageops::resize(image, new_width, new_height, FilterType::Lanczos3)
}

/// Convert an RGB image into a `(1, height, width, 3)` tensor in `[0, 1]`
pub fn image_to_tensor(image: &RgbImage) -> Result<ImageTensor> {
    let (width, height) = image.dimensions();
    let data: Vec<f32> = image.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
    let frames = Array4::from_shape_vec((1, height as usize, width as usize, RGB_CHANNELS), data)
        .map_err(|e| NodeError::InvalidShape(e.to_string()))?;
    Ok(ImageTensor::from_frames(frames))
}

/// Decode image bytes (any supported codec) into a tensor
pub fn bytes_to_image_tensor(bytes: &[u8]) -> Result<ImageTensor> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    image_to_tensor(&image)
}

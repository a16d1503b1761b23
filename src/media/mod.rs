//! Media conversion between host tensors and wire formats
//!
//! - [`image`]: image tensor ↔ PNG/JPEG bytes, longest-side resizing
//! - [`audio`]: waveform → mono 16 kHz 16-bit WAV
//! - [`video`]: frame sampling for video batches

pub mod audio;
pub mod image;
pub mod video;

pub use self::audio::{TARGET_SAMPLE_RATE, WAV_MIME_TYPE, normalize_audio};
pub use self::image::{
    ImageFormat, bytes_to_image_tensor, encode_image, image_tensor_to_bytes, image_to_tensor,
    resize_longest_side, tensor_to_image,
};
pub use self::video::{frame_count, image_tensor_frame, sample_frame_indices, sample_frames};

/// Longest side of a single image sent to the API
pub const IMAGE_MAX_SIZE: u32 = 1024;

/// Longest side of each sampled video frame
pub const VIDEO_FRAME_MAX_SIZE: u32 = 256;

/// Upper bound on frames sampled from one video
pub const MAX_VIDEO_FRAMES: usize = 10;

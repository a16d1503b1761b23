//! Frame sampling for video batches

use image::RgbImage;

use super::image::{frame_to_image, resize_longest_side};
use crate::error::Result;
use crate::types::ImageTensor;

/// Evenly strided frame indices
///
/// `stride = max(1, frame_count / max_frames)`; indices `0, stride, 2*stride, ...`
/// truncated to `max_frames` entries.
pub fn sample_frame_indices(frame_count: usize, max_frames: usize) -> Vec<usize> {
    if frame_count == 0 || max_frames == 0 {
        return Vec::new();
    }
    let stride = (frame_count / max_frames).max(1);
    (0..frame_count).step_by(stride).take(max_frames).collect()
}

/// Number of frames in a video tensor
pub fn frame_count(tensor: &ImageTensor) -> Result<usize> {
    tensor.frame_count()
}

/// One frame of a video tensor as an RGB image
pub fn image_tensor_frame(tensor: &ImageTensor, index: usize) -> Result<RgbImage> {
    frame_to_image(tensor.frame(index)?)
}

/// Sampled frames, each shrunk so its longer side is at most `max_size`
pub fn sample_frames(
    tensor: &ImageTensor,
    max_frames: usize,
    max_size: u32,
) -> Result<Vec<RgbImage>> {
    let count = tensor.frame_count()?;
    sample_frame_indices(count, max_frames)
        .into_iter()
        .map(|index| Ok(resize_longest_side(&image_tensor_frame(tensor, index)?, max_size)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_stride_for_37_frames() {
        assert_eq!(
            sample_frame_indices(37, 10),
            vec![0, 3, 6, 9, 12, 15, 18, 21, 24, 27]
        );
    }

    #[test]
    fn test_short_videos_use_every_frame() {
        assert_eq!(sample_frame_indices(4, 10), vec![0, 1, 2, 3]);
        assert_eq!(sample_frame_indices(10, 10), (0..10).collect::<Vec<_>>());
        assert!(sample_frame_indices(0, 10).is_empty());
    }

    #[test]
    fn test_sample_frames_resizes() {
        let mut frames = Array4::<f32>::zeros((12, 40, 600, 3));
        frames.slice_mut(ndarray::s![1, .., .., 0]).fill(1.0);
        let tensor = ImageTensor::from_frames(frames);

        let sampled = sample_frames(&tensor, 10, 256).unwrap();
        assert_eq!(sampled.len(), 10);
        assert!(sampled.iter().all(|img| img.dimensions() == (256, 17)));
        assert!(sampled[1].get_pixel(0, 0)[0] >= 250);
        assert_eq!(sampled[0].get_pixel(0, 0)[0], 0);
    }
}

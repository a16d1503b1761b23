//! Host tensor containers
//!
//! The host hands images around as normalized float tensors shaped
//! `(batch, height, width, channels)` and audio as a waveform plus sample
//! rate. These wrappers keep the raw `ndarray` data and validate shape at
//! the point of use rather than at construction, so a malformed tensor
//! surfaces as a typed error from the operation that needs it.

use ndarray::{Array4, ArrayD, ArrayView3, Axis, Ix3, Ix4};

use crate::error::{NodeError, Result};

/// Number of color channels an image tensor must carry (RGB)
pub const RGB_CHANNELS: usize = 3;

/// Normalized float image tensor (values in `[0, 1]`, RGB channel order)
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor(ArrayD<f32>);

impl ImageTensor {
    /// Wrap an arbitrary-rank array; shape is validated lazily
    pub fn new(data: ArrayD<f32>) -> Self {
        Self(data)
    }

    /// Wrap a batch of frames
    pub fn from_frames(frames: Array4<f32>) -> Self {
        Self(frames.into_dyn())
    }

    /// A black batch of the given size
    pub fn zeros(batch: usize, height: usize, width: usize) -> Self {
        Self::from_frames(Array4::zeros((batch, height, width, RGB_CHANNELS)))
    }

    /// Raw shape
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    /// Borrow the underlying array
    pub fn as_array(&self) -> &ArrayD<f32> {
        &self.0
    }

    /// Take the underlying array
    pub fn into_array(self) -> ArrayD<f32> {
        self.0
    }

    /// Number of frames; a rank-3 tensor is a single frame
    pub fn frame_count(&self) -> Result<usize> {
        self.validate()?;
        Ok(match self.0.ndim() {
            3 => 1,
            _ => self.0.shape()[0],
        })
    }

    /// `(height, width)` of every frame
    pub fn dimensions(&self) -> Result<(usize, usize)> {
        self.validate()?;
        let shape = self.0.shape();
        let offset = self.0.ndim() - 3;
        Ok((shape[offset], shape[offset + 1]))
    }

    /// View of a single `(height, width, channels)` frame
    pub fn frame(&self, index: usize) -> Result<ArrayView3<'_, f32>> {
        let count = self.frame_count()?;
        if index >= count {
            return Err(NodeError::InvalidShape(format!(
                "frame index {index} out of range for batch of {count}"
            )));
        }
        let view = self.0.view();
        match self.0.ndim() {
            3 => view
                .into_dimensionality::<Ix3>()
                .map_err(|e| NodeError::InvalidShape(e.to_string())),
            _ => {
                let batch = view
                    .into_dimensionality::<Ix4>()
                    .map_err(|e| NodeError::InvalidShape(e.to_string()))?;
                Ok(batch.index_axis_move(Axis(0), index))
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let shape = self.0.shape();
        if shape.len() != 3 && shape.len() != 4 {
            return Err(NodeError::InvalidShape(format!(
                "expected rank 3 or 4 image tensor, got shape {shape:?}"
            )));
        }
        let channels = shape[shape.len() - 1];
        if channels != RGB_CHANNELS {
            return Err(NodeError::InvalidShape(format!(
                "expected {RGB_CHANNELS} channels, got {channels} (shape {shape:?})"
            )));
        }
        if shape.iter().any(|&d| d == 0) {
            return Err(NodeError::InvalidShape(format!(
                "image tensor has an empty dimension: {shape:?}"
            )));
        }
        Ok(())
    }
}

impl From<Array4<f32>> for ImageTensor {
    fn from(frames: Array4<f32>) -> Self {
        Self::from_frames(frames)
    }
}

/// Audio waveform container as produced by the host
///
/// Accepted waveform layouts: `(samples)`, `(channels, samples)` and
/// `(1, channels, samples)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioContainer {
    /// Sample data, nominally in `[-1, 1]`
    pub waveform: ArrayD<f32>,
    /// Samples per second
    pub sample_rate: u32,
}

impl AudioContainer {
    /// Create a new container
    pub fn new(waveform: ArrayD<f32>, sample_rate: u32) -> Self {
        Self {
            waveform,
            sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_frame_count_and_dimensions() {
        let batch = ImageTensor::zeros(4, 20, 30);
        assert_eq!(batch.frame_count().unwrap(), 4);
        assert_eq!(batch.dimensions().unwrap(), (20, 30));

        let single = ImageTensor::new(ArrayD::zeros(IxDyn(&[5, 6, 3])));
        assert_eq!(single.frame_count().unwrap(), 1);
        assert_eq!(single.frame(0).unwrap().shape(), &[5, 6, 3]);
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        let rank2 = ImageTensor::new(ArrayD::zeros(IxDyn(&[5, 6])));
        assert!(matches!(rank2.frame_count(), Err(NodeError::InvalidShape(_))));

        let rgba = ImageTensor::new(ArrayD::zeros(IxDyn(&[1, 5, 6, 4])));
        assert!(matches!(rgba.frame(0), Err(NodeError::InvalidShape(_))));

        let empty = ImageTensor::new(ArrayD::zeros(IxDyn(&[0, 5, 6, 3])));
        assert!(matches!(empty.frame_count(), Err(NodeError::InvalidShape(_))));
    }

    #[test]
    fn test_frame_index_out_of_range() {
        let batch = ImageTensor::zeros(2, 4, 4);
        assert!(batch.frame(1).is_ok());
        assert!(matches!(batch.frame(2), Err(NodeError::InvalidShape(_))));
    }
}

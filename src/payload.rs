//! Request assembly
//!
//! Turns a prompt, a selected [`Modality`] and the host-supplied payloads
//! into the ordered [`RequestPart`] list sent to the model.

use crate::error::{NodeError, Result};
use crate::media::{
    self, IMAGE_MAX_SIZE, ImageFormat, MAX_VIDEO_FRAMES, VIDEO_FRAME_MAX_SIZE, WAV_MIME_TYPE,
};
use crate::types::{ImageTensor, Modality, ModalityInput, RequestPart};

/// Build the ordered parts for one request
pub fn build_parts(
    prompt: &str,
    modality: Modality,
    input: &ModalityInput,
) -> Result<Vec<RequestPart>> {
    let parts = match modality {
        Modality::Text => text_parts(prompt, input.text.as_deref()),
        Modality::Image => {
            let image = input
                .image
                .as_ref()
                .ok_or_else(|| missing(Modality::Image))?;
            image_parts(prompt, image)?
        }
        Modality::Video => {
            let video = input
                .video
                .as_ref()
                .ok_or_else(|| missing(Modality::Video))?;
            video_parts(prompt, video)?
        }
        Modality::Audio => {
            let audio = input
                .audio
                .as_ref()
                .ok_or_else(|| missing(Modality::Audio))?;
            vec![
                RequestPart::text(prompt),
                RequestPart::audio(media::normalize_audio(audio)?, WAV_MIME_TYPE),
            ]
        }
    };

    tracing::debug!(
        modality = %modality,
        parts = parts.len(),
        media_parts = parts.iter().filter(|p| p.is_media()).count(),
        "built request parts"
    );
    Ok(parts)
}

fn missing(modality: Modality) -> NodeError {
    NodeError::MissingInput(format!(
        "input type '{modality}' selected but no {modality} was provided"
    ))
}

fn text_parts(prompt: &str, extra: Option<&str>) -> Vec<RequestPart> {
    let mut parts = vec![RequestPart::text(prompt)];
    if let Some(extra) = extra.filter(|t| !t.is_empty()) {
        parts.push(RequestPart::text(extra));
    }
    parts
}

/// Resize the first frame to [`IMAGE_MAX_SIZE`] and encode it as PNG
pub fn encode_for_request(image: &ImageTensor) -> Result<RequestPart> {
    let frame = media::tensor_to_image(image)?;
    encode_frame(&frame, IMAGE_MAX_SIZE)
}

fn encode_frame(frame: &::image::RgbImage, max_size: u32) -> Result<RequestPart> {
    let resized = media::resize_longest_side(frame, max_size);
    let format = ImageFormat::Png;
    Ok(RequestPart::image(
        media::encode_image(&resized, format)?,
        format.mime_type(),
    ))
}

fn image_parts(prompt: &str, image: &ImageTensor) -> Result<Vec<RequestPart>> {
    Ok(vec![RequestPart::text(prompt), encode_for_request(image)?])
}

fn video_parts(prompt: &str, video: &ImageTensor) -> Result<Vec<RequestPart>> {
    let count = video.frame_count()?;

    let mut parts = Vec::new();
    if count > 1 {
        let frames = media::sample_frames(video, MAX_VIDEO_FRAMES, VIDEO_FRAME_MAX_SIZE)?;
        parts.push(RequestPart::text(format!(
            "This is a video with {count} frames. The following are {} sampled frames:",
            frames.len()
        )));
        let format = ImageFormat::Png;
        for frame in &frames {
            parts.push(RequestPart::image(
                media::encode_image(frame, format)?,
                format.mime_type(),
            ));
        }
    } else {
        parts.push(RequestPart::text("This is a single frame from a video:"));
        parts.push(encode_frame(&media::image_tensor_frame(video, 0)?, IMAGE_MAX_SIZE)?);
    }
    parts.push(RequestPart::text(prompt));
    Ok(parts)
}

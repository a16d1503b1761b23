//! Host-facing nodes
//!
//! Each node exposes `DISPLAY_NAME` / `CATEGORY` for the host's registry, an
//! async entry method, and a `*_blocking` twin for synchronous hosts. The
//! blocking variants spin up a current-thread runtime and must not be called
//! from inside an existing tokio runtime.

mod flash;
mod image_editor;
mod image_generator;

pub use flash::{FlashRequest, GeminiFlash};
pub use image_editor::GeminiImageEditor;
pub use image_generator::{GeminiImageGenerator, ImageGeneration};

use std::future::Future;

use crate::error::Result;

pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

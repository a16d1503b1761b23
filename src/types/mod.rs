//! Core data types

pub mod options;
pub mod request;
pub mod result;
pub mod tensor;

pub use options::{GenerationOptions, ResponseModality, SafetyThreshold};
pub use request::{Modality, ModalityInput, RequestPart};
pub use result::{EditStatus, GenerationResult};
pub use tensor::{AudioContainer, ImageTensor, RGB_CHANNELS};

//! Vendor API clients

pub mod gemini;
pub mod http;

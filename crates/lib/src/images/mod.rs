//! Image generation capability and the OpenAI-compatible client.
//!
//! The intake worker only sees `ImageGenerator`; `OpenAiImageClient` talks to
//! `POST {base}/images/generations` and returns the first image URL.

mod generator;
mod openai;

pub use generator::{ImageError, ImageGenerator};
pub use openai::OpenAiImageClient;

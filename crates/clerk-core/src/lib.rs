pub mod audio;
pub mod error;
mod http;
pub mod pipeline;
pub mod prompt;
pub mod registry;
pub mod summarize;
pub mod transcribe;

pub use error::*;

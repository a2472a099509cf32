//! Document loading: file type detection, text extraction, caching

pub mod file_detector;
pub mod loader;
pub mod text_extractor;

pub use loader::DocumentLoader;

// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod compose;
pub mod config;
pub mod generate;
pub mod image;
pub mod ingest;
pub mod pipeline;
pub mod publish;
pub mod seen;

// ---- Re-exports for stable public API ----
pub use crate::compose::{split_generated, GenerationResult, DEFAULT_IMAGE_PROMPT, MARKER};
pub use crate::generate::{fallback_text, generate_post, GenerationOutcome, TextModel};
pub use crate::image::ImageModel;
pub use crate::ingest::types::{FeedEntry, NewsItem, SourceProvider};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::publish::Publisher;
pub use crate::seen::{MemorySeenStore, SeenSet, SeenStore};

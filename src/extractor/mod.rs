//! Chunk extraction.
//!
//! # Module Structure
//!
//! - `semantic`: primary extractor over content containers and selector groups
//! - `fallback`: text-node walker used when the primary extractor under-yields
//! - `heading`: contextual heading lookup shared by both
//!
//! Both extractors produce raw chunks: trimmed rendered text that has not been
//! whitespace-normalized, split or deduplicated beyond containment. That is
//! the job of [`crate::cleanup`].

mod fallback;
mod heading;
mod semantic;

pub use fallback::{extract_text_nodes, needs_fallback};
pub use heading::find_contextual_heading;
pub use semantic::{candidate_elements, extract_semantic};

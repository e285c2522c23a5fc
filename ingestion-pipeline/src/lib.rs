//! Turns a batch of uploaded PDFs into a searchable vector index: per-page
//! text extraction, chunking, and embedding.

pub mod pdf_extraction;
pub mod pipeline;

pub use pipeline::IngestionPipeline;

//! Cross-cutting utilities shared by the pipelines and the HTTP surface.

pub mod config;
pub mod embedding;

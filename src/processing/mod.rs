//! Text normalization, scoring and ranking

pub mod document;
pub mod normalizer;
pub mod keyword_matcher;
pub mod embeddings;
pub mod embedding_manager;
pub mod ranker;

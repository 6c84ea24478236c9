// src/extractors/mod.rs
pub mod filing;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use filing::{FilingExtractor, ListingPage, RowPair, RowSelection};

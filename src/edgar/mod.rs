// src/edgar/mod.rs
pub mod client;
pub mod listing;
pub mod models;

// Re-export the listing types the pipeline works with
#[allow(unused_imports)]
pub use self::{
    client::ListingClient,
    listing::Paginator,
    models::{Filing, PageCursor, PageSize, Timestamp},
};

//! Location-aware product page scraper.
//!
//! Fetches a retailer product page with the shopper's location cookies,
//! extracts a [`model::ProductRecord`] from the markup and serves it behind a
//! small JSON API.

pub mod api;
pub mod compose;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod model;
pub mod sanitize;
pub mod walmart;

pub use error::{ErrorKind, ScrapeError};
pub use model::{ConsiderationItem, Location, ProductRecord};

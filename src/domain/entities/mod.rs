//! Core domain entities.
//!
//! - [`UrlMapping`] - A committed short code / original URL pair

pub mod url_mapping;

pub use url_mapping::UrlMapping;

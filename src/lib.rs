//! Readable-content extraction for web pages
//!
//! Pulls the main readable content out of a parsed page, discarding
//! navigation, ads and other boilerplate:
//! - candidate selection over a fixed priority list of region selectors
//! - noise removal on a private clone of the page tree
//! - plain-text normalization (blank-line collapse, trimming)
//!
//! Plus the glue for shipping the result: a blocking sync client that posts
//! the record to the save endpoint, and API-key settings storage.

pub mod client;
pub mod extractor;
pub mod settings;
pub mod text;

pub use client::*;
pub use extractor::*;
pub use settings::*;
pub use text::*;

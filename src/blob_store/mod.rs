//! Record storage on top of the entropy coders
//!
//! The external container format delivers string columns as pages. This
//! module turns one page (or a batch of pages) into its ordered records.

pub mod page;

pub use page::{DecodedPage, Page, PageDecoder, StoreType};

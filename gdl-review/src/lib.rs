//! Review tool for a scraped dataset.
//!
//! Serves one image at a time with its caption so it can be edited, then confirmed (copied to the
//! refined dataset) or skipped. Decisions are kept in a JSON file so a session can be resumed.
pub mod dataset;
pub mod error;
pub mod page;
pub mod records;
pub mod server;

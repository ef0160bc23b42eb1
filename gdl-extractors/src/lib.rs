//! All internal logic for talking to the gallery website: listing feeds and gallery pages.

extern crate gdl_common;

pub mod error;
pub mod extractor;
pub mod extractor_config;
pub mod gallery;
pub mod listing;
pub mod prelude;

#[cfg(test)]
pub(crate) mod test_server;

//! Attribute Extractor - weighted character sheet draws
//!
//! Core library providing the draw/selection state machine, its weighted
//! generator, and the REST client that submits the finished sheet.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

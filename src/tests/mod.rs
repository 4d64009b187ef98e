//! Crate test tree
//!
//! - `common`: shared fixtures
//! - `unit`: scenario tests per module
//! - `property`: proptest invariants

mod common;

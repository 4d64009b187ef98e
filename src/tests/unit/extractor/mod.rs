//! Attribute Extractor Unit Tests
//!
//! ## Test Coverage
//!
//! ### State machine (`machine_tests`)
//! - Direct finalization for spirit-less roles
//! - Spirit accept / reject / custom name flow
//! - Submission failure rollback and retry
//! - Terminal `Finalized` state
//!
//! ### Distributions (`distribution_tests`)
//! - Chi-square goodness-of-fit for role, rank and ability rolls
//! - Gold and plant-spirit branch frequencies
//!
//! ### HTTP submission (`submission_tests`)
//! - Request body shape
//! - Success, rejection and malformed responses
//! - Transport failures
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test tests::unit::extractor
//! ```

mod machine_tests;

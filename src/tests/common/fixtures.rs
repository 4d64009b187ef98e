//! Test Fixtures
//!
//! Provides shared helpers for building generators with pinned roles and
//! sessions that have already used every draw.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::extractor::{
    AttributeGenerator, CharacterSink, ExtractorPhase, ExtractorSession, Rank, Role,
    WeightedOption, WeightedTable, MAX_DRAWS, RANK_WEIGHTS,
};

// =============================================================================
// Generator Fixtures
// =============================================================================

/// Generator that only ever rolls `role`, with the standard rank table.
pub fn generator_for_role(role: Role, seed: u64) -> AttributeGenerator {
    let roles = WeightedTable::new(vec![WeightedOption::new(role, 1.0)])
        .expect("single positive weight is valid");
    let ranks: WeightedTable<Rank> =
        WeightedTable::new(RANK_WEIGHTS.to_vec()).expect("standard rank table is valid");
    AttributeGenerator::with_tables(StdRng::seed_from_u64(seed), roles, ranks)
}

// =============================================================================
// Session Fixtures
// =============================================================================

/// Session named "Ari" whose ten draws are all `role`, parked in `AwaitingChoice`.
pub fn full_session(role: Role, sink: Arc<dyn CharacterSink>) -> ExtractorSession {
    let mut session =
        ExtractorSession::with_generator("Ari", generator_for_role(role, 11), sink)
            .expect("fixture name is not blank");
    for _ in 0..MAX_DRAWS {
        session.draw().expect("drawing phase accepts draws");
    }
    assert_eq!(session.phase(), ExtractorPhase::AwaitingChoice);
    session
}

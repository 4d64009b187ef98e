//! State Machine Scenario Tests
//!
//! Drives full sessions against a mocked character sink.

use std::sync::Arc;

use crate::core::extractor::{
    CreateCharacterResponse, ExtractorError, ExtractorPhase, MockCharacterSink, Rank, Role,
    Selection, SpiritKind, SpiritMode, SubmissionError, ValidationError,
};
use crate::tests::common::full_session;

// ============================================================================
// Test Helpers
// ============================================================================

fn accepting_sink(expected_calls: usize) -> MockCharacterSink {
    let mut sink = MockCharacterSink::new();
    sink.expect_create_character()
        .times(expected_calls)
        .returning(|_| Ok(CreateCharacterResponse::accepted()));
    sink
}

fn failing_sink() -> MockCharacterSink {
    let mut sink = MockCharacterSink::new();
    sink.expect_create_character().times(1).returning(|_| {
        Err(SubmissionError::Rejected {
            status: Some(500),
            message: "database is locked".to_string(),
        })
    });
    sink
}

// ============================================================================
// Spirit-less Roles
// ============================================================================

#[cfg(test)]
mod direct_finalization {
    use super::*;

    #[tokio::test]
    async fn test_civilian_select_finalizes_directly() {
        let mut sink = MockCharacterSink::new();
        sink.expect_create_character()
            .withf(|req| {
                req.name == "Ari"
                    && req.role == Role::Civilian
                    && req.mental_rank == Rank::None
                    && req.spirit_type == SpiritKind::None
                    && req.spirit_name == "None"
            })
            .times(1)
            .returning(|_| Ok(CreateCharacterResponse::accepted()));

        let mut session = full_session(Role::Civilian, Arc::new(sink));

        let selection = session.select(4).await.unwrap();
        assert!(matches!(selection, Selection::Finalized(_)));
        assert_eq!(session.phase(), ExtractorPhase::Finalized);
        assert!(session.draft().is_none());

        let sheet = session.final_sheet().unwrap();
        assert_eq!(sheet.sheet, session.history()[4]);
    }

    #[tokio::test]
    async fn test_ghost_select_finalizes_directly() {
        let mut session = full_session(Role::Ghost, Arc::new(accepting_sink(1)));

        session.select(0).await.unwrap();

        let sheet = session.final_sheet().unwrap();
        assert_eq!(sheet.role(), Role::Ghost);
        assert_eq!(sheet.sheet.physical_rank, Rank::None);
        assert!(sheet.spirit().is_none());
    }

    #[tokio::test]
    async fn test_civilian_failure_reopens_choice() {
        let mut session = full_session(Role::Civilian, Arc::new(failing_sink()));
        let history = session.history().to_vec();

        let err = session.select(2).await.unwrap_err();
        assert!(matches!(err, ExtractorError::Submission(_)));
        assert_eq!(session.phase(), ExtractorPhase::AwaitingChoice);
        assert_eq!(session.history(), history.as_slice());
    }
}

// ============================================================================
// Spirit Confirmation
// ============================================================================

#[cfg(test)]
mod spirit_confirmation {
    use super::*;

    #[tokio::test]
    async fn test_sentinel_select_awaits_spirit() {
        let mut session = full_session(Role::Sentinel, Arc::new(MockCharacterSink::new()));

        let selection = session.select(1).await.unwrap();
        match selection {
            Selection::SpiritPending(spirit) => {
                assert!(matches!(spirit.kind, SpiritKind::Animal | SpiritKind::Plant));
                assert_eq!(&spirit, &session.history()[1].spirit);
            }
            other => panic!("expected pending spirit, got {:?}", other),
        }
        assert_eq!(session.phase(), ExtractorPhase::AwaitingSpiritConfirmation);
        assert_eq!(session.spirit_mode(), Some(SpiritMode::Reviewing));
    }

    #[tokio::test]
    async fn test_accept_spirit_submits_unchanged() {
        let mut session = full_session(Role::Guide, Arc::new(accepting_sink(1)));
        session.select(7).await.unwrap();

        session.accept_spirit().await.unwrap();

        let sheet = session.final_sheet().unwrap();
        assert_eq!(sheet.sheet, session.history()[7]);
        assert!(matches!(sheet.spirit().kind, SpiritKind::Animal | SpiritKind::Plant));
    }

    #[tokio::test]
    async fn test_blank_custom_spirit_is_rejected() {
        let mut sink = MockCharacterSink::new();
        sink.expect_create_character().times(0);
        let mut session = full_session(Role::Sentinel, Arc::new(sink));

        session.select(0).await.unwrap();
        session.reject_spirit().unwrap();
        let err = session.confirm_custom_spirit("  ").await.unwrap_err();

        assert!(matches!(
            err,
            ExtractorError::Validation(ValidationError::EmptySpiritName)
        ));
        assert_eq!(session.phase(), ExtractorPhase::AwaitingSpiritConfirmation);
        assert_eq!(session.spirit_mode(), Some(SpiritMode::EnteringName));
    }

    #[tokio::test]
    async fn test_custom_spirit_is_trimmed_and_isolated_from_history() {
        let mut sink = MockCharacterSink::new();
        sink.expect_create_character()
            .withf(|req| req.spirit_name == "Moth" && req.spirit_type == SpiritKind::Custom)
            .times(1)
            .returning(|_| Ok(CreateCharacterResponse::accepted()));
        let mut session = full_session(Role::Sentinel, Arc::new(sink));
        let original = session.history()[3].clone();

        session.select(3).await.unwrap();
        session.reject_spirit().unwrap();
        session.confirm_custom_spirit("  Moth ").await.unwrap();

        let sheet = session.final_sheet().unwrap();
        assert_eq!(sheet.spirit().name, "Moth");
        assert_eq!(sheet.spirit().kind, SpiritKind::Custom);
        assert_eq!(session.history()[3], original);
    }

    #[tokio::test]
    async fn test_confirm_custom_requires_reject_first() {
        let mut session = full_session(Role::Sentinel, Arc::new(MockCharacterSink::new()));
        session.select(0).await.unwrap();

        let err = session.confirm_custom_spirit("Moth").await.unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidAction { .. }));
        assert_eq!(session.spirit_mode(), Some(SpiritMode::Reviewing));
    }

    #[tokio::test]
    async fn test_accept_after_reject_keeps_generated_spirit() {
        let mut session = full_session(Role::Guide, Arc::new(accepting_sink(1)));
        session.select(5).await.unwrap();
        session.reject_spirit().unwrap();

        session.accept_spirit().await.unwrap();

        let sheet = session.final_sheet().unwrap();
        assert_eq!(sheet.spirit(), &session.history()[5].spirit);
    }

    #[tokio::test]
    async fn test_reject_twice_stays_entering_name() {
        let mut session = full_session(Role::Guide, Arc::new(MockCharacterSink::new()));
        session.select(5).await.unwrap();
        session.reject_spirit().unwrap();
        session.reject_spirit().unwrap();
        assert_eq!(session.spirit_mode(), Some(SpiritMode::EnteringName));
    }

    #[tokio::test]
    async fn test_draw_refused_during_confirmation() {
        let mut session = full_session(Role::Sentinel, Arc::new(MockCharacterSink::new()));
        session.select(0).await.unwrap();

        assert!(matches!(
            session.draw().unwrap_err(),
            ExtractorError::InvalidAction { action: "draw", .. }
        ));
        assert!(session.draft().is_some());
    }
}

// ============================================================================
// Submission Failure
// ============================================================================

#[cfg(test)]
mod submission_failure {
    use super::*;

    #[tokio::test]
    async fn test_failed_accept_reverts_to_choice() {
        let mut session = full_session(Role::Sentinel, Arc::new(failing_sink()));
        let history = session.history().to_vec();

        session.select(6).await.unwrap();
        let err = session.accept_spirit().await.unwrap_err();

        match err {
            ExtractorError::Submission(SubmissionError::Rejected { status, message }) => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "database is locked");
            }
            other => panic!("expected submission error, got {:?}", other),
        }
        assert_eq!(session.phase(), ExtractorPhase::AwaitingChoice);
        assert!(session.draft().is_none());
        assert!(session.final_sheet().is_none());
        assert_eq!(session.history(), history.as_slice());
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let mut sink = MockCharacterSink::new();
        let mut calls = 0;
        sink.expect_create_character().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(SubmissionError::Transport("connection reset".to_string()))
            } else {
                Ok(CreateCharacterResponse::accepted())
            }
        });
        let mut session = full_session(Role::Sentinel, Arc::new(sink));

        session.select(2).await.unwrap();
        assert!(session.accept_spirit().await.is_err());
        assert_eq!(session.phase(), ExtractorPhase::AwaitingChoice);

        // History is still selectable after the failure
        session.select(8).await.unwrap();
        session.accept_spirit().await.unwrap();
        assert_eq!(session.final_sheet().unwrap().sheet, session.history()[8]);
    }

    #[tokio::test]
    async fn test_draw_after_failure_does_not_append() {
        let mut session = full_session(Role::Civilian, Arc::new(failing_sink()));
        let _ = session.select(0).await;

        let before = session.draw_count();
        session.draw().unwrap();
        assert_eq!(session.draw_count(), before);
        assert_eq!(session.phase(), ExtractorPhase::AwaitingChoice);
    }
}

// ============================================================================
// Terminal State
// ============================================================================

#[cfg(test)]
mod finalized {
    use super::*;

    #[tokio::test]
    async fn test_finalized_rejects_every_action() {
        let mut session = full_session(Role::Civilian, Arc::new(accepting_sink(1)));
        session.select(0).await.unwrap();
        let submitted = session.final_sheet().cloned().unwrap();

        assert!(matches!(session.draw(), Err(ExtractorError::InvalidAction { .. })));
        assert!(matches!(session.select(1).await, Err(ExtractorError::InvalidAction { .. })));
        assert!(matches!(session.accept_spirit().await, Err(ExtractorError::InvalidAction { .. })));
        assert!(matches!(session.reject_spirit(), Err(ExtractorError::InvalidAction { .. })));
        assert!(matches!(
            session.confirm_custom_spirit("Moth").await,
            Err(ExtractorError::InvalidAction { .. })
        ));

        assert!(session.is_finalized());
        assert_eq!(session.final_sheet(), Some(&submitted));
    }

    #[tokio::test]
    async fn test_snapshot_after_finalization() {
        let mut session = full_session(Role::Ghost, Arc::new(accepting_sink(1)));
        session.select(9).await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, ExtractorPhase::Finalized);
        assert_eq!(snapshot.remaining_draws, 0);
        assert!(snapshot.draft.is_none());
        assert_eq!(snapshot.final_sheet.map(|s| s.name), Some("Ari".to_string()));
    }
}

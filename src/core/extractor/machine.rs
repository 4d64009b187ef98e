//! Draw/Selection State Machine
//!
//! Drives one extraction session:
//!
//! ```text
//! Drawing --(10th draw)--> AwaitingChoice --select--> AwaitingSpiritConfirmation --accept/confirm--> Finalized
//!                                  ^            \                                            |
//!                                  |             +--(Civilian/Ghost)--------------------------+
//!                                  +---------------------(submission failed)-----------------+
//! ```
//!
//! Every transition is synchronous except the submission that accompanies
//! finalization. The draft is moved out of the state before the call is awaited,
//! so a failed (or dropped) submission leaves the session in `AwaitingChoice`
//! with the draw history intact.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::generator::AttributeGenerator;
use super::submission::{CharacterSink, CreateCharacterResponse};
use super::types::{
    CandidateSheet, ExtractorError, ExtractorResult, FinalSheet, Spirit, ValidationError,
};

/// Number of draws a session collects before the choice panel opens
pub const MAX_DRAWS: usize = 10;

// ============================================================================
// States
// ============================================================================

/// Sub-mode of the spirit confirmation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiritMode {
    /// Showing the generated spirit with accept/reject
    Reviewing,
    /// Generated spirit rejected; waiting for a typed replacement
    EnteringName,
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorState {
    Drawing,
    AwaitingChoice,
    AwaitingSpiritConfirmation { draft: FinalSheet, mode: SpiritMode },
    Finalized(FinalSheet),
}

/// Data-free view of [`ExtractorState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorPhase {
    Drawing,
    AwaitingChoice,
    AwaitingSpiritConfirmation,
    Finalized,
}

impl ExtractorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorPhase::Drawing => "drawing",
            ExtractorPhase::AwaitingChoice => "awaiting choice",
            ExtractorPhase::AwaitingSpiritConfirmation => "awaiting spirit confirmation",
            ExtractorPhase::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for ExtractorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExtractorState {
    pub fn phase(&self) -> ExtractorPhase {
        match self {
            ExtractorState::Drawing => ExtractorPhase::Drawing,
            ExtractorState::AwaitingChoice => ExtractorPhase::AwaitingChoice,
            ExtractorState::AwaitingSpiritConfirmation { .. } => {
                ExtractorPhase::AwaitingSpiritConfirmation
            }
            ExtractorState::Finalized(_) => ExtractorPhase::Finalized,
        }
    }
}

// ============================================================================
// Action Outcomes
// ============================================================================

/// Result of a `draw` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// A new sheet was appended; `remaining` draws are left
    Drawn {
        sheet: CandidateSheet,
        remaining: usize,
    },
    /// History was already full; the choice panel is (re)opened instead
    ChoiceOpened,
}

/// Result of a `select` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Spirit-less role; the sheet was submitted directly
    Finalized(CreateCharacterResponse),
    /// Sentinel or guide; the generated spirit awaits confirmation
    SpiritPending(Spirit),
}

/// Serializable summary for front ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub character_name: String,
    pub phase: ExtractorPhase,
    pub draw_count: usize,
    pub remaining_draws: usize,
    pub history: Vec<CandidateSheet>,
    pub draft: Option<FinalSheet>,
    pub spirit_mode: Option<SpiritMode>,
    pub final_sheet: Option<FinalSheet>,
}

// ============================================================================
// Session
// ============================================================================

/// One player's extraction session
pub struct ExtractorSession<R: Rng = StdRng> {
    character_name: String,
    generator: AttributeGenerator<R>,
    history: Vec<CandidateSheet>,
    state: ExtractorState,
    sink: Arc<dyn CharacterSink>,
}

impl ExtractorSession<StdRng> {
    /// Start a session with an entropy-seeded generator
    pub fn new(character_name: &str, sink: Arc<dyn CharacterSink>) -> ExtractorResult<Self> {
        Self::with_generator(character_name, AttributeGenerator::new(), sink)
    }
}

impl<R: Rng> ExtractorSession<R> {
    /// Start a session with a caller-supplied generator
    pub fn with_generator(
        character_name: &str,
        generator: AttributeGenerator<R>,
        sink: Arc<dyn CharacterSink>,
    ) -> ExtractorResult<Self> {
        let character_name = character_name.trim();
        if character_name.is_empty() {
            return Err(ValidationError::EmptyCharacterName.into());
        }

        Ok(Self {
            character_name: character_name.to_string(),
            generator,
            history: Vec::with_capacity(MAX_DRAWS),
            state: ExtractorState::Drawing,
            sink,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn character_name(&self) -> &str {
        &self.character_name
    }

    pub fn state(&self) -> &ExtractorState {
        &self.state
    }

    pub fn phase(&self) -> ExtractorPhase {
        self.state.phase()
    }

    pub fn history(&self) -> &[CandidateSheet] {
        &self.history
    }

    pub fn draw_count(&self) -> usize {
        self.history.len()
    }

    pub fn remaining_draws(&self) -> usize {
        MAX_DRAWS - self.history.len()
    }

    /// Draft under spirit confirmation, if any
    pub fn draft(&self) -> Option<&FinalSheet> {
        match &self.state {
            ExtractorState::AwaitingSpiritConfirmation { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn spirit_mode(&self) -> Option<SpiritMode> {
        match &self.state {
            ExtractorState::AwaitingSpiritConfirmation { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    /// The submitted sheet once the session is finalized
    pub fn final_sheet(&self) -> Option<&FinalSheet> {
        match &self.state {
            ExtractorState::Finalized(sheet) => Some(sheet),
            _ => None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, ExtractorState::Finalized(_))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            character_name: self.character_name.clone(),
            phase: self.phase(),
            draw_count: self.draw_count(),
            remaining_draws: self.remaining_draws(),
            history: self.history.clone(),
            draft: self.draft().cloned(),
            spirit_mode: self.spirit_mode(),
            final_sheet: self.final_sheet().cloned(),
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Roll one more sheet, or reopen the choice panel once history is full
    pub fn draw(&mut self) -> ExtractorResult<DrawOutcome> {
        match self.state {
            ExtractorState::Drawing | ExtractorState::AwaitingChoice => {}
            _ => return Err(self.invalid_action("draw")),
        }

        if self.history.len() >= MAX_DRAWS {
            self.state = ExtractorState::AwaitingChoice;
            debug!(draw_count = self.history.len(), "Draw limit reached, opening choice");
            return Ok(DrawOutcome::ChoiceOpened);
        }

        let sheet = self.generator.draw();
        self.history.push(sheet.clone());
        debug!(
            draw_count = self.history.len(),
            role = %sheet.role,
            rare = sheet.is_rare(),
            "Drew candidate sheet"
        );

        if self.history.len() == MAX_DRAWS {
            self.state = ExtractorState::AwaitingChoice;
            info!(draw_count = MAX_DRAWS, "All draws used, awaiting choice");
        }

        Ok(DrawOutcome::Drawn {
            sheet,
            remaining: self.remaining_draws(),
        })
    }

    /// Pick a sheet from history. Spirit-less roles are submitted immediately.
    pub async fn select(&mut self, index: usize) -> ExtractorResult<Selection> {
        if !matches!(self.state, ExtractorState::AwaitingChoice) {
            return Err(self.invalid_action("select"));
        }

        let candidate = self
            .history
            .get(index)
            .cloned()
            .ok_or(ExtractorError::InvalidSelection {
                index,
                len: self.history.len(),
            })?;
        let draft = FinalSheet::new(self.character_name.clone(), candidate);
        info!(index, role = %draft.role(), "Selected candidate sheet");

        if draft.role().has_spirit() {
            let spirit = draft.spirit().clone();
            self.state = ExtractorState::AwaitingSpiritConfirmation {
                draft,
                mode: SpiritMode::Reviewing,
            };
            Ok(Selection::SpiritPending(spirit))
        } else {
            let response = self.finalize(draft).await?;
            Ok(Selection::Finalized(response))
        }
    }

    /// Keep the generated spirit and submit
    pub async fn accept_spirit(&mut self) -> ExtractorResult<CreateCharacterResponse> {
        let draft = match &self.state {
            ExtractorState::AwaitingSpiritConfirmation { draft, .. } => draft.clone(),
            _ => return Err(self.invalid_action("accept spirit")),
        };
        self.finalize(draft).await
    }

    /// Reject the generated spirit and switch to free-text entry
    pub fn reject_spirit(&mut self) -> ExtractorResult<()> {
        match &mut self.state {
            ExtractorState::AwaitingSpiritConfirmation { mode, .. } => {
                *mode = SpiritMode::EnteringName;
                debug!("Generated spirit rejected, awaiting custom name");
                Ok(())
            }
            _ => Err(self.invalid_action("reject spirit")),
        }
    }

    /// Replace the spirit with a typed name and submit
    pub async fn confirm_custom_spirit(
        &mut self,
        name: &str,
    ) -> ExtractorResult<CreateCharacterResponse> {
        let draft = match &self.state {
            ExtractorState::AwaitingSpiritConfirmation {
                draft,
                mode: SpiritMode::EnteringName,
            } => draft,
            _ => return Err(self.invalid_action("confirm custom spirit")),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptySpiritName.into());
        }

        let draft = draft.clone().with_custom_spirit(name);
        self.finalize(draft).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Submit the sheet. The state is parked in `AwaitingChoice` while the call
    /// is in flight and only becomes `Finalized` on success.
    async fn finalize(&mut self, sheet: FinalSheet) -> ExtractorResult<CreateCharacterResponse> {
        self.state = ExtractorState::AwaitingChoice;
        let request = sheet.to_request();

        match self.sink.create_character(&request).await {
            Ok(response) => {
                info!(
                    name = %sheet.name,
                    role = %sheet.role(),
                    spirit = %sheet.spirit().name,
                    "Character submitted"
                );
                self.state = ExtractorState::Finalized(sheet);
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Character submission failed, choice reopened");
                Err(e.into())
            }
        }
    }

    fn invalid_action(&self, action: &'static str) -> ExtractorError {
        ExtractorError::InvalidAction {
            action,
            phase: self.phase().as_str(),
        }
    }
}

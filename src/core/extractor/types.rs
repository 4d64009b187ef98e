//! Extractor Domain Types
//!
//! Defines the records produced and consumed by the attribute extractor:
//! - [`CandidateSheet`]: One generated draw, never modified after creation
//! - [`FinalSheet`]: The chosen draw plus the character name, ready for submission
//! - [`ExtractorError`]: Error types for extractor operations
//!
//! All types implement `Serialize` and `Deserialize` so front ends can render
//! history and drafts without knowing the state machine internals.

use serde::{Deserialize, Serialize};

use super::submission::{CreateCharacterRequest, SubmissionError};

// ============================================================================
// Role
// ============================================================================

/// Character role rolled as the first category of every draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Ability user; rolls both ranks and a spirit
    Sentinel,
    /// Stabilizer for sentinels; rolls both ranks and a spirit
    Guide,
    /// Ordinary person without mental rank
    Civilian,
    /// Incorporeal character without physical rank
    Ghost,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Sentinel, Role::Guide, Role::Civilian, Role::Ghost];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sentinel => "Sentinel",
            Role::Guide => "Guide",
            Role::Civilian => "Civilian",
            Role::Ghost => "Ghost",
        }
    }

    /// Civilians never carry a mental rank
    pub fn rolls_mental_rank(&self) -> bool {
        !matches!(self, Role::Civilian)
    }

    /// Ghosts never carry a physical rank
    pub fn rolls_physical_rank(&self) -> bool {
        !matches!(self, Role::Ghost)
    }

    /// Only sentinels and guides are bonded to a spirit
    pub fn has_spirit(&self) -> bool {
        matches!(self, Role::Sentinel | Role::Guide)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rank
// ============================================================================

/// Letter-graded power tier, ordered from `None` up to `SSS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    None,
    D,
    C,
    B,
    A,
    S,
    SS,
    SSS,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::None => "None",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
            Rank::SS => "SS",
            Rank::SSS => "SSS",
        }
    }

    /// S and above
    pub fn is_rare(&self) -> bool {
        *self >= Rank::S
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Ability Affinity
// ============================================================================

/// Ability affinity, picked uniformly and independently of role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Physical,
    Elemental,
    Psychic,
    Sensory,
    Healing,
    Spatial,
    Enhancement,
    Summoning,
}

impl Ability {
    pub const ALL: [Ability; 8] = [
        Ability::Physical,
        Ability::Elemental,
        Ability::Psychic,
        Ability::Sensory,
        Ability::Healing,
        Ability::Spatial,
        Ability::Enhancement,
        Ability::Summoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::Physical => "Physical",
            Ability::Elemental => "Elemental",
            Ability::Psychic => "Psychic",
            Ability::Sensory => "Sensory",
            Ability::Healing => "Healing",
            Ability::Spatial => "Spatial",
            Ability::Enhancement => "Enhancement",
            Ability::Summoning => "Summoning",
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Spirit
// ============================================================================

/// Where a spirit name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpiritKind {
    Animal,
    Plant,
    None,
    /// Typed in by the player after rejecting the generated spirit
    Custom,
}

impl SpiritKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpiritKind::Animal => "Animal",
            SpiritKind::Plant => "Plant",
            SpiritKind::None => "None",
            SpiritKind::Custom => "Custom",
        }
    }
}

/// Companion entity attached to sentinels and guides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spirit {
    pub name: String,
    pub kind: SpiritKind,
}

impl Spirit {
    pub fn new(name: impl Into<String>, kind: SpiritKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The placeholder carried by civilians and ghosts
    pub fn none() -> Self {
        Self::new("None", SpiritKind::None)
    }

    pub fn is_none(&self) -> bool {
        self.kind == SpiritKind::None
    }
}

// ============================================================================
// CandidateSheet
// ============================================================================

/// One generated draw.
///
/// Sheets in the draw history are only ever handed out by shared reference;
/// selecting one clones it into a [`FinalSheet`] draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSheet {
    pub role: Role,
    pub mental_rank: Rank,
    pub physical_rank: Rank,
    pub gold: u32,
    pub ability: Ability,
    pub spirit: Spirit,
}

impl CandidateSheet {
    /// Highest of the two ranks
    pub fn best_rank(&self) -> Rank {
        self.mental_rank.max(self.physical_rank)
    }

    /// True when either rank is S or above
    pub fn is_rare(&self) -> bool {
        self.best_rank().is_rare()
    }

    /// Check the role invariants that every generated sheet must satisfy
    pub fn satisfies_role_rules(&self) -> bool {
        let mental_ok = self.role.rolls_mental_rank() == (self.mental_rank != Rank::None);
        let physical_ok = self.role.rolls_physical_rank() == (self.physical_rank != Rank::None);
        let spirit_ok = if self.role.has_spirit() {
            matches!(self.spirit.kind, SpiritKind::Animal | SpiritKind::Plant)
        } else {
            self.spirit == Spirit::none()
        };
        mental_ok && physical_ok && spirit_ok
    }
}

// ============================================================================
// FinalSheet
// ============================================================================

/// The selected sheet together with the character name.
///
/// Built by cloning a [`CandidateSheet`] out of history. The spirit may be
/// replaced once before submission; after that the machine only exposes it by
/// shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSheet {
    pub name: String,
    pub sheet: CandidateSheet,
}

impl FinalSheet {
    pub fn new(name: impl Into<String>, sheet: CandidateSheet) -> Self {
        Self {
            name: name.into(),
            sheet,
        }
    }

    pub fn role(&self) -> Role {
        self.sheet.role
    }

    pub fn spirit(&self) -> &Spirit {
        &self.sheet.spirit
    }

    /// Replace the generated spirit with a player-chosen name
    pub fn with_custom_spirit(mut self, name: impl Into<String>) -> Self {
        self.sheet.spirit = Spirit::new(name, SpiritKind::Custom);
        self
    }

    /// Convert to the outbound "create character" payload
    pub fn to_request(&self) -> CreateCharacterRequest {
        CreateCharacterRequest {
            name: self.name.clone(),
            role: self.sheet.role,
            mental_rank: self.sheet.mental_rank,
            physical_rank: self.sheet.physical_rank,
            gold: self.sheet.gold,
            ability: self.sheet.ability,
            spirit_name: self.sheet.spirit.name.clone(),
            spirit_type: self.sheet.spirit.kind,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during extractor operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractorError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Cannot {action} while {phase}")]
    InvalidAction {
        action: &'static str,
        phase: &'static str,
    },

    #[error("No draw at index {index} (history holds {len})")]
    InvalidSelection { index: usize, len: usize },
}

/// Validation errors for player input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Custom spirit name must not be empty")]
    EmptySpiritName,

    #[error("Character name must not be empty")]
    EmptyCharacterName,
}

/// Result type for extractor operations
pub type ExtractorResult<T> = Result<T, ExtractorError>;

// ============================================================================
// Tests
// ============================================================================

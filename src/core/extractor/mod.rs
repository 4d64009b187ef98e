//! Attribute Extractor
//!
//! Character creation by weighted draws ("gacha"), followed by a pick-one
//! selection and an optional spirit override.
//!
//! # Overview
//!
//! 1. Draw - up to [`MAX_DRAWS`] candidate sheets are rolled into history
//! 2. Choose - one sheet is cloned out of history into a draft
//! 3. Spirit - sentinels and guides accept the generated spirit or type a new one
//! 4. Finalize - the draft is posted once to the game API and frozen
//!
//! A failed submission reopens the choice step with history untouched.
//!
//! ```rust,ignore
//! let sink = Arc::new(HttpCharacterClient::new(&config.api)?);
//! let mut session = ExtractorSession::new("Ari", sink)?;
//!
//! while session.phase() == ExtractorPhase::Drawing {
//!     session.draw()?;
//! }
//!
//! if let Selection::SpiritPending(_) = session.select(3).await? {
//!     session.accept_spirit().await?;
//! }
//! ```

mod generator;
mod machine;
mod submission;
mod types;
mod weighted;

pub use generator::*;
pub use machine::*;
pub use submission::*;
pub use types::*;
pub use weighted::*;

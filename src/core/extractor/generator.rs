//! Attribute Generator
//!
//! Rolls one [`CandidateSheet`] per call. Categories are rolled in a fixed
//! order (role, ranks, gold, ability, spirit) and every roll consumes fresh
//! randomness; nothing is retried or reseeded inside a draw.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::types::{Ability, CandidateSheet, Rank, Role, Spirit, SpiritKind};
use super::weighted::{WeightedOption, WeightedTable};

// ============================================================================
// Distribution Tables
// ============================================================================

pub const ROLE_WEIGHTS: [WeightedOption<Role>; 4] = [
    WeightedOption::new(Role::Sentinel, 40.0),
    WeightedOption::new(Role::Guide, 40.0),
    WeightedOption::new(Role::Civilian, 10.0),
    WeightedOption::new(Role::Ghost, 10.0),
];

/// Shared by the mental and physical rolls
pub const RANK_WEIGHTS: [WeightedOption<Rank>; 7] = [
    WeightedOption::new(Rank::D, 24.5),
    WeightedOption::new(Rank::C, 24.5),
    WeightedOption::new(Rank::B, 24.5),
    WeightedOption::new(Rank::A, 24.5),
    WeightedOption::new(Rank::S, 1.2),
    WeightedOption::new(Rank::SS, 0.6),
    WeightedOption::new(Rank::SSS, 0.2),
];

pub const HIGH_GOLD_CHANCE: f64 = 0.10;
pub const HIGH_GOLD_MIN: u32 = 8000;
pub const HIGH_GOLD_MAX: u32 = 10000;
pub const LOW_GOLD_MIN: u32 = 100;
pub const LOW_GOLD_MAX: u32 = 7999;

pub const PLANT_SPIRIT_CHANCE: f64 = 0.12;

pub const ANIMAL_SPIRITS: &[&str] = &[
    "Wolf", "Tiger", "Eagle", "Fox", "Bear", "Owl", "Snake", "Lion",
    "Deer", "Raven", "Whale", "Leopard", "Hawk", "Otter", "Panther", "Crane",
    "Lynx", "Dolphin", "Falcon", "Rabbit",
];

pub const PLANT_SPIRITS: &[&str] = &[
    "Lotus", "Rose", "Bamboo", "Cherry Blossom", "Ivy", "Sunflower",
    "Mandrake", "Pine", "Lavender", "Camellia",
];

// ============================================================================
// Generator
// ============================================================================

/// Weighted candidate sheet generator over any random source
#[derive(Debug, Clone)]
pub struct AttributeGenerator<R: Rng = StdRng> {
    rng: R,
    roles: WeightedTable<Role>,
    ranks: WeightedTable<Rank>,
}

impl AttributeGenerator<StdRng> {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible generator for replays and tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for AttributeGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> AttributeGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            roles: WeightedTable::from_builtin(&ROLE_WEIGHTS),
            ranks: WeightedTable::from_builtin(&RANK_WEIGHTS),
        }
    }

    /// Generator with custom role and rank distributions (event banners, tests)
    pub fn with_tables(rng: R, roles: WeightedTable<Role>, ranks: WeightedTable<Rank>) -> Self {
        Self { rng, roles, ranks }
    }

    pub fn role_table(&self) -> &WeightedTable<Role> {
        &self.roles
    }

    pub fn rank_table(&self) -> &WeightedTable<Rank> {
        &self.ranks
    }

    /// Roll one candidate sheet
    pub fn draw(&mut self) -> CandidateSheet {
        let rng = &mut self.rng;

        let role = *self.roles.pick(rng);

        let mental_rank = if role.rolls_mental_rank() {
            *self.ranks.pick(rng)
        } else {
            Rank::None
        };
        let physical_rank = if role.rolls_physical_rank() {
            *self.ranks.pick(rng)
        } else {
            Rank::None
        };

        let gold = roll_gold(rng);
        let ability = Ability::ALL
            .choose(rng)
            .copied()
            .unwrap_or(Ability::Physical);

        let spirit = if role.has_spirit() {
            roll_spirit(rng)
        } else {
            Spirit::none()
        };

        CandidateSheet {
            role,
            mental_rank,
            physical_rank,
            gold,
            ability,
            spirit,
        }
    }
}

fn roll_gold<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_bool(HIGH_GOLD_CHANCE) {
        rng.gen_range(HIGH_GOLD_MIN..=HIGH_GOLD_MAX)
    } else {
        rng.gen_range(LOW_GOLD_MIN..=LOW_GOLD_MAX)
    }
}

fn roll_spirit<R: Rng + ?Sized>(rng: &mut R) -> Spirit {
    let (names, kind) = if rng.gen_bool(PLANT_SPIRIT_CHANCE) {
        (PLANT_SPIRITS, SpiritKind::Plant)
    } else {
        (ANIMAL_SPIRITS, SpiritKind::Animal)
    };
    match names.choose(rng) {
        Some(name) => Spirit::new(*name, kind),
        None => Spirit::none(),
    }
}

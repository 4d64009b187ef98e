//! Weighted Selection
//!
//! Linear weighted choice over a short, ordered option list. A uniform value
//! in `[0, total)` is drawn and option weights are subtracted in list order
//! until the remainder drops to zero or below; ties go to the earlier option.

use rand::Rng;
use thiserror::Error;

/// Errors raised when building a weighted table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightedTableError {
    #[error("Weighted table has no options")]
    Empty,

    #[error("Option {index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
}

/// A single option and its relative weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedOption<T> {
    pub item: T,
    pub weight: f64,
}

impl<T> WeightedOption<T> {
    pub const fn new(item: T, weight: f64) -> Self {
        Self { item, weight }
    }
}

/// An ordered, non-empty list of weighted options with a positive total
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    options: Vec<WeightedOption<T>>,
    total: f64,
}

impl<T> WeightedTable<T> {
    /// Build a table, rejecting empty lists and non-positive or non-finite weights
    pub fn new(options: Vec<WeightedOption<T>>) -> Result<Self, WeightedTableError> {
        if options.is_empty() {
            return Err(WeightedTableError::Empty);
        }
        for (index, option) in options.iter().enumerate() {
            if !option.weight.is_finite() || option.weight <= 0.0 {
                return Err(WeightedTableError::InvalidWeight {
                    index,
                    weight: option.weight,
                });
            }
        }
        let total = options.iter().map(|o| o.weight).sum();
        Ok(Self { options, total })
    }

    /// Build from a compiled-in list. Callers guarantee the list is non-empty
    /// with positive weights; the generator tests check every built-in table.
    pub(crate) fn from_builtin(options: &[WeightedOption<T>]) -> Self
    where
        T: Copy,
    {
        Self {
            options: options.to_vec(),
            total: options.iter().map(|o| o.weight).sum(),
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    pub fn options(&self) -> &[WeightedOption<T>] {
        &self.options
    }

    /// Expected probability of the option at `index`
    pub fn probability(&self, index: usize) -> Option<f64> {
        self.options.get(index).map(|o| o.weight / self.total)
    }

    /// Index of the option selected by a roll in `[0, total)`
    pub fn index_for_roll(&self, roll: f64) -> usize {
        let mut remaining = roll;
        for (index, option) in self.options.iter().enumerate() {
            remaining -= option.weight;
            if remaining <= 0.0 {
                return index;
            }
        }
        // Floating residue past the last boundary
        self.options.len() - 1
    }

    /// Pick one option
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let roll = rng.gen::<f64>() * self.total;
        &self.options[self.index_for_roll(roll)].item
    }
}

use std::collections::BTreeMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

/// Next-character counts observed after one prefix.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations. Counts stay raw integers;
/// normalization happens only when a [`CumulativeTable`] is sampled.
///
/// ## Invariants
/// - Every stored count is strictly positive
/// - Counts are only ever incremented
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: BTreeMap<char, u32>,
}

impl FrequencyTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `next_char`.
	pub fn add(&mut self, next_char: char) {
		*self.transitions.entry(next_char).or_insert(0) += 1;
	}

	/// Occurrences of `next_char`, zero if never seen.
	pub fn count(&self, next_char: char) -> u32 {
		self.transitions.get(&next_char).copied().unwrap_or(0)
	}

	/// Sum of all occurrences.
	pub fn total(&self) -> u64 {
		self.transitions.values().map(|&c| u64::from(c)).sum()
	}

	/// Number of distinct next characters.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Iterates `(next_char, count)` in character order.
	pub fn iter(&self) -> impl Iterator<Item = (char, u32)> + '_ {
		self.transitions.iter().map(|(&c, &n)| (c, n))
	}

	/// Sums the counts of `other` into this table.
	pub fn merge(&mut self, other: &Self) {
		for (next_char, occurrence) in other.iter() {
			*self.transitions.entry(next_char).or_insert(0) += occurrence;
		}
	}

	/// Builds the running-total view used for weighted sampling.
	pub fn cumulative(&self) -> CumulativeTable {
		let mut chars = Vec::with_capacity(self.transitions.len());
		let mut bounds = Vec::with_capacity(self.transitions.len());
		let mut running = 0u64;
		for (next_char, occurrence) in self.iter() {
			running += u64::from(occurrence);
			chars.push(next_char);
			bounds.push(running);
		}
		CumulativeTable { chars, bounds }
	}
}

/// Cumulative-frequency table for one prefix.
///
/// `bounds[i]` is the exclusive upper end of the draw interval that selects
/// `chars[i]`, so `chars[i]` is picked for draws in `[bounds[i-1], bounds[i])`.
/// Sampling is a uniform draw over `[0, total)` followed by a binary search,
/// O(log k) for k distinct next characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CumulativeTable {
	chars: Vec<char>,
	bounds: Vec<u64>,
}

impl CumulativeTable {
	/// Total weight, zero for an empty table.
	pub fn total(&self) -> u64 {
		self.bounds.last().copied().unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.chars.is_empty()
	}

	/// Maps a draw to its character. `None` if `draw >= total`.
	pub fn pick(&self, draw: u64) -> Option<char> {
		let index = self.bounds.partition_point(|&bound| bound <= draw);
		self.chars.get(index).copied()
	}

	/// Draws one character with probability proportional to its count.
	///
	/// Returns `None` on an empty table (dead end).
	pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<char> {
		let total = self.total();
		if total == 0 {
			return None;
		}
		self.pick(rng.random_range(0..total))
	}
}

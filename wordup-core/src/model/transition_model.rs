use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::frequency::FrequencyTable;
use crate::error::{Result, WordUpError};

/// Order-k character transition model.
///
/// Maps every length-`order` prefix seen in the corpus (sentinel padded at
/// word start) to the counts of the characters that followed it.
///
/// Every word contributes exactly one transition out of the all-sentinel
/// prefix whatever its length, so the start distribution weighs short and
/// long seed words alike. This bias is a property of the model and is kept.
///
/// # Invariants
/// - Every key is exactly `order` characters long
/// - Every stored table holds at least one count >= 1
/// - The sum of all counts equals the number of characters ingested
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransitionModel {
	order: usize, // must be >= 1
	sentinel: char,
	states: HashMap<String, FrequencyTable>,
}

/// Size summary of a model.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelStats {
	pub order: usize,
	/// Distinct prefix keys.
	pub prefixes: usize,
	/// Distinct (prefix, next-character) pairs.
	pub transitions: usize,
	/// Sum of every count.
	pub total_count: u64,
}

impl TransitionModel {
	/// Creates an empty model.
	///
	/// # Errors
	/// Returns an error if `order < 1`.
	pub fn new(order: usize, sentinel: char) -> Result<Self> {
		if order < 1 {
			return Err(WordUpError::config("order must be >= 1"));
		}
		Ok(Self { order, sentinel, states: HashMap::new() })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn sentinel(&self) -> char {
		self.sentinel
	}

	/// Records every transition of one word.
	///
	/// The word is left-padded with `order` sentinels; each of its characters
	/// is counted once, keyed by the `order` characters preceding it in the
	/// padded form. Callers are responsible for validating the word.
	pub fn add_word(&mut self, word: &str) {
		let padded: Vec<char> = std::iter::repeat_n(self.sentinel, self.order)
			.chain(word.chars())
			.collect();

		for (i, &next_char) in padded[self.order..].iter().enumerate() {
			let prefix: String = padded[i..i + self.order].iter().collect();
			self.states.entry(prefix).or_default().add(next_char);
		}
	}

	/// Frequency table of `prefix`, if it was ever observed.
	pub fn get(&self, prefix: &str) -> Option<&FrequencyTable> {
		self.states.get(prefix)
	}

	/// Iterates `(prefix, table)` pairs in arbitrary order.
	pub fn states(&self) -> impl Iterator<Item = (&str, &FrequencyTable)> + '_ {
		self.states.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Sum of every transition count in the model.
	pub fn total_count(&self) -> u64 {
		self.states.values().map(FrequencyTable::total).sum()
	}

	pub fn stats(&self) -> ModelStats {
		ModelStats {
			order: self.order,
			prefixes: self.states.len(),
			transitions: self.states.values().map(FrequencyTable::len).sum(),
			total_count: self.total_count(),
		}
	}

	/// Merges another model into this one by summing counts.
	///
	/// Summation is associative and commutative, so partial models built over
	/// disjoint chunks merge to the same model as a single pass.
	///
	/// # Errors
	/// Returns an error if the orders or sentinels differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order || self.sentinel != other.sentinel {
			return Err(WordUpError::internal(format!(
				"model mismatch: self=(order {}, '{}'), other=(order {}, '{}')",
				self.order, self.sentinel, other.order, other.sentinel
			)));
		}

		for (key, table) in &other.states {
			self.states.entry(key.clone()).or_default().merge(table);
		}

		Ok(())
	}
}

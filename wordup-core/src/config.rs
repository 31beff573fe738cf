use serde::{Deserialize, Serialize};

use crate::error::{Result, WordUpError};

/// Default Markov order (context length).
pub const DEFAULT_ORDER: usize = 2;
/// Default minimum length of seed and generated words.
pub const DEFAULT_MIN_WORD_LEN: usize = 4;
/// Default hard cap on the length of a synthesized word.
pub const DEFAULT_MAX_SYNTH_LEN: usize = 20;
/// Default expansion factor applied to the seed size.
pub const DEFAULT_MULTIPLIER: usize = 30;
/// Default number of synthesis attempts granted per requested word.
pub const DEFAULT_ATTEMPTS_PER_WORD: usize = 100;
/// Default number of consecutive fruitless attempts before giving up.
pub const DEFAULT_STALL_LIMIT: usize = 10_000;
/// Default start padding character.
pub const DEFAULT_SENTINEL: char = '~';

/// Largest accepted Markov order.
pub const MAX_ORDER: usize = 16;
/// Largest accepted `max_synth_len`.
pub const MAX_SYNTH_LEN_LIMIT: usize = 256;
/// Largest accepted expansion factor.
pub const MAX_MULTIPLIER: usize = 10_000;

/// Configuration shared by the model builder and the word generator.
///
/// Passed by value into each component so that several configurations can
/// coexist in one process. Missing fields fall back to their defaults when
/// deserialized.
///
/// # Invariants (checked by [`MarkovConfig::validate`])
/// - `1 <= order <= MAX_ORDER`
/// - `1 <= min_word_len <= max_synth_len <= MAX_SYNTH_LEN_LIMIT`
/// - `multiplier <= MAX_MULTIPLIER`
/// - `attempts_per_word >= 1` and `stall_limit >= 1`
/// - `sentinel` is not an ASCII alphanumeric character
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct MarkovConfig {
	/// Number of preceding characters used as context.
	pub order: usize,

	/// Words shorter than this are skipped on input and discarded on output.
	pub min_word_len: usize,

	/// Maximum number of characters appended to a synthesized word.
	pub max_synth_len: usize,

	/// Target output size is `seed size * multiplier`.
	pub multiplier: usize,

	/// Total attempts ceiling is `target * attempts_per_word`.
	pub attempts_per_word: usize,

	/// Consecutive attempts without a new unique word before the target is
	/// declared unreachable.
	pub stall_limit: usize,

	/// Character used to left-pad words.
	pub sentinel: char,
}

impl Default for MarkovConfig {
	fn default() -> Self {
		Self {
			order: DEFAULT_ORDER,
			min_word_len: DEFAULT_MIN_WORD_LEN,
			max_synth_len: DEFAULT_MAX_SYNTH_LEN,
			multiplier: DEFAULT_MULTIPLIER,
			attempts_per_word: DEFAULT_ATTEMPTS_PER_WORD,
			stall_limit: DEFAULT_STALL_LIMIT,
			sentinel: DEFAULT_SENTINEL,
		}
	}
}

impl MarkovConfig {
	/// Checks every invariant and reports the first violation.
	///
	/// # Errors
	/// Returns [`WordUpError::Config`] describing the offending parameter.
	pub fn validate(&self) -> Result<()> {
		if self.order < 1 {
			return Err(WordUpError::config(format!("order must be >= 1, got {}", self.order)));
		}
		if self.order > MAX_ORDER {
			return Err(WordUpError::config(format!("order must be <= {MAX_ORDER}, got {}", self.order)));
		}
		if self.min_word_len < 1 {
			return Err(WordUpError::config("min_word_len must be >= 1"));
		}
		if self.min_word_len > self.max_synth_len {
			return Err(WordUpError::config(format!(
				"min_word_len ({}) exceeds max_synth_len ({}), no word could ever qualify",
				self.min_word_len, self.max_synth_len
			)));
		}
		if self.max_synth_len > MAX_SYNTH_LEN_LIMIT {
			return Err(WordUpError::config(format!(
				"max_synth_len must be <= {MAX_SYNTH_LEN_LIMIT}, got {}",
				self.max_synth_len
			)));
		}
		if self.multiplier > MAX_MULTIPLIER {
			return Err(WordUpError::config(format!(
				"multiplier must be <= {MAX_MULTIPLIER}, got {}",
				self.multiplier
			)));
		}
		if self.attempts_per_word < 1 {
			return Err(WordUpError::config("attempts_per_word must be >= 1"));
		}
		if self.stall_limit < 1 {
			return Err(WordUpError::config("stall_limit must be >= 1"));
		}
		if self.sentinel.is_ascii_alphanumeric() {
			return Err(WordUpError::config(format!(
				"sentinel '{}' collides with the word alphabet",
				self.sentinel
			)));
		}
		Ok(())
	}

	/// Number of unique words to generate for a seed of `seed_len` words.
	pub fn target_count(&self, seed_len: usize) -> usize {
		seed_len.saturating_mul(self.multiplier)
	}

	/// Total synthesis attempts allowed for a given target.
	pub fn max_attempts(&self, target: usize) -> usize {
		target.saturating_mul(self.attempts_per_word)
	}

	/// The all-sentinel prefix every word starts from.
	pub fn start_prefix(&self) -> String {
		std::iter::repeat_n(self.sentinel, self.order).collect()
	}
}

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Mutex;
use std::thread;

use log::{debug, info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::sampler::Sampler;
use super::transition_model::TransitionModel;
use crate::config::MarkovConfig;
use crate::error::{Result, WordUpError};

/// Why a generation run stopped short of its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortfall {
	/// The total-attempts ceiling was reached.
	AttemptsExhausted,
	/// `stall_limit` consecutive attempts produced no new word; the unique
	/// word space of the model is most likely smaller than the target.
	Stalled,
}

/// Terminal state of a generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// The target count of unique words was reached.
	Complete,
	/// The model was empty, nothing could be produced.
	EmptyCorpus,
	/// Fewer words than requested, returned as-is.
	Partial(Shortfall),
}

impl Outcome {
	pub fn as_str(&self) -> &'static str {
		match self {
			Outcome::Complete => "complete",
			Outcome::EmptyCorpus => "empty-corpus",
			Outcome::Partial(Shortfall::AttemptsExhausted) => "partial-attempts-exhausted",
			Outcome::Partial(Shortfall::Stalled) => "partial-stalled",
		}
	}
}

impl fmt::Display for Outcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Result of a generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
	/// Unique synthesized words, sorted.
	pub words: BTreeSet<String>,
	/// Number of unique words requested.
	pub target: usize,
	/// Number of candidate words synthesized, duplicates and rejects included.
	pub attempts: usize,
	pub outcome: Outcome,
}

impl Expansion {
	pub(crate) fn empty(target: usize, outcome: Outcome) -> Self {
		Self { words: BTreeSet::new(), target, attempts: 0, outcome }
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	pub fn is_partial(&self) -> bool {
		matches!(self.outcome, Outcome::Partial(_))
	}
}

/// Generation state machine step.
enum Phase {
	Synthesizing,
	Done(Outcome),
}

/// Mutable state of a run: the accumulating set and its counters.
struct Progress {
	words: HashSet<String>,
	target: usize,
	attempts: usize,
	max_attempts: usize,
	since_new: usize,
	stall_limit: usize,
}

impl Progress {
	fn new(target: usize, config: &MarkovConfig) -> Self {
		Self {
			words: HashSet::new(),
			target,
			attempts: 0,
			max_attempts: config.max_attempts(target),
			since_new: 0,
			stall_limit: config.stall_limit,
		}
	}

	/// Terminal conditions, in priority order. Once `Done`, always `Done`.
	fn phase(&self) -> Phase {
		if self.words.len() >= self.target {
			Phase::Done(Outcome::Complete)
		} else if self.attempts >= self.max_attempts {
			Phase::Done(Outcome::Partial(Shortfall::AttemptsExhausted))
		} else if self.since_new >= self.stall_limit {
			Phase::Done(Outcome::Partial(Shortfall::Stalled))
		} else {
			Phase::Synthesizing
		}
	}

	/// Counts one attempt. A duplicate or rejected candidate is not progress.
	fn record(&mut self, candidate: Option<String>) {
		self.attempts += 1;
		if candidate.is_some_and(|word| self.words.insert(word)) {
			self.since_new = 0;
		} else {
			self.since_new += 1;
		}
	}

	fn finish(self, outcome: Outcome) -> Expansion {
		Expansion {
			words: self.words.into_iter().collect(),
			target: self.target,
			attempts: self.attempts,
			outcome,
		}
	}
}

/// Synthesizes new words by walking a [`TransitionModel`].
///
/// The walk follows the model's own order and sentinel; the configuration
/// supplies the length bounds and the termination ceilings.
#[derive(Clone, Debug)]
pub struct WordGenerator {
	config: MarkovConfig,
}

impl WordGenerator {
	/// # Errors
	/// Returns a configuration error if `config` is invalid.
	pub fn new(config: MarkovConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config })
	}

	pub fn config(&self) -> &MarkovConfig {
		&self.config
	}

	/// Synthesizes one candidate word.
	///
	/// Starts from the all-sentinel prefix and appends up to `max_synth_len`
	/// weighted samples, stopping early on a dead end. Returns `None` when the
	/// result is shorter than `min_word_len`.
	pub fn synthesize<R: Rng>(&self, sampler: &Sampler, rng: &mut R) -> Option<String> {
		let mut prefix = sampler.start_prefix();
		let mut word = String::with_capacity(self.config.max_synth_len);
		let mut length = 0usize;

		for _ in 0..self.config.max_synth_len {
			let Some(next_char) = sampler.next_char(&prefix, rng) else {
				break;
			};
			word.push(next_char);
			length += 1;
			prefix.remove(0);
			prefix.push(next_char);
		}

		(length >= self.config.min_word_len).then_some(word)
	}

	/// Generates up to `target` unique words.
	///
	/// Terminates in every case:
	/// - `target == 0` returns at once without sampling
	/// - an empty model returns [`Outcome::EmptyCorpus`]
	/// - otherwise synthesis runs until the target is met, the attempts
	///   ceiling is hit, or the run stalls ([`Outcome::Partial`])
	pub fn generate<R: Rng>(&self, model: &TransitionModel, target: usize, rng: &mut R) -> Expansion {
		if let Some(early) = self.early_exit(model, target) {
			return early;
		}

		let sampler = Sampler::new(model);
		let mut progress = Progress::new(target, &self.config);
		loop {
			match progress.phase() {
				Phase::Synthesizing => {
					let candidate = self.synthesize(&sampler, rng);
					progress.record(candidate);
				}
				Phase::Done(outcome) => {
					let expansion = progress.finish(outcome);
					self.report(&expansion);
					return expansion;
				}
			}
		}
	}

	/// Multi-threaded [`WordGenerator::generate`].
	///
	/// Workers synthesize candidates independently and insert them under a
	/// shared lock, where the termination conditions are re-evaluated so the
	/// target is never overshot. `workers == 0` uses one worker per logical
	/// CPU. Worker `i` is seeded with `seed + i`.
	///
	/// # Errors
	/// Returns an internal error if a worker panics or the lock is poisoned.
	pub fn generate_parallel(
		&self,
		model: &TransitionModel,
		target: usize,
		workers: usize,
		seed: u64,
	) -> Result<Expansion> {
		if let Some(early) = self.early_exit(model, target) {
			return Ok(early);
		}

		let sampler = Sampler::new(model);
		let workers = if workers == 0 { num_cpus::get() } else { workers }.max(1);
		let progress = Mutex::new(Progress::new(target, &self.config));
		debug!("Generating {target} words on {workers} workers");

		thread::scope(|scope| -> Result<()> {
			let handles: Vec<_> = (0..workers)
				.map(|i| {
					let sampler = &sampler;
					let progress = &progress;
					scope.spawn(move || -> Result<()> {
						let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
						loop {
							let candidate = self.synthesize(sampler, &mut rng);
							let mut guard = progress
								.lock()
								.map_err(|_| WordUpError::internal("generation lock poisoned"))?;
							if let Phase::Done(_) = guard.phase() {
								return Ok(());
							}
							guard.record(candidate);
						}
					})
				})
				.collect();

			for handle in handles {
				handle
					.join()
					.map_err(|_| WordUpError::internal("generator worker panicked"))??;
			}
			Ok(())
		})?;

		let progress = progress
			.into_inner()
			.map_err(|_| WordUpError::internal("generation lock poisoned"))?;
		let outcome = match progress.phase() {
			Phase::Done(outcome) => outcome,
			Phase::Synthesizing => {
				return Err(WordUpError::internal("generator workers stopped before termination"));
			}
		};
		let expansion = progress.finish(outcome);
		self.report(&expansion);
		Ok(expansion)
	}

	fn early_exit(&self, model: &TransitionModel, target: usize) -> Option<Expansion> {
		if target == 0 {
			debug!("Target is 0, skipping generation");
			return Some(Expansion::empty(0, Outcome::Complete));
		}
		if model.is_empty() {
			info!("Model is empty, no words can be generated");
			return Some(Expansion::empty(target, Outcome::EmptyCorpus));
		}
		None
	}

	fn report(&self, expansion: &Expansion) {
		if expansion.is_partial() {
			warn!(
				"Generated {} of {} requested words after {} attempts ({})",
				expansion.len(),
				expansion.target,
				expansion.attempts,
				expansion.outcome
			);
		} else {
			info!("Generated {} words in {} attempts", expansion.len(), expansion.attempts);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::SeedCorpus;
	use crate::model::builder::ModelBuilder;

	fn model_of(words: &[&str], config: &MarkovConfig) -> TransitionModel {
		let seed = SeedCorpus::from_words(words.iter().copied(), config.min_word_len);
		ModelBuilder::new(config.clone()).unwrap().build(&seed).unwrap()
	}

	#[test]
	fn zero_target_returns_immediately() {
		let config = MarkovConfig::default();
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["bank", "rank", "tank"], &config);
		let expansion = generator.generate(&model, 0, &mut StdRng::seed_from_u64(1));
		assert!(expansion.is_empty());
		assert_eq!(expansion.attempts, 0);
		assert_eq!(expansion.outcome, Outcome::Complete);
	}

	#[test]
	fn empty_model_terminates() {
		let config = MarkovConfig::default();
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&[], &config);
		let expansion = generator.generate(&model, 1_000, &mut StdRng::seed_from_u64(1));
		assert!(expansion.is_empty());
		assert_eq!(expansion.outcome, Outcome::EmptyCorpus);
	}

	#[test]
	fn bank_words_inherit_suffix() {
		let config = MarkovConfig::default();
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["bank", "rank", "tank"], &config);
		let sampler = Sampler::new(&model);
		let mut rng = StdRng::seed_from_u64(42);
		for _ in 0..100 {
			let word = generator.synthesize(&sampler, &mut rng).unwrap();
			assert!(word.ends_with("ank"), "{word}");
			assert_eq!(word.len(), 4);
		}
	}

	#[test]
	fn unreachable_target_is_partial() {
		// Only three distinct words exist in this model.
		let config = MarkovConfig { stall_limit: 500, ..Default::default() };
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["bank", "rank", "tank"], &config);
		let expansion = generator.generate(&model, 90, &mut StdRng::seed_from_u64(9));

		assert_eq!(expansion.outcome, Outcome::Partial(Shortfall::Stalled));
		let words: Vec<&str> = expansion.words.iter().map(String::as_str).collect();
		assert_eq!(words, vec!["bank", "rank", "tank"]);
	}

	#[test]
	fn attempts_ceiling_is_honoured() {
		let config = MarkovConfig { attempts_per_word: 1, stall_limit: usize::MAX, ..Default::default() };
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["bank", "rank", "tank"], &config);
		let expansion = generator.generate(&model, 10, &mut StdRng::seed_from_u64(5));
		assert_eq!(expansion.attempts, 10);
		assert_eq!(expansion.outcome, Outcome::Partial(Shortfall::AttemptsExhausted));
	}

	#[test]
	fn words_shorter_than_min_are_discarded() {
		// Every walk dies after 3 characters.
		let config = MarkovConfig { min_word_len: 4, ..Default::default() };
		let mut model = TransitionModel::new(2, '~').unwrap();
		model.add_word("cat");
		let generator = WordGenerator::new(config).unwrap();
		let sampler = Sampler::new(&model);
		assert_eq!(generator.synthesize(&sampler, &mut StdRng::seed_from_u64(2)), None);
	}

	#[test]
	fn length_is_capped() {
		// "abab..." loops forever without the cap.
		let config = MarkovConfig { order: 1, max_synth_len: 6, ..Default::default() };
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["abab"], &config);
		let sampler = Sampler::new(&model);
		let word = generator.synthesize(&sampler, &mut StdRng::seed_from_u64(0)).unwrap();
		assert_eq!(word, "ababab");
	}

	#[test]
	fn parallel_generation_hits_target_exactly() {
		// Order 1 branches enough for far more than 40 unique words.
		let config = MarkovConfig { order: 1, ..Default::default() };
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(
			&["banking", "lending", "mortgage", "savings", "account", "checking", "wealth", "trusted"],
			&config,
		);
		let expansion = generator.generate_parallel(&model, 40, 4, 11).unwrap();
		assert_eq!(expansion.outcome, Outcome::Complete);
		assert_eq!(expansion.len(), 40);
	}

	#[test]
	fn parallel_generation_terminates_when_stalled() {
		let config = MarkovConfig { stall_limit: 200, ..Default::default() };
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["bank", "rank", "tank"], &config);
		let expansion = generator.generate_parallel(&model, 50, 3, 1).unwrap();
		assert!(expansion.is_partial());
		assert_eq!(expansion.len(), 3);
	}

	#[test]
	fn seeded_generation_is_reproducible() {
		let config = MarkovConfig { order: 1, ..Default::default() };
		let generator = WordGenerator::new(config.clone()).unwrap();
		let model = model_of(&["banking", "lending", "mortgage", "savings"], &config);
		let first = generator.generate(&model, 20, &mut StdRng::seed_from_u64(77));
		let second = generator.generate(&model, 20, &mut StdRng::seed_from_u64(77));
		assert_eq!(first, second);
	}
}

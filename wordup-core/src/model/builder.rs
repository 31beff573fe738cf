use std::sync::mpsc;
use std::thread;

use log::debug;

use super::transition_model::TransitionModel;
use crate::config::MarkovConfig;
use crate::corpus::SeedCorpus;
use crate::error::{Result, WordUpError};

/// Builds a [`TransitionModel`] from a seed corpus.
///
/// The corpus is only read; the model is built fresh on every call.
#[derive(Clone, Debug)]
pub struct ModelBuilder {
	config: MarkovConfig,
}

impl ModelBuilder {
	/// # Errors
	/// Returns a configuration error if `config` is invalid.
	pub fn new(config: MarkovConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config })
	}

	pub fn config(&self) -> &MarkovConfig {
		&self.config
	}

	/// Whether a word may enter the model.
	///
	/// Short words are skipped, and so is anything outside `a-z`, which keeps
	/// the sentinel out of the real alphabet.
	fn accepts(&self, word: &str) -> bool {
		word.len() >= self.config.min_word_len && word.bytes().all(|b| b.is_ascii_lowercase())
	}

	/// Number of seed words that pass [`ModelBuilder`]'s checks and will shape the model.
	pub fn accepted_count(&self, seed: &SeedCorpus) -> usize {
		seed.iter().filter(|word| self.accepts(word)).count()
	}

	/// Single linear pass over the corpus.
	///
	/// An empty corpus yields an empty (valid) model.
	pub fn build(&self, seed: &SeedCorpus) -> Result<TransitionModel> {
		let model = self.build_words(seed.iter())?;
		debug!(
			"Built order-{} model from {} seed words: {:?}",
			self.config.order,
			seed.len(),
			model.stats()
		);
		Ok(model)
	}

	fn build_words<'a, I>(&self, words: I) -> Result<TransitionModel>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut model = TransitionModel::new(self.config.order, self.config.sentinel)?;
		let mut skipped = 0usize;
		for word in words {
			if self.accepts(word) {
				model.add_word(word);
			} else {
				skipped += 1;
			}
		}
		if skipped > 0 {
			debug!("Skipped {skipped} seed words failing validation");
		}
		Ok(model)
	}

	/// Builds partial models over corpus chunks in parallel and merges them.
	///
	/// `workers == 0` uses one chunk per logical CPU. Partial counts are
	/// summed, so the result equals [`ModelBuilder::build`] on the same corpus.
	///
	/// # Errors
	/// Returns an internal error if a worker panics or merging fails.
	pub fn build_parallel(&self, seed: &SeedCorpus, workers: usize) -> Result<TransitionModel> {
		let words: Vec<String> = seed.iter().map(str::to_owned).collect();
		let chunks = if workers == 0 { num_cpus::get() } else { workers }.max(1);
		let chunk_size = words.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		let mut handles = Vec::new();
		for chunk in words.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			let builder = self.clone();

			handles.push(thread::spawn(move || {
				let partial = builder.build_words(chunk.iter().map(String::as_str));
				// The receiver outlives every worker.
				let _ = tx.send(partial);
			}));
		}
		drop(tx);

		let mut final_model = TransitionModel::new(self.config.order, self.config.sentinel)?;
		for partial in rx.iter() {
			final_model.merge(&partial?)?;
		}
		for handle in handles {
			handle
				.join()
				.map_err(|_| WordUpError::internal("model builder worker panicked"))?;
		}

		debug!(
			"Built order-{} model from {} seed words on {} chunks: {:?}",
			self.config.order,
			seed.len(),
			chunks,
			final_model.stats()
		);
		Ok(final_model)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bank_corpus() -> SeedCorpus {
		SeedCorpus::from_words(["bank", "rank", "tank"], 4)
	}

	#[test]
	fn bank_rank_tank_scenario() {
		let builder = ModelBuilder::new(MarkovConfig::default()).unwrap();
		let model = builder.build(&bank_corpus()).unwrap();

		let start: Vec<(char, u32)> = model.get("~~").unwrap().iter().collect();
		assert_eq!(start, vec![('b', 1), ('r', 1), ('t', 1)]);
		let an: Vec<(char, u32)> = model.get("an").unwrap().iter().collect();
		assert_eq!(an, vec![('k', 3)]);
	}

	#[test]
	fn empty_corpus_gives_empty_model() {
		let builder = ModelBuilder::new(MarkovConfig::default()).unwrap();
		let model = builder.build(&SeedCorpus::new(4)).unwrap();
		assert!(model.is_empty());
		assert_eq!(model.total_count(), 0);
	}

	#[test]
	fn skips_words_below_min_len() {
		// The corpus was validated at 3, the builder runs at 4.
		let seed = SeedCorpus::from_words(["cat", "bank"], 3);
		let builder = ModelBuilder::new(MarkovConfig::default()).unwrap();
		let model = builder.build(&seed).unwrap();
		assert_eq!(model.total_count(), 4);
		assert_eq!(model.get("~~").unwrap().count('c'), 0);
		assert_eq!(builder.accepted_count(&seed), 1);
	}

	#[test]
	fn invalid_config_fails_fast() {
		let config = MarkovConfig { order: 0, ..Default::default() };
		assert!(ModelBuilder::new(config).is_err());
	}

	#[test]
	fn parallel_build_matches_single_pass() {
		let seed = SeedCorpus::from_words(
			["bank", "banking", "lending", "mortgage", "savings", "account", "checking", "wealth", "trust"],
			4,
		);
		let builder = ModelBuilder::new(MarkovConfig::default()).unwrap();
		let single = builder.build(&seed).unwrap();
		for workers in [0, 1, 3, 16] {
			assert_eq!(builder.build_parallel(&seed, workers).unwrap(), single);
		}
	}

	#[test]
	fn parallel_build_of_empty_corpus() {
		let builder = ModelBuilder::new(MarkovConfig::default()).unwrap();
		assert!(builder.build_parallel(&SeedCorpus::new(4), 4).unwrap().is_empty());
	}
}

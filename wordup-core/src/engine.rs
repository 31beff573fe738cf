use log::{debug, info};
use rand::Rng;

use crate::config::MarkovConfig;
use crate::corpus::SeedCorpus;
use crate::error::Result;
use crate::model::{Expansion, ModelBuilder, ModelStats, Outcome, WordGenerator};

/// Seed corpus in, expanded word set out.
///
/// Wires a [`ModelBuilder`] and a [`WordGenerator`] sharing one validated
/// configuration. The target size is `usable * multiplier`, where `usable`
/// counts the seed words the builder accepts under this configuration.
#[derive(Clone, Debug)]
pub struct Engine {
	builder: ModelBuilder,
	generator: WordGenerator,
}

/// An expansion together with the statistics of the model behind it.
#[derive(Clone, Debug)]
pub struct EngineReport {
	pub expansion: Expansion,
	/// `None` when no model was built (empty seed or target 0).
	pub model: Option<ModelStats>,
}

impl Engine {
	/// Validates `config` before anything else happens.
	///
	/// # Errors
	/// Returns a configuration error on any invalid parameter.
	pub fn new(config: MarkovConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			builder: ModelBuilder::new(config.clone())?,
			generator: WordGenerator::new(config)?,
		})
	}

	pub fn config(&self) -> &MarkovConfig {
		self.builder.config()
	}

	/// Runs model building and generation on the current thread.
	pub fn expand<R: Rng>(&self, seed: &SeedCorpus, rng: &mut R) -> Result<EngineReport> {
		let Some(target) = self.plan(seed) else {
			return Ok(EngineReport { expansion: Expansion::empty(0, Outcome::EmptyCorpus), model: None });
		};
		if let Some(report) = Self::nothing_to_do(target) {
			return Ok(report);
		}

		let model = self.builder.build(seed)?;
		let expansion = self.generator.generate(&model, target, rng);
		Ok(EngineReport { expansion, model: Some(model.stats()) })
	}

	/// Builds and generates on `workers` threads (`0` = one per CPU).
	pub fn expand_parallel(&self, seed: &SeedCorpus, workers: usize, rng_seed: u64) -> Result<EngineReport> {
		let Some(target) = self.plan(seed) else {
			return Ok(EngineReport { expansion: Expansion::empty(0, Outcome::EmptyCorpus), model: None });
		};
		if let Some(report) = Self::nothing_to_do(target) {
			return Ok(report);
		}

		let model = self.builder.build_parallel(seed, workers)?;
		let expansion = self.generator.generate_parallel(&model, target, workers, rng_seed)?;
		Ok(EngineReport { expansion, model: Some(model.stats()) })
	}

	/// Number of seed words the builder will learn from.
	pub fn usable_words(&self, seed: &SeedCorpus) -> usize {
		self.builder.accepted_count(seed)
	}

	/// Target size for `seed`, or `None` when no seed word is usable.
	fn plan(&self, seed: &SeedCorpus) -> Option<usize> {
		let usable = self.usable_words(seed);
		if usable == 0 {
			info!("No usable seed words among {}, no words can be generated", seed.len());
			return None;
		}
		let target = self.config().target_count(usable);
		info!("Expanding {} usable seed words ({} given) to {} words", usable, seed.len(), target);
		Some(target)
	}

	fn nothing_to_do(target: usize) -> Option<EngineReport> {
		if target == 0 {
			debug!("Target size is 0, nothing to generate");
			return Some(EngineReport { expansion: Expansion::empty(0, Outcome::Complete), model: None });
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn multiplier_zero_skips_everything() {
		let engine = Engine::new(MarkovConfig { multiplier: 0, ..Default::default() }).unwrap();
		let seed = SeedCorpus::from_words(["bank", "rank", "tank"], 4);
		let report = engine.expand(&seed, &mut StdRng::seed_from_u64(1)).unwrap();
		assert!(report.expansion.is_empty());
		assert_eq!(report.expansion.outcome, Outcome::Complete);
		assert!(report.model.is_none());
	}

	#[test]
	fn empty_seed_reports_empty_corpus() {
		let engine = Engine::new(MarkovConfig::default()).unwrap();
		let report = engine.expand(&SeedCorpus::new(4), &mut StdRng::seed_from_u64(1)).unwrap();
		assert!(report.expansion.is_empty());
		assert_eq!(report.expansion.outcome, Outcome::EmptyCorpus);
	}

	#[test]
	fn seed_with_only_rejected_words_is_empty_corpus() {
		// Corpus validated at 3, engine requires 5: every word is skipped by the builder.
		let engine = Engine::new(MarkovConfig { min_word_len: 5, ..Default::default() }).unwrap();
		let seed = SeedCorpus::from_words(["bank", "rank"], 3);
		let report = engine.expand(&seed, &mut StdRng::seed_from_u64(1)).unwrap();
		assert_eq!(report.expansion.outcome, Outcome::EmptyCorpus);
		assert!(report.expansion.is_empty());
	}

	#[test]
	fn target_counts_only_accepted_words() {
		// Two of four seed words survive the engine's min length of 4.
		let engine = Engine::new(MarkovConfig { multiplier: 1, ..Default::default() }).unwrap();
		let seed = SeedCorpus::from_words(["cat", "dog", "bank", "rank"], 3);
		assert_eq!(engine.usable_words(&seed), 2);
		let report = engine.expand(&seed, &mut StdRng::seed_from_u64(4)).unwrap();
		assert_eq!(report.expansion.target, 2);
		assert_eq!(report.expansion.outcome, Outcome::Complete);
		assert_eq!(report.expansion.words.iter().collect::<Vec<_>>(), vec!["bank", "rank"]);
	}

	#[test]
	fn invalid_config_fails_before_building() {
		let err = Engine::new(MarkovConfig { min_word_len: 30, ..Default::default() }).unwrap_err();
		assert!(err.is_config());
	}

	#[test]
	fn expand_reaches_target() {
		let engine = Engine::new(MarkovConfig { order: 1, multiplier: 5, ..Default::default() }).unwrap();
		let seed = SeedCorpus::from_words(["banking", "lending", "mortgage", "savings", "account"], 4);
		let report = engine.expand(&seed, &mut StdRng::seed_from_u64(3)).unwrap();
		assert_eq!(report.expansion.outcome, Outcome::Complete);
		assert_eq!(report.expansion.len(), 25);
		assert_eq!(report.model.unwrap().total_count, 7 + 7 + 8 + 7 + 7);
	}

	#[test]
	fn parallel_expand_reaches_target() {
		let engine = Engine::new(MarkovConfig { order: 1, multiplier: 5, ..Default::default() }).unwrap();
		let seed = SeedCorpus::from_words(["banking", "lending", "mortgage", "savings", "account"], 4);
		let report = engine.expand_parallel(&seed, 2, 99).unwrap();
		assert_eq!(report.expansion.len(), 25);
	}
}

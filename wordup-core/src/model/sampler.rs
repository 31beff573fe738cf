use std::collections::HashMap;

use rand::Rng;

use super::frequency::CumulativeTable;
use super::transition_model::TransitionModel;

/// Read-only sampling view of a [`TransitionModel`].
///
/// Cumulative tables are computed once so that each generation step costs a
/// hash lookup and a binary search.
#[derive(Clone, Debug)]
pub struct Sampler {
	order: usize,
	sentinel: char,
	tables: HashMap<String, CumulativeTable>,
}

impl Sampler {
	pub fn new(model: &TransitionModel) -> Self {
		let tables = model
			.states()
			.filter(|(_, table)| !table.is_empty())
			.map(|(prefix, table)| (prefix.to_owned(), table.cumulative()))
			.collect();
		Self { order: model.order(), sentinel: model.sentinel(), tables }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}

	pub fn start_prefix(&self) -> String {
		std::iter::repeat_n(self.sentinel, self.order).collect()
	}

	/// Samples the character following `prefix`. `None` on a dead end.
	pub fn next_char<R: Rng>(&self, prefix: &str, rng: &mut R) -> Option<char> {
		self.tables.get(prefix)?.sample(rng)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn unknown_prefix_is_dead_end() {
		let mut model = TransitionModel::new(2, '~').unwrap();
		model.add_word("bank");
		let sampler = Sampler::new(&model);
		let mut rng = StdRng::seed_from_u64(3);
		assert_eq!(sampler.next_char("zz", &mut rng), None);
		assert_eq!(sampler.next_char("~~", &mut rng), Some('b'));
		assert_eq!(sampler.start_prefix(), "~~");
	}

	#[test]
	fn empty_model_compiles_to_empty_sampler() {
		let model = TransitionModel::new(2, '~').unwrap();
		assert!(Sampler::new(&model).is_empty());
	}
}

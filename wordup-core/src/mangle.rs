//! Rule-based word variations for the comprehensive wordlist.
//!
//! Complements the Markov expansion with the substitutions people apply to
//! real passwords: leetspeak, separators, digits and common suffixes.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const LEETSPEAK_MAP: &[(char, &[char])] = &[
	('a', &['4', '@']),
	('e', &['3']),
	('i', &['1', '!']),
	('o', &['0']),
	('s', &['5', '$']),
	('t', &['7']),
	('l', &['1']),
	('g', &['9']),
	('b', &['6']),
	('z', &['2']),
];

const UMLAUT_MAP: &[(char, &str)] = &[
	('ä', "ae"),
	('ö', "oe"),
	('ü', "ue"),
	('ß', "ss"),
	('Ä', "Ae"),
	('Ö', "Oe"),
	('Ü', "Ue"),
];

const SEPARATORS: &[char] = &['-', '_', '.'];

const COMMON_SUFFIXES: &[&str] = &["s", "ing", "ed", "er", "est", "ly", "tion", "sion", "ness", "ment"];

/// Separators are only inserted into words longer than this.
const MIN_SPLIT_LEN: usize = 4;

/// Which variation families to produce.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct MangleOptions {
	pub leetspeak: bool,
	pub separators: bool,
	pub digits: bool,
	pub suffixes: bool,
}

impl Default for MangleOptions {
	fn default() -> Self {
		Self { leetspeak: true, separators: true, digits: true, suffixes: true }
	}
}

/// Produces variations of seed words.
#[derive(Clone, Debug, Default)]
pub struct Mangler {
	options: MangleOptions,
}

impl Mangler {
	pub fn new(options: MangleOptions) -> Self {
		Self { options }
	}

	/// Every variation of `word`, the word itself included.
	///
	/// - leetspeak: one letter class substituted at a time (`sale` → `s4le`, `s@le`)
	/// - separators: `-`, `_` or `.` between any two letters of words longer than 4
	/// - digits: `word7`, `7word`, `word77`
	/// - suffixes: `words`, `wording`, `wordment`, ...
	pub fn mangle(&self, word: &str) -> BTreeSet<String> {
		let mut variations = BTreeSet::new();
		variations.insert(word.to_owned());

		if self.options.leetspeak {
			for (original, replacements) in LEETSPEAK_MAP {
				if word.contains(*original) {
					for replacement in *replacements {
						variations.insert(word.replace(*original, &replacement.to_string()));
					}
				}
			}
		}

		if self.options.separators && word.chars().count() > MIN_SPLIT_LEN {
			for (i, _) in word.char_indices().skip(1) {
				for separator in SEPARATORS {
					variations.insert(format!("{}{}{}", &word[..i], separator, &word[i..]));
				}
			}
		}

		if self.options.digits {
			for digit in 0..10 {
				variations.insert(format!("{word}{digit}"));
				variations.insert(format!("{digit}{word}"));
				variations.insert(format!("{word}{digit}{digit}"));
			}
		}

		if self.options.suffixes {
			for suffix in COMMON_SUFFIXES {
				variations.insert(format!("{word}{suffix}"));
			}
		}

		variations
	}

	/// Union of the variations of every word.
	pub fn mangle_all<I, S>(&self, words: I) -> BTreeSet<String>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		words.into_iter().flat_map(|w| self.mangle(w.as_ref())).collect()
	}
}

/// Spells German umlauts and sharp s in ASCII (`Müller` → `Mueller`).
pub fn fold_umlauts(text: &str) -> Cow<'_, str> {
	if !text.chars().any(|c| UMLAUT_MAP.iter().any(|(u, _)| *u == c)) {
		return Cow::Borrowed(text);
	}
	let mut folded = String::with_capacity(text.len() + 8);
	for c in text.chars() {
		match UMLAUT_MAP.iter().find(|(u, _)| *u == c) {
			Some((_, replacement)) => folded.push_str(replacement),
			None => folded.push(c),
		}
	}
	Cow::Owned(folded)
}

//! Seed corpus: the validated word set the engine learns from.
//!
//! Network discovery and page fetching live outside this crate. What remains
//! here is the local half of corpus collection: turning text or saved HTML
//! into lowercase words and validating them.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node, Selector};

use crate::error::{Result, WordUpError};
use crate::mangle::fold_umlauts;

static HTML_HINT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)<(?:!--|!doctype\b|/?[a-zA-Z][a-zA-Z0-9-]*[\s/>])").expect("static regex"));

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Attributes that carry human-readable text, harvested after the page text.
const TEXT_ATTRIBUTES: &[(&str, &str)] = &[
	("meta[content]", "content"),
	("img[alt]", "alt"),
	("[title]", "title"),
	("[placeholder]", "placeholder"),
	("[aria-label]", "aria-label"),
];

const COMMON_WORDS: &[&str] = &[
	"the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one", "our", "out", "day",
	"get", "has", "him", "his", "how", "its", "may", "new", "now", "old", "see", "two", "who", "boy", "did", "man",
	"men", "put", "say", "she", "too", "use", "will", "with", "this", "that", "they", "have", "from", "been", "than",
	"what", "some", "time", "very", "when", "come", "here", "just", "like", "long", "make", "many", "over", "such",
	"take", "them", "well", "were", "good", "much",
];

/// Whether `word` is a filler word too common to characterize a target.
pub fn is_common_word(word: &str) -> bool {
	COMMON_WORDS.contains(&word)
}

/// Validated, sorted set of seed words.
///
/// Every member is lowercase ASCII alphabetic with length >= the
/// `min_word_len` the corpus was built with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedCorpus {
	min_word_len: usize,
	words: BTreeSet<String>,
}

impl SeedCorpus {
	/// Creates an empty corpus accepting words of at least `min_word_len`.
	pub fn new(min_word_len: usize) -> Self {
		Self { min_word_len, words: BTreeSet::new() }
	}

	/// Builds a corpus from arbitrary tokens.
	///
	/// Tokens are trimmed, umlaut-folded and lowercased; anything that is not
	/// then purely ASCII alphabetic or is shorter than `min_word_len` is
	/// silently skipped.
	pub fn from_words<I, S>(words: I, min_word_len: usize) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut corpus = Self::new(min_word_len);
		corpus.extend(words);
		corpus
	}

	/// Builds a corpus from a text or HTML document.
	pub fn from_document(text: &str, extractor: &WordExtractor) -> Self {
		Self::from_words(extractor.document_words(text), extractor.min_word_len())
	}

	/// Adds a single token. Returns `true` if it was accepted and new.
	pub fn insert(&mut self, word: &str) -> bool {
		let word = fold_umlauts(word.trim());
		if word.len() < self.min_word_len || !word.bytes().all(|b| b.is_ascii_alphabetic()) {
			return false;
		}
		self.words.insert(word.to_ascii_lowercase())
	}

	/// Adds every acceptable token of `words`.
	pub fn extend<I, S>(&mut self, words: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for word in words {
			self.insert(word.as_ref());
		}
	}

	/// Merges another corpus, re-validating its words against this one's bound.
	pub fn merge(&mut self, other: &SeedCorpus) {
		self.extend(other.iter());
	}

	pub fn min_word_len(&self) -> usize {
		self.min_word_len
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	pub fn contains(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	/// Iterates the words in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
		self.words.iter().map(String::as_str)
	}

	pub fn words(&self) -> &BTreeSet<String> {
		&self.words
	}

	pub fn into_words(self) -> BTreeSet<String> {
		self.words
	}
}

/// Turns text and HTML into lowercase word tokens.
///
/// Holds the compiled word pattern (`\b[a-zA-Z]{N,}\b`) and the attribute
/// selectors, so one extractor serves any number of documents.
#[derive(Debug)]
pub struct WordExtractor {
	min_word_len: usize,
	word_regex: Regex,
	attribute_selectors: Vec<(Selector, &'static str)>,
}

impl WordExtractor {
	pub fn new(min_word_len: usize) -> Result<Self> {
		let min_word_len = min_word_len.max(1);
		let word_regex = Regex::new(&format!(r"\b[a-zA-Z]{{{min_word_len},}}\b"))
			.map_err(|e| WordUpError::config(format!("word pattern: {e}")))?;
		let attribute_selectors = TEXT_ATTRIBUTES
			.iter()
			.map(|(css, attribute)| {
				Selector::parse(css)
					.map(|selector| (selector, *attribute))
					.map_err(|e| WordUpError::internal(format!("selector {css}: {e:?}")))
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(Self { min_word_len, word_regex, attribute_selectors })
	}

	pub fn min_word_len(&self) -> usize {
		self.min_word_len
	}

	/// Every run of at least `min_word_len` ASCII letters, lowercased.
	///
	/// Umlauts are spelled out first (`Müller` → `mueller`); a run glued to
	/// digits, underscores or other letters is not a word.
	pub fn extract_words(&self, text: &str) -> Vec<String> {
		self.word_regex
			.find_iter(&fold_umlauts(text))
			.map(|m| m.as_str().to_ascii_lowercase())
			.collect()
	}

	/// Words of an HTML page: its rendered text, then its text attributes.
	///
	/// Entities are decoded by the parser. Text nodes are joined with spaces
	/// so adjacent blocks do not glue their words together.
	pub fn html_words(&self, html: &str) -> Vec<String> {
		let document = Html::parse_document(html);

		let mut text = String::new();
		for node in document.root_element().descendants() {
			let Node::Text(fragment) = node.value() else {
				continue;
			};
			let hidden = node
				.parent()
				.and_then(|parent| parent.value().as_element().map(|e| HIDDEN_ELEMENTS.contains(&e.name())))
				.unwrap_or(false);
			if !hidden {
				text.push_str(fragment);
				text.push(' ');
			}
		}
		let mut words = self.extract_words(&text);

		for (selector, attribute) in &self.attribute_selectors {
			for element in document.select(selector) {
				if let Some(value) = element.value().attr(attribute) {
					words.extend(self.extract_words(value));
				}
			}
		}
		words
	}

	/// Words of a document, parsed as HTML when it looks like markup.
	///
	/// Common filler words are dropped.
	pub fn document_words(&self, text: &str) -> Vec<String> {
		let mut words = if looks_like_html(text) { self.html_words(text) } else { self.extract_words(text) };
		words.retain(|word| !is_common_word(word));
		words
	}
}

/// Whether `text` looks like an HTML document or fragment.
pub fn looks_like_html(text: &str) -> bool {
	HTML_HINT.is_match(text)
}

/// Most frequent tokens, by descending count then alphabetically.
pub fn top_words<I, S>(tokens: I, limit: usize) -> Vec<(String, usize)>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut counts: HashMap<String, usize> = HashMap::new();
	for token in tokens {
		*counts.entry(token.as_ref().to_owned()).or_insert(0) += 1;
	}
	let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
	ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	ranked.truncate(limit);
	ranked
}

#[cfg(test)]
mod tests {
	use super::*;

	fn extractor(min_word_len: usize) -> WordExtractor {
		WordExtractor::new(min_word_len).unwrap()
	}

	#[test]
	fn from_words_filters_and_lowercases() {
		let corpus = SeedCorpus::from_words(["Bank", "rank", "tan", "t4nk", "  tank ", "bank"], 4);
		let words: Vec<&str> = corpus.iter().collect();
		assert_eq!(words, vec!["bank", "rank", "tank"]);
		assert_eq!(corpus.min_word_len(), 4);
	}

	#[test]
	fn rejects_non_ascii_but_folds_umlauts() {
		let corpus = SeedCorpus::from_words(["café", "naïve", "resume", "Müller"], 4);
		let words: Vec<&str> = corpus.iter().collect();
		assert_eq!(words, vec!["mueller", "resume"]);
	}

	#[test]
	fn extract_words_respects_boundaries() {
		let words = extractor(4).extract_words("Welcome to ACME_Corp portal2 online-banking, since 1999!");
		assert_eq!(words, vec!["welcome", "online", "banking", "since"]);
	}

	#[test]
	fn extract_words_folds_umlauts() {
		assert_eq!(extractor(4).extract_words("Grüße aus Köln"), vec!["gruesse", "koeln"]);
	}

	#[test]
	fn html_drops_scripts_and_comments() {
		let html = "<html><head><title>Acme Bank</title><style>.x{color:red}</style></head>\
			<body><p>Secure<b>banking</b></p><script>var hidden = 1;</script><!-- secret --></body></html>";
		let words = extractor(4).html_words(html);
		assert_eq!(words, vec!["acme", "bank", "secure", "banking"]);
	}

	#[test]
	fn html_entities_are_decoded() {
		let html = "<p>Copyright&nbsp;2024&nbsp;Acme &amp; Sons&hellip;</p><p>caf&eacute; &lt;tag&gt;</p>";
		let words = extractor(4).document_words(html);
		assert_eq!(words, vec!["copyright", "acme", "sons"]);
	}

	#[test]
	fn html_attributes_are_harvested() {
		let html = r#"<html><head><meta name="description" content="Mortgage lending"></head>
			<body><img src="b.png" alt="Riverside branch"><input placeholder="Username">
			<a href="/" title="Homepage">x</a><button aria-label="Search">go</button></body></html>"#;
		let words = extractor(4).document_words(html);
		assert_eq!(words, vec!["mortgage", "lending", "riverside", "branch", "homepage", "username", "search"]);
	}

	#[test]
	fn document_words_handles_fragments() {
		let corpus = SeedCorpus::from_document("<div>Trusted<span>lending</span></div>", &extractor(4));
		let words: Vec<&str> = corpus.iter().collect();
		assert_eq!(words, vec!["lending", "trusted"]);
	}

	#[test]
	fn plain_text_is_not_parsed() {
		assert!(!looks_like_html("a < b and c > d"));
		assert!(looks_like_html("<!DOCTYPE html><html></html>"));
		assert!(looks_like_html("intro <br/> outro"));
		assert_eq!(extractor(4).document_words("alpha < beta > gamma"), vec!["alpha", "beta", "gamma"]);
	}

	#[test]
	fn common_words_are_dropped() {
		assert!(is_common_word("with"));
		assert!(!is_common_word("bank"));
		let words = extractor(4).document_words("Bank with them over here, loans that work");
		assert_eq!(words, vec!["bank", "loans", "work"]);
	}

	#[test]
	fn top_words_ranking() {
		let ranked = top_words(["bank", "loan", "bank", "card", "loan", "bank"], 2);
		assert_eq!(ranked, vec![("bank".to_owned(), 3), ("loan".to_owned(), 2)]);
	}

	#[test]
	fn merge_revalidates() {
		let mut strict = SeedCorpus::new(5);
		strict.merge(&SeedCorpus::from_words(["bank", "banking"], 4));
		assert_eq!(strict.iter().collect::<Vec<_>>(), vec!["banking"]);
	}
}

use super::data::*;
use crate::classifier::Classifier;

/// Turns the text of a word bubble into a leaf. Only a phrase with exactly
/// one interior space is ambiguous; it is a term when the service tokenizes
/// it as one unit.
pub fn resolve_leaf(word: &str, classifier: &impl Classifier) -> Result<Leaf> {
	let word = word.trim();
	match interior_spaces(word) {
		0 => Ok(Leaf::Term(word.to_string())),
		1 => {
			let count = classifier
				.token_count(word)
				.map_err(|err| ParseError::ClassifierUnavailable(err.to_string()))?;
			log::debug!("{:?} tokenizes into {} unit(s)", word, count);
			if count == 1 {
				Ok(Leaf::Term(word.to_string()))
			} else {
				Ok(Leaf::Text(word.to_string()))
			}
		}
		_ => Ok(Leaf::Text(word.to_string())),
	}
}

/// Distinct two-word phrases in first-seen order; these are the only leaves
/// that need the classifier.
pub fn ambiguous_phrases(tokens: &[Token]) -> Vec<String> {
	let mut phrases: Vec<String> = Vec::new();
	for token in tokens {
		if let Token::Word(text) = token {
			let text = text.trim();
			if interior_spaces(text) == 1 && !phrases.iter().any(|p| p == text) {
				phrases.push(text.to_string());
			}
		}
	}
	phrases
}

/// Whitespace characters inside trimmed text; `"hot  dog"` has two.
fn interior_spaces(text: &str) -> usize {
	text.trim().chars().filter(|c| c.is_whitespace()).count()
}

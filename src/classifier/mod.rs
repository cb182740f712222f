//! Compound-term classification.
//!
//! Parsing is synchronous and consumes a [`Classifier`]. The network side is
//! the asynchronous [`Lookup`]; its answers are gathered into a [`Resolved`]
//! table before parsing starts.

mod remote;

pub use remote::RemoteClassifier;

use futures::future::{self, BoxFuture};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ClassifierError(pub String);

impl From<anyhow::Error> for ClassifierError {
	fn from(err: anyhow::Error) -> Self {
		ClassifierError(format!("{:#}", err))
	}
}

pub trait Classifier {
	/// Number of semantic units the service splits `phrase` into.
	fn token_count(&self, phrase: &str) -> Result<usize, ClassifierError>;
}

impl<F> Classifier for F
where
	F: Fn(&str) -> Result<usize, ClassifierError>,
{
	fn token_count(&self, phrase: &str) -> Result<usize, ClassifierError> {
		self(phrase)
	}
}

pub trait Lookup: Send + Sync {
	fn token_count<'a>(&'a self, phrase: &'a str) -> BoxFuture<'a, Result<usize, ClassifierError>>;
}

/// Answers collected ahead of parsing. Asking about an unknown phrase is an
/// error, never a silent guess.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolved {
	counts: HashMap<String, usize>,
}

impl Resolved {
	pub fn insert(&mut self, phrase: String, count: usize) {
		self.counts.insert(phrase, count);
	}

	pub fn extend(&mut self, other: Resolved) {
		self.counts.extend(other.counts);
	}

	pub fn contains(&self, phrase: &str) -> bool {
		self.counts.contains_key(phrase)
	}

	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn clear(&mut self) {
		self.counts.clear();
	}

	/// Queries `lookup` for every phrase not answered yet, concurrently.
	pub async fn resolve(&mut self, lookup: &dyn Lookup, phrases: &[String]) -> Result<(), ClassifierError> {
		let missing: Vec<&String> = phrases.iter().filter(|p| !self.contains(p)).collect();
		if missing.is_empty() {
			return Ok(());
		}
		log::debug!("classifying {} phrase(s)", missing.len());
		let counts = future::try_join_all(missing.iter().map(|p| lookup.token_count(p))).await?;
		for (phrase, count) in missing.into_iter().zip(counts) {
			self.insert(phrase.clone(), count);
		}
		Ok(())
	}
}

impl Classifier for Resolved {
	fn token_count(&self, phrase: &str) -> Result<usize, ClassifierError> {
		self.counts
			.get(phrase)
			.copied()
			.ok_or_else(|| ClassifierError(format!("no answer for {:?}", phrase)))
	}
}

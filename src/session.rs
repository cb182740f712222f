use crate::classifier::{Lookup, Resolved};
use crate::document::{from_document, DocumentError};
use crate::parser::{self, Expression, ParseError, Token, TokenKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
	#[error(transparent)]
	Syntax(#[from] ParseError),
	#[error("input changed while classification was in flight")]
	Stale,
}

/// Phrases remembered before the memo starts over.
pub const MEMO_CAPACITY: usize = 4096;

/// One editing session. Compiles the latest input, remembers classifier
/// answers, and drops results overtaken by a newer compile.
pub struct Session<L> {
	lookup: L,
	memo: Mutex<Resolved>,
	memo_capacity: usize,
	generation: AtomicU64,
}

impl<L: Lookup> Session<L> {
	pub fn new(lookup: L) -> Self {
		Self::with_memo_capacity(lookup, MEMO_CAPACITY)
	}

	/// The memo is dropped whole once it holds more than `capacity` phrases.
	pub fn with_memo_capacity(lookup: L, capacity: usize) -> Self {
		Self {
			lookup,
			memo: Mutex::default(),
			memo_capacity: capacity,
			generation: AtomicU64::new(0),
		}
	}

	pub async fn compile(&self, input: &str) -> Result<Expression, CompileError> {
		let generation = self.next_generation();
		parser::validate(input)?;
		self.fold(generation, parser::tokenize(input)).await
	}

	pub async fn compile_tokens(&self, tokens: Vec<Token>) -> Result<Expression, CompileError> {
		let generation = self.next_generation();
		parser::validate_tokens(&tokens)?;
		self.fold(generation, tokens).await
	}

	fn next_generation(&self) -> u64 {
		self.generation.fetch_add(1, Ordering::SeqCst) + 1
	}

	async fn fold(&self, generation: u64, tokens: Vec<Token>) -> Result<Expression, CompileError> {
		let phrases = parser::ambiguous_phrases(&tokens);
		let mut resolved = self.memo.lock().unwrap_or_else(PoisonError::into_inner).clone();
		resolved
			.resolve(&self.lookup, &phrases)
			.await
			.map_err(|err| ParseError::ClassifierUnavailable(err.0))?;
		{
			let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
			memo.extend(resolved.clone());
			if memo.len() > self.memo_capacity {
				log::debug!("classifier memo passed {} phrases, starting over", self.memo_capacity);
				memo.clear();
			}
		}

		let latest = self.generation.load(Ordering::SeqCst);
		if latest != generation {
			log::debug!("discarding compile #{}, input is now at #{}", generation, latest);
			return Err(CompileError::Stale);
		}
		Ok(parser::parse(&tokens, &resolved)?)
	}
}

/// Bubbles for re-displaying a document received from the service.
pub fn decompile(document: &str) -> Result<(Vec<TokenKind>, Vec<String>), DocumentError> {
	Ok(parser::flatten(&from_document(document)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::classifier::ClassifierError;
	use crate::parser::BinaryOp;
	use crate::tests;
	use futures::future::BoxFuture;
	use std::sync::atomic::AtomicUsize;
	use std::time::Duration;

	#[derive(Default)]
	struct SlowService {
		calls: AtomicUsize,
	}

	impl Lookup for SlowService {
		fn token_count<'a>(&'a self, phrase: &'a str) -> BoxFuture<'a, Result<usize, ClassifierError>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Box::pin(async move {
				tokio::time::sleep(Duration::from_millis(20)).await;
				match phrase {
					"ice cream" => Ok(1),
					"no route" => Err(ClassifierError("timed out".to_string())),
					_ => Ok(2),
				}
			})
		}
	}

	#[test]
	fn compiles_and_memoizes() -> Result<(), anyhow::Error> {
		tests::run_with_logger(|| {
			tests::run_async(async {
				let session = Session::new(SlowService::default());
				let expected = Expression::binary(
					BinaryOp::Or,
					Expression::term("ice cream"),
					Expression::text("hot dog"),
				);
				assert_eq!(session.compile("ice cream | hot dog").await?, expected);
				assert_eq!(session.compile("(ice cream) | (hot dog)").await?, expected);
				assert_eq!(session.lookup.calls.load(Ordering::SeqCst), 2);
				Ok(())
			})
		})
	}

	#[test]
	fn memo_is_bounded() -> Result<(), anyhow::Error> {
		tests::run_async(async {
			let session = Session::with_memo_capacity(SlowService::default(), 1);
			session.compile("ice cream & Fox").await?;
			session.compile("ice cream | Rabbit").await?;
			assert_eq!(session.lookup.calls.load(Ordering::SeqCst), 1);

			session.compile("hot dog & Fox").await?;
			assert_eq!(session.memo.lock().unwrap().len(), 0);
			session.compile("ice cream & Fox").await?;
			assert_eq!(session.lookup.calls.load(Ordering::SeqCst), 3);
			Ok(())
		})
	}

	#[test]
	fn stale_results_are_discarded() -> Result<(), anyhow::Error> {
		tests::run_async(async {
			let session = Session::new(SlowService::default());
			let (first, second) = tokio::join!(session.compile("ice cream & Fox"), session.compile("Fox & Rabbit"));
			assert!(matches!(first, Err(CompileError::Stale)));
			assert_eq!(
				second?,
				Expression::binary(BinaryOp::And, Expression::term("Fox"), Expression::term("Rabbit"))
			);
			Ok(())
		})
	}

	#[test]
	fn reports_errors() -> Result<(), anyhow::Error> {
		tests::run_async(async {
			let session = Session::new(SlowService::default());
			assert!(matches!(
				session.compile("Fox trot rabbit").await,
				Err(CompileError::Syntax(ParseError::MalformedSyntax { index: 0, .. }))
			));
			assert!(matches!(
				session.compile("no route & Fox").await,
				Err(CompileError::Syntax(ParseError::ClassifierUnavailable(_)))
			));
			assert!(matches!(
				session.compile_tokens(vec![Token::Word("Fox".to_string()), Token::Field]).await,
				Err(CompileError::Syntax(ParseError::UnexpectedFieldToken))
			));
			let tokens = parser::tokenize("[1,2] ! Fox");
			assert_eq!(
				session.compile_tokens(tokens).await?,
				Expression::binary(BinaryOp::Sub, Expression::fingerprint(vec![1, 2]), Expression::term("Fox"))
			);
			Ok(())
		})
	}

	#[test]
	fn reloads_a_received_document() -> Result<(), anyhow::Error> {
		tests::run_async(async {
			let session = Session::new(SlowService::default());
			let document = r#"{"sub":[{"text":"the quick fox"},{"and":[{"term":"ice cream"},{"term":"Fox"}]}]}"#;
			let (kinds, texts) = decompile(document)?;
			let tokens = parser::tokens_from(&kinds, &texts)?;
			assert_eq!(session.compile_tokens(tokens).await?, from_document(document)?);
			Ok(())
		})
	}

	#[test]
	fn decompiles() {
		let (kinds, texts) = decompile(r#"{"and":[{"term":"Fox"},{"or":[{"term":"a"},{"positions":[3]}]}]}"#).unwrap();
		assert_eq!(
			kinds,
			vec![
				TokenKind::Word,
				TokenKind::Operator,
				TokenKind::LParen,
				TokenKind::Word,
				TokenKind::Operator,
				TokenKind::Fingerprint,
				TokenKind::RParen,
			]
		);
		assert_eq!(texts, vec!["Fox", "&", "( ", "a", "|", "[3]", " )"]);
		assert!(decompile("{}").is_err());
	}
}

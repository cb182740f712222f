use super::data::*;

/// Splits user input into bubbles. Never fails: anything that is not one of
/// the six punctuation symbols accumulates into a word, spaces included.
pub struct Tokenizer<'a> {
	tail: &'a str,
	pending: Option<Token>,
}

impl<'a> From<&'a str> for Tokenizer<'a> {
	fn from(input: &'a str) -> Self {
		Self {
			tail: input,
			pending: None,
		}
	}
}

impl<'a> Iterator for Tokenizer<'a> {
	type Item = Token;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(token) = self.pending.take() {
			return Some(token);
		}
		while !self.tail.is_empty() {
			let word = self.advance_bytes(self.try_chars(|&c| Operator::from_symbol(c).is_none()));
			let operator = self.next_operator();
			match (flush(word), operator) {
				(Some(word), operator) => {
					self.pending = operator;
					return Some(word);
				}
				(None, Some(operator)) => return Some(operator),
				(None, None) => {}
			}
		}
		None
	}
}

impl<'a> Tokenizer<'a> {
	fn next_operator(&mut self) -> Option<Token> {
		let c = self.tail.chars().next()?;
		let op = Operator::from_symbol(c)?;
		self.advance_bytes(c.len_utf8());
		Some(Token::from(op))
	}

	fn try_chars(&self, f: impl FnMut(&char) -> bool) -> usize {
		self.tail.chars().take_while(f).map(char::len_utf8).sum()
	}

	fn advance_bytes(&mut self, count: usize) -> &'a str {
		let (word, tail) = self.tail.split_at(count);
		self.tail = tail;
		word
	}
}

fn flush(buffer: &str) -> Option<Token> {
	let word = buffer.trim();
	if word.is_empty() {
		return None;
	}
	Some(match parse_fingerprint(word) {
		Some(positions) => Token::Fingerprint(positions),
		None => Token::Word(word.to_string()),
	})
}

pub fn tokenize(input: &str) -> Vec<Token> {
	Tokenizer::from(input).collect()
}

#[cfg(test)]
mod tests;

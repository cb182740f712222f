//! Structural checks over expression text.
//!
//! Checks run in a fixed order and the first failure wins:
//! plain-text heuristic, size limits, parenthesis balance, adjacency exclusion,
//! full grammar. Every reported index counts characters, not bytes.

use super::data::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Most operands one expression may hold. A flat run folds into a tree as
/// deep as its operand count, and serializing or dropping a tree recurses
/// once per level.
pub const MAX_OPERANDS: usize = 256;

/// Deepest parenthesis nesting accepted; each level is a parser frame.
pub const MAX_NESTING: usize = 64;

const WORD: &str = r"[^\s()!\^&|]+";
const OPERATOR: &str = r"[!\^&|]";

static PLAIN_TEXT: Lazy<Regex> =
	Lazy::new(|| Regex::new(&format!(r"{w}\s+{w}\s+{w}", w = WORD)).unwrap());

static FINGERPRINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[0-9\s,]+\]").unwrap());

static CLOSE_THEN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"\)\s*{}", WORD)).unwrap());

static WORD_THEN_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"{}\s*\(", WORD)).unwrap());

static GRAMMAR: Lazy<Regex> = Lazy::new(|| {
	let item = format!(r"(?:\(\s*)*{w}(?:\s+{w})*(?:\s*\))*", w = WORD);
	Regex::new(&format!(
		r"^\s*(?:{item}(?:\s*{op}\s*{item})*\s*)?",
		item = item,
		op = OPERATOR
	))
	.unwrap()
});

pub fn validate(input: &str) -> Result<()> {
	check_empty(input)?;
	let masked = mask_fingerprints(input);
	check_plain_text(&masked, input)?;
	check_structure(&masked)
}

/// Validates a bubble sequence by rendering it as text. Word bubbles are
/// explicit phrases, so the plain-text heuristic does not apply. Two operands
/// may not sit next to each other: as text they would merge into one phrase,
/// as tokens they can never fold. Indices are token positions.
pub fn validate_tokens(tokens: &[Token]) -> Result<()> {
	let mut rendered = String::new();
	let mut starts = Vec::with_capacity(tokens.len());
	let mut width = 0;
	let mut last_operand = false;
	for (position, token) in tokens.iter().enumerate() {
		let text = match token {
			Token::Field => return Err(ParseError::UnexpectedFieldToken),
			Token::Word(text) => Cow::Borrowed(text.as_str()),
			Token::Fingerprint(positions) => Cow::Owned(fingerprint_display(positions)),
			Token::Operator(op) => Cow::Owned(op.symbol().to_string()),
			Token::LParen => Cow::Borrowed("("),
			Token::RParen => Cow::Borrowed(")"),
		};
		let operand = matches!(token, Token::Word(_) | Token::Fingerprint(_));
		if operand && last_operand {
			return Err(ParseError::MalformedSyntax {
				message: format!("Missing operator before \"{}\"", token.text()),
				index: position,
			});
		}
		last_operand = operand;

		if position > 0 {
			rendered.push(' ');
			width += 1;
		}
		starts.push(width);
		width += text.chars().count();
		rendered.push_str(&text);
	}
	check_empty(&rendered)?;
	check_structure(&rendered).map_err(|err| at_token(err, &starts))
}

/// Moves a character index in the rendered text onto the token that covers it.
fn at_token(err: ParseError, starts: &[usize]) -> ParseError {
	let token = |index: usize| starts.partition_point(|&start| start <= index).saturating_sub(1);
	match err {
		ParseError::MalformedSyntax { message, index } => ParseError::MalformedSyntax {
			message,
			index: token(index),
		},
		ParseError::UnbalancedParens { paren, index } => ParseError::UnbalancedParens {
			paren,
			index: token(index),
		},
		other => other,
	}
}

fn check_empty(input: &str) -> Result<()> {
	if input.trim().is_empty() {
		return Err(ParseError::MalformedSyntax {
			message: "Expression is empty".to_string(),
			index: 0,
		});
	}
	Ok(())
}

fn check_structure(input: &str) -> Result<()> {
	check_limits(input.chars().enumerate())?;
	check_balance(input.chars().enumerate())?;
	check_adjacency(input)?;
	check_grammar(input)
}

/// A fingerprint bubble typed with spaces, `[1, 5, 9]`, is one operand to the
/// tokenizer. Its whitespace is masked character for character so that the
/// word checks see one word and indices stay put.
fn mask_fingerprints(input: &str) -> Cow<'_, str> {
	let mut masked = String::new();
	let mut last = 0;
	for found in FINGERPRINT.find_iter(input) {
		if parse_fingerprint(found.as_str()).is_none() || !stands_alone(input, found.start(), found.end()) {
			continue;
		}
		masked.push_str(&input[last..found.start()]);
		masked.extend(found.as_str().chars().map(|c| if c.is_whitespace() { '_' } else { c }));
		last = found.end();
	}
	if last == 0 {
		return Cow::Borrowed(input);
	}
	masked.push_str(&input[last..]);
	Cow::Owned(masked)
}

/// True when nothing but whitespace separates the run from the neighbouring
/// operators or parentheses, i.e. the tokenizer would flush it as a word.
fn stands_alone(input: &str, start: usize, end: usize) -> bool {
	let before = input[..start].trim_end().chars().next_back();
	let after = input[end..].trim_start().chars().next();
	[before, after]
		.iter()
		.all(|c| c.map_or(true, |c| Operator::from_symbol(c).is_some()))
}

fn check_plain_text(masked: &str, input: &str) -> Result<()> {
	match PLAIN_TEXT.find(masked) {
		Some(found) => {
			let index = char_index(masked, found.start());
			let length = found.as_str().chars().count();
			let text: String = input.chars().skip(index).take(length).collect();
			Err(ParseError::MalformedSyntax {
				message: format!("\"{}\" appears to be text and not an expression", text),
				index,
			})
		}
		None => Ok(()),
	}
}

/// Caps operand count and parenthesis depth. The offending operator or
/// parenthesis is reported, the first character past the limit.
pub fn check_limits(chars: impl IntoIterator<Item = (usize, char)>) -> Result<()> {
	let mut operators = 0usize;
	let mut depth = 0usize;
	for (index, c) in chars {
		match Operator::from_symbol(c) {
			Some(Operator::LParen) => {
				depth += 1;
				if depth > MAX_NESTING {
					return Err(ParseError::MalformedSyntax {
						message: format!("Expression nests more than {} parentheses", MAX_NESTING),
						index,
					});
				}
			}
			Some(Operator::RParen) => depth = depth.saturating_sub(1),
			Some(_) => {
				operators += 1;
				if operators >= MAX_OPERANDS {
					return Err(ParseError::MalformedSyntax {
						message: format!("Expression has more than {} operands", MAX_OPERANDS),
						index,
					});
				}
			}
			None => {}
		}
	}
	Ok(())
}
/// Stack scan over `(index, char)` pairs. An unmatched `)` is reported where
/// the stack underflows, a leftover `(` at the earliest one never closed.
pub fn check_balance(chars: impl IntoIterator<Item = (usize, char)>) -> Result<()> {
	let mut open = Vec::new();
	for (index, c) in chars {
		match c {
			'(' => open.push(index),
			')' => {
				if open.pop().is_none() {
					return Err(ParseError::UnbalancedParens { paren: ')', index });
				}
			}
			_ => {}
		}
	}
	match open.first() {
		Some(&index) => Err(ParseError::UnbalancedParens { paren: '(', index }),
		None => Ok(()),
	}
}

fn check_adjacency(input: &str) -> Result<()> {
	let close = CLOSE_THEN_WORD.find(input).map(|m| (m.start(), ')'));
	let open = WORD_THEN_OPEN.find(input).map(|m| (m.end() - 1, '('));
	let first = match (close, open) {
		(Some(a), Some(b)) => Some(a.min(b)),
		(a, b) => a.or(b),
	};
	match first {
		Some((start, c)) => Err(ParseError::bad_character(c, char_index(input, start))),
		None => Ok(()),
	}
}

fn check_grammar(input: &str) -> Result<()> {
	let end = GRAMMAR.find(input).map_or(0, |m| m.end());
	match input[end..].chars().next() {
		Some(c) => Err(ParseError::bad_character(c, char_index(input, end))),
		None => Ok(()),
	}
}

fn char_index(input: &str, byte: usize) -> usize {
	input[..byte].chars().count()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn malformed(message: &str, index: usize) -> Result<()> {
		Err(ParseError::MalformedSyntax {
			message: message.to_string(),
			index,
		})
	}

	#[test]
	fn spec() {
		let cases = [
			("Fox", Ok(())),
			("Fox & Rabbit", Ok(())),
			("(ice cream) | Rabbit & (bug | plane)", Ok(())),
			("((a | b) & c) ! [1,2,3]", Ok(())),
			("  Fox ^ (Rabbit)  ", Ok(())),
			("[1, 5, 9] & Fox", Ok(())),
			("(Fox) ! [ 2 , 3 ]", Ok(())),
			("", malformed("Expression is empty", 0)),
			(
				"Fox trot rabbit",
				malformed("\"Fox trot rabbit\" appears to be text and not an expression", 0),
			),
			(
				"Fox & the quick brown fox",
				malformed("\"the quick brown\" appears to be text and not an expression", 6),
			),
			(
				"Fox & [1, 5, 9] bug",
				malformed("\"[1, 5, 9]\" appears to be text and not an expression", 6),
			),
			(
				"(ice cream) | Rabbit & (bug | plane))",
				Err(ParseError::UnbalancedParens {
					paren: ')',
					index: 36,
				}),
			),
			(
				"(Fox & (Rabbit | bug)",
				Err(ParseError::UnbalancedParens {
					paren: '(',
					index: 0,
				}),
			),
			(
				"Fox) & (Rabbit",
				Err(ParseError::UnbalancedParens {
					paren: ')',
					index: 3,
				}),
			),
			("(Fox) Rabbit", malformed("Bad character: \")\"", 4)),
			("Fox (Rabbit)", malformed("Bad character: \"(\"", 4)),
			("(ice cream) | Rabbit ^^ (bug | plane)", malformed("Bad character: \"^\"", 21)),
			("& Fox", malformed("Bad character: \"&\"", 0)),
			("Fox &", malformed("Bad character: \"&\"", 4)),
			("(Fox) (Rabbit)", malformed("Bad character: \"(\"", 6)),
			("() & Fox", malformed("Bad character: \"(\"", 0)),
			("ёж ^^ Fox", malformed("Bad character: \"^\"", 3)),
		];
		for (input, expected) in cases {
			assert_eq!(validate(input), expected, "input: {:?}", input);
		}
	}

	#[test]
	fn tokens() {
		let word = |s: &str| Token::Word(s.to_string());
		assert_eq!(
			validate_tokens(&[word("Fox"), Token::Operator(BinaryOp::And), Token::Fingerprint(vec![1, 2])]),
			Ok(())
		);
		assert_eq!(
			validate_tokens(&[word("the quick fox"), Token::Operator(BinaryOp::Or), word("Rabbit")]),
			Ok(())
		);
		assert_eq!(validate_tokens(&[]), malformed("Expression is empty", 0));
		assert_eq!(
			validate_tokens(&[word("Fox"), Token::Field]),
			Err(ParseError::UnexpectedFieldToken)
		);
		assert_eq!(
			validate_tokens(&[word("Fox"), word("Rabbit")]),
			malformed("Missing operator before \"Rabbit\"", 1)
		);
		assert_eq!(
			validate_tokens(&[Token::LParen, word("Fox"), Token::RParen, Token::RParen]),
			Err(ParseError::UnbalancedParens {
				paren: ')',
				index: 3,
			})
		);
		assert_eq!(
			validate_tokens(&[word("ice cream"), Token::Operator(BinaryOp::And), Token::RParen]),
			Err(ParseError::UnbalancedParens {
				paren: ')',
				index: 2,
			})
		);
		assert_eq!(
			validate_tokens(&[word("ice cream"), Token::Operator(BinaryOp::And)]),
			malformed("Bad character: \"&\"", 1)
		);
	}

	#[test]
	fn limits() {
		assert_eq!(validate(&vec!["Fox"; MAX_OPERANDS].join(" & ")), Ok(()));
		assert_eq!(
			validate(&vec!["Fox"; 20_000].join(" & ")),
			malformed("Expression has more than 256 operands", 1534)
		);

		let nested = |depth: usize| format!("{}Fox{}", "(".repeat(depth), ")".repeat(depth));
		assert_eq!(validate(&nested(MAX_NESTING)), Ok(()));
		assert_eq!(
			validate(&nested(200_000)),
			malformed("Expression nests more than 64 parentheses", 64)
		);

		let mut chain = vec![Token::Word("Fox".to_string())];
		for _ in 1..20_000 {
			chain.push(Token::Operator(BinaryOp::Or));
			chain.push(Token::Word("Fox".to_string()));
		}
		assert_eq!(
			validate_tokens(&chain),
			malformed("Expression has more than 256 operands", 511)
		);
	}
}

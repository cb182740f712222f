use super::data::*;

/// Inverse of parsing: parallel `(kind, text)` bubble sequences.
///
/// Only a compound right operand is wrapped in parentheses. The fold is
/// left-associative, so a compound left operand already groups correctly.
pub fn flatten(node: &Expression) -> (Vec<TokenKind>, Vec<String>) {
	flatten_tokens(node)
		.iter()
		.map(|token| (token.kind(), token.text()))
		.unzip()
}

pub fn flatten_tokens(node: &Expression) -> Vec<Token> {
	let mut tokens = Vec::new();
	flatten_into(node, Side::Left, &mut tokens);
	tokens
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
	Left,
	Right,
}

fn flatten_into(node: &Expression, side: Side, out: &mut Vec<Token>) {
	match node {
		Expression::Binary { op, left, right } => {
			if side == Side::Right {
				out.push(Token::LParen);
			}
			flatten_into(left, Side::Left, out);
			out.push(Token::Operator(*op));
			flatten_into(right, Side::Right, out);
			if side == Side::Right {
				out.push(Token::RParen);
			}
		}
		Expression::Leaf(Leaf::Term(value)) | Expression::Leaf(Leaf::Text(value)) => {
			out.push(Token::Word(value.clone()))
		}
		Expression::Leaf(Leaf::Fingerprint(positions)) => out.push(Token::Fingerprint(positions.clone())),
	}
}

/// Rebuilds bubbles from the parallel sequences produced by [`flatten`].
pub fn tokens_from(kinds: &[TokenKind], texts: &[String]) -> Result<Vec<Token>> {
	if kinds.len() != texts.len() {
		return Err(ParseError::Incomplete);
	}
	kinds
		.iter()
		.zip(texts)
		.enumerate()
		.map(|(index, (kind, text))| {
			let bad = || ParseError::bad_character(text.trim().chars().next().unwrap_or(' '), index);
			match kind {
				TokenKind::Word => Ok(Token::Word(text.clone())),
				TokenKind::Operator => text
					.parse::<Operator>()
					.map(Token::from)
					.map_err(|_| bad()),
				TokenKind::LParen => Ok(Token::LParen),
				TokenKind::RParen => Ok(Token::RParen),
				TokenKind::Fingerprint => parse_fingerprint(text).map(Token::Fingerprint).ok_or_else(bad),
				TokenKind::Field => Err(ParseError::UnexpectedFieldToken),
			}
		})
		.collect()
}

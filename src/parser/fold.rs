use super::data::*;
use super::leaf::resolve_leaf;
use super::validator::{check_balance, check_limits};
use crate::classifier::Classifier;

enum Entry {
	Node(Expression),
	Operator(BinaryOp),
}

/// Folds bubbles into an expression strictly in encounter order; only
/// parentheses change grouping. Size limits and parenthesis balance are
/// checked up front, with token positions as indices.
pub fn parse(tokens: &[Token], classifier: &impl Classifier) -> Result<Expression> {
	if tokens.is_empty() {
		return Err(ParseError::Empty);
	}
	check_limits(symbols(tokens))?;
	check_balance(symbols(tokens))?;
	parse_scope(&mut tokens.iter(), classifier)
}

fn symbols(tokens: &[Token]) -> impl Iterator<Item = (usize, char)> + '_ {
	tokens.iter().enumerate().filter_map(|(i, token)| match token {
		Token::LParen => Some((i, '(')),
		Token::RParen => Some((i, ')')),
		Token::Operator(op) => Some((i, op.symbol())),
		_ => None,
	})
}

fn parse_scope<'a, I>(tokens: &mut I, classifier: &impl Classifier) -> Result<Expression>
where
	I: Iterator<Item = &'a Token>,
{
	let mut stack = Vec::new();
	while let Some(token) = tokens.next() {
		match token {
			Token::Word(text) => push_operand(&mut stack, resolve_leaf(text, classifier)?.into())?,
			Token::Fingerprint(positions) => {
				push_operand(&mut stack, Expression::fingerprint(positions.clone()))?
			}
			Token::Operator(op) => stack.push(Entry::Operator(*op)),
			Token::LParen => {
				let inner = parse_scope(tokens, classifier)?;
				push_operand(&mut stack, inner)?;
			}
			Token::RParen => return finish(stack),
			Token::Field => return Err(ParseError::UnexpectedFieldToken),
		}
	}
	finish(stack)
}

fn push_operand(stack: &mut Vec<Entry>, operand: Expression) -> Result<()> {
	if stack.len() < 2 {
		stack.push(Entry::Node(operand));
		return Ok(());
	}
	match (stack.pop(), stack.pop()) {
		(Some(Entry::Operator(op)), Some(Entry::Node(left))) => {
			stack.push(Entry::Node(Expression::binary(op, left, operand)));
			Ok(())
		}
		_ => {
			log::error!("operand without a pending operator; validator let malformed input through");
			Err(ParseError::Incomplete)
		}
	}
}

fn finish(mut stack: Vec<Entry>) -> Result<Expression> {
	match (stack.pop(), stack.is_empty()) {
		(Some(Entry::Node(node)), true) => Ok(node),
		_ => Err(ParseError::Incomplete),
	}
}

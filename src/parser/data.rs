use std::fmt;
use std::str::FromStr;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	#[error("{message}")]
	MalformedSyntax { message: String, index: usize },
	#[error("Unbalanced parenthesis: \"{paren}\"")]
	UnbalancedParens { paren: char, index: usize },
	#[error("edit-cursor placeholder reached the compiler")]
	UnexpectedFieldToken,
	#[error("compound-term classifier unavailable: {0}")]
	ClassifierUnavailable(String),
	#[error("nothing to parse")]
	Empty,
	#[error("token sequence does not fold into a single expression")]
	Incomplete,
}

impl ParseError {
	pub fn bad_character(found: char, index: usize) -> Self {
		ParseError::MalformedSyntax {
			message: format!("Bad character: \"{}\"", found),
			index,
		}
	}

	/// Position to highlight, if the error is tied to one.
	pub fn index(&self) -> Option<usize> {
		match self {
			ParseError::MalformedSyntax { index, .. } | ParseError::UnbalancedParens { index, .. } => {
				Some(*index)
			}
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator: {0:?}")]
pub struct UnknownOperator(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
	Word,
	Operator,
	LParen,
	RParen,
	Fingerprint,
	Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	Word(String),
	Operator(BinaryOp),
	LParen,
	RParen,
	Fingerprint(Vec<u32>),
	/// Live edit-cursor placeholder; callers strip it before compiling.
	Field,
}

impl Token {
	pub fn kind(&self) -> TokenKind {
		match self {
			Token::Word(_) => TokenKind::Word,
			Token::Operator(_) => TokenKind::Operator,
			Token::LParen => TokenKind::LParen,
			Token::RParen => TokenKind::RParen,
			Token::Fingerprint(_) => TokenKind::Fingerprint,
			Token::Field => TokenKind::Field,
		}
	}

	/// Text shown on the bubble for this token.
	pub fn text(&self) -> String {
		match self {
			Token::Word(text) => text.clone(),
			Token::Operator(op) => op.symbol().to_string(),
			Token::LParen => Operator::LParen.display().to_string(),
			Token::RParen => Operator::RParen.display().to_string(),
			Token::Fingerprint(positions) => fingerprint_display(positions),
			Token::Field => String::new(),
		}
	}
}

impl From<Operator> for Token {
	fn from(op: Operator) -> Self {
		match op {
			Operator::LParen => Token::LParen,
			Operator::RParen => Token::RParen,
			Operator::And => Token::Operator(BinaryOp::And),
			Operator::Or => Token::Operator(BinaryOp::Or),
			Operator::Xor => Token::Operator(BinaryOp::Xor),
			Operator::Sub => Token::Operator(BinaryOp::Sub),
		}
	}
}

pub fn fingerprint_display(positions: &[u32]) -> String {
	let body: Vec<String> = positions.iter().map(u32::to_string).collect();
	format!("[{}]", body.join(","))
}

/// Parses the `[1,2,3]` display form back into positions.
pub fn parse_fingerprint(text: &str) -> Option<Vec<u32>> {
	let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
	if inner.trim().is_empty() {
		return None;
	}
	inner.split(',').map(|p| p.trim().parse().ok()).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
	And,
	Or,
	Xor,
	Sub,
	LParen,
	RParen,
}

const OPERATORS: [(Operator, char, &str); 6] = [
	(Operator::And, '&', "AND"),
	(Operator::Or, '|', "OR"),
	(Operator::Xor, '^', "XOR"),
	(Operator::Sub, '!', "SUB"),
	(Operator::LParen, '(', "L_PRN"),
	(Operator::RParen, ')', "R_PRN"),
];

impl Operator {
	pub fn from_symbol(c: char) -> Option<Operator> {
		OPERATORS
			.iter()
			.find(|(_, symbol, _)| *symbol == c)
			.map(|(op, _, _)| *op)
	}

	pub fn symbol(self) -> char {
		match self {
			Operator::And => '&',
			Operator::Or => '|',
			Operator::Xor => '^',
			Operator::Sub => '!',
			Operator::LParen => '(',
			Operator::RParen => ')',
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Operator::And => "AND",
			Operator::Or => "OR",
			Operator::Xor => "XOR",
			Operator::Sub => "SUB",
			Operator::LParen => "L_PRN",
			Operator::RParen => "R_PRN",
		}
	}

	/// Bubble text; parentheses carry padding that the grammar ignores.
	pub fn display(self) -> &'static str {
		match self {
			Operator::And => "&",
			Operator::Or => "|",
			Operator::Xor => "^",
			Operator::Sub => "!",
			Operator::LParen => "( ",
			Operator::RParen => " )",
		}
	}
}

impl FromStr for Operator {
	type Err = UnknownOperator;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let s = s.trim();
		let mut chars = s.chars();
		if let (Some(c), None) = (chars.next(), chars.next()) {
			if let Some(op) = Operator::from_symbol(c) {
				return Ok(op);
			}
		}
		OPERATORS
			.iter()
			.find(|(_, _, name)| name.eq_ignore_ascii_case(s))
			.map(|(op, _, _)| *op)
			.ok_or_else(|| UnknownOperator(s.to_string()))
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
	And,
	Or,
	Xor,
	Sub,
}

impl BinaryOp {
	pub const ALL: [BinaryOp; 4] = [BinaryOp::And, BinaryOp::Or, BinaryOp::Xor, BinaryOp::Sub];

	pub fn symbol(self) -> char {
		Operator::from(self).symbol()
	}

	/// Key used for this operator in the service document.
	pub fn key(self) -> &'static str {
		match self {
			BinaryOp::And => "and",
			BinaryOp::Or => "or",
			BinaryOp::Xor => "xor",
			BinaryOp::Sub => "sub",
		}
	}
}

impl From<BinaryOp> for Operator {
	fn from(op: BinaryOp) -> Self {
		match op {
			BinaryOp::And => Operator::And,
			BinaryOp::Or => Operator::Or,
			BinaryOp::Xor => Operator::Xor,
			BinaryOp::Sub => Operator::Sub,
		}
	}
}

impl TryFrom<Operator> for BinaryOp {
	type Error = UnknownOperator;

	fn try_from(op: Operator) -> std::result::Result<Self, Self::Error> {
		match op {
			Operator::And => Ok(BinaryOp::And),
			Operator::Or => Ok(BinaryOp::Or),
			Operator::Xor => Ok(BinaryOp::Xor),
			Operator::Sub => Ok(BinaryOp::Sub),
			Operator::LParen | Operator::RParen => Err(UnknownOperator(op.name().to_string())),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
	Term(String),
	Text(String),
	Fingerprint(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
	Leaf(Leaf),
	Binary {
		op: BinaryOp,
		left: Box<Expression>,
		right: Box<Expression>,
	},
}

impl Expression {
	pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
		Expression::Binary {
			op,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn term(value: impl Into<String>) -> Self {
		Expression::Leaf(Leaf::Term(value.into()))
	}

	pub fn text(value: impl Into<String>) -> Self {
		Expression::Leaf(Leaf::Text(value.into()))
	}

	pub fn fingerprint(positions: Vec<u32>) -> Self {
		Expression::Leaf(Leaf::Fingerprint(positions))
	}
}

impl From<Leaf> for Expression {
	fn from(leaf: Leaf) -> Self {
		Expression::Leaf(leaf)
	}
}

mod data;
mod flatten;
mod fold;
mod leaf;
mod lexer;
mod validator;

pub use data::{
	fingerprint_display, parse_fingerprint, BinaryOp, Expression, Leaf, Operator, ParseError, Result, Token,
	TokenKind, UnknownOperator,
};
pub use flatten::{flatten, flatten_tokens, tokens_from};
pub use fold::parse;
pub use leaf::{ambiguous_phrases, resolve_leaf};
pub use lexer::{tokenize, Tokenizer};
pub use validator::{check_balance, check_limits, validate, validate_tokens, MAX_NESTING, MAX_OPERANDS};

use crate::classifier::Classifier;

/// Validates, tokenizes and parses typed input in one go.
pub fn compile(query: &str, classifier: &impl Classifier) -> Result<Expression> {
	validate(query)?;
	parse(&tokenize(query), classifier)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::classifier::ClassifierError;
	use crate::document;

	fn compounds(phrase: &str) -> std::result::Result<usize, ClassifierError> {
		Ok(if phrase == "ice cream" { 1 } else { 2 })
	}

	fn to_json(query: &str) -> String {
		document::to_string(&compile(query, &compounds).unwrap()).unwrap()
	}

	#[test]
	fn documents() {
		assert_eq!(to_json("Fox"), r#"{"term":"Fox"}"#);
		assert_eq!(to_json("Fox & Rabbit"), r#"{"and":[{"term":"Fox"},{"term":"Rabbit"}]}"#);
		assert_eq!(
			to_json("(Fox & Rabbit) & bug & beatle"),
			r#"{"and":[{"and":[{"and":[{"term":"Fox"},{"term":"Rabbit"}]},{"term":"bug"}]},{"term":"beatle"}]}"#
		);
		assert_eq!(to_json("[1, 5, 9] & Fox"), r#"{"and":[{"positions":[1,5,9]},{"term":"Fox"}]}"#);
	}

	#[test]
	fn rejections() {
		assert_eq!(
			compile("(ice cream) | Rabbit & (bug | plane))", &compounds),
			Err(ParseError::UnbalancedParens {
				paren: ')',
				index: 36
			})
		);
		let err = compile("Fox trot rabbit", &compounds).unwrap_err();
		assert!(err.to_string().ends_with("appears to be text and not an expression"));
		assert_eq!(
			compile("(ice cream) | Rabbit ^^ (bug | plane)", &compounds),
			Err(ParseError::bad_character('^', 21))
		);
		assert_eq!(
			compile(&vec!["Fox"; 20_000].join(" & "), &compounds),
			Err(ParseError::MalformedSyntax {
				message: "Expression has more than 256 operands".to_string(),
				index: 1534,
			})
		);
	}
}

//! The keyed document exchanged with the semantic service.
//!
//! ```text
//! {"term": "Fox"}   {"text": "the quick fox"}   {"positions": [1, 5]}
//! {"and": [{"term": "Fox"}, {"term": "Rabbit"}]}
//! ```
//!
//! Reading a document mirrors the token parser: the kind of a node is decided
//! by the earliest recognized key in its serialized text, and binary nodes
//! recurse into the original text of their two operands.

use crate::parser::{BinaryOp, Expression, Leaf, MAX_OPERANDS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
	#[error("malformed document: {0}")]
	Json(#[from] serde_json::Error),
	#[error("document has no recognized key")]
	UnknownKind,
	#[error("key {0:?} is not a member of the outer object")]
	MissingKey(String),
	#[error("{key:?} expects two operands, found {found}")]
	Arity { key: String, found: usize },
	#[error("document nests deeper than {0} levels")]
	TooDeep(usize),
}

static KEY: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#""(term|text|and|or|xor|sub|positions|fingerprint)"\s*:"#).unwrap());

impl Serialize for Expression {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(1))?;
		match self {
			Expression::Leaf(Leaf::Term(value)) => map.serialize_entry("term", value)?,
			Expression::Leaf(Leaf::Text(value)) => map.serialize_entry("text", value)?,
			Expression::Leaf(Leaf::Fingerprint(positions)) => map.serialize_entry("positions", positions)?,
			Expression::Binary { op, left, right } => map.serialize_entry(op.key(), &[left, right])?,
		}
		map.end()
	}
}

pub fn to_document(expression: &Expression) -> Result<serde_json::Value, DocumentError> {
	Ok(serde_json::to_value(expression)?)
}

pub fn to_string(expression: &Expression) -> Result<String, DocumentError> {
	Ok(serde_json::to_string(expression)?)
}

#[derive(Deserialize)]
struct Fingerprint {
	positions: Vec<u32>,
}

pub fn from_document(text: &str) -> Result<Expression, DocumentError> {
	read_node(text, 0)
}

fn read_node(text: &str, depth: usize) -> Result<Expression, DocumentError> {
	if depth >= MAX_OPERANDS {
		return Err(DocumentError::TooDeep(MAX_OPERANDS));
	}
	let key = KEY
		.captures(text)
		.and_then(|captures| captures.get(1))
		.map(|m| m.as_str())
		.ok_or(DocumentError::UnknownKind)?;
	let object: HashMap<String, &RawValue> = serde_json::from_str(text)?;
	let value = object
		.get(key)
		.ok_or_else(|| DocumentError::MissingKey(key.to_string()))?
		.get();

	let expression = match key {
		"term" => Expression::term(serde_json::from_str::<String>(value)?),
		"text" => Expression::text(serde_json::from_str::<String>(value)?),
		"positions" => Expression::fingerprint(serde_json::from_str(value)?),
		"fingerprint" => Expression::fingerprint(serde_json::from_str::<Fingerprint>(value)?.positions),
		_ => {
			let op = BinaryOp::ALL
				.into_iter()
				.find(|op| op.key() == key)
				.ok_or(DocumentError::UnknownKind)?;
			let operands: Vec<&RawValue> = serde_json::from_str(value)?;
			match operands.as_slice() {
				[left, right] => Expression::binary(
					op,
					read_node(left.get(), depth + 1)?,
					read_node(right.get(), depth + 1)?,
				),
				_ => {
					return Err(DocumentError::Arity {
						key: key.to_string(),
						found: operands.len(),
					})
				}
			}
		}
	};
	Ok(expression)
}

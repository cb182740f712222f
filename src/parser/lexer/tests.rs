use super::*;

#[test]
fn spec() {
	let cases = [
		empty(),
		blank(),
		single_word(),
		phrase_stays_one_token(),
		operators_split_words(),
		nested_parens(),
		doubled_operator(),
		fingerprint_word(),
		not_quite_fingerprint(),
		cyrillic(),
	];
	for (query, expected) in cases {
		assert_eq!(tokenize(query), expected, "query: {:?}", query);
	}
}

type Test = (&'static str, Vec<Token>);

fn word(text: &str) -> Token {
	Token::Word(text.to_string())
}

fn empty() -> Test {
	("", vec![])
}

fn blank() -> Test {
	("   \t ", vec![])
}

fn single_word() -> Test {
	("Fox", vec![word("Fox")])
}

fn phrase_stays_one_token() -> Test {
	("  ice cream  ", vec![word("ice cream")])
}

fn operators_split_words() -> Test {
	(
		"Fox&Rabbit | bug ! plane ^ car",
		vec![
			word("Fox"),
			Token::Operator(BinaryOp::And),
			word("Rabbit"),
			Token::Operator(BinaryOp::Or),
			word("bug"),
			Token::Operator(BinaryOp::Sub),
			word("plane"),
			Token::Operator(BinaryOp::Xor),
			word("car"),
		],
	)
}

fn nested_parens() -> Test {
	(
		"((ice cream) | Rabbit) & bug",
		vec![
			Token::LParen,
			Token::LParen,
			word("ice cream"),
			Token::RParen,
			Token::Operator(BinaryOp::Or),
			word("Rabbit"),
			Token::RParen,
			Token::Operator(BinaryOp::And),
			word("bug"),
		],
	)
}

fn doubled_operator() -> Test {
	(
		"Rabbit ^^ (bug",
		vec![
			word("Rabbit"),
			Token::Operator(BinaryOp::Xor),
			Token::Operator(BinaryOp::Xor),
			Token::LParen,
			word("bug"),
		],
	)
}

fn fingerprint_word() -> Test {
	(
		"[1, 5,9] & Fox",
		vec![
			Token::Fingerprint(vec![1, 5, 9]),
			Token::Operator(BinaryOp::And),
			word("Fox"),
		],
	)
}

fn not_quite_fingerprint() -> Test {
	("[1,two]", vec![word("[1,two]")])
}

fn cyrillic() -> Test {
	(
		"Опа кириллица|ёж",
		vec![
			word("Опа кириллица"),
			Token::Operator(BinaryOp::Or),
			word("ёж"),
		],
	)
}

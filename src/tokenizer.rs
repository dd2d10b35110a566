use crate::config::{MAX_TOKENS, MAX_TOKEN_LEN};
use crate::error::TokenizeError;

struct Tokenizer<'a> {
	line: &'a str,
	i: usize,
}

impl<'a> Tokenizer<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.as_bytes().get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Tokenizer::is_whitespace);
	}

	fn read_word(&mut self) -> &'a str {
		let orig = self.i;
		self.proceed_while(|c| !Tokenizer::is_whitespace(c));
		&self.line[orig .. self.i]
	}
}

/// Splits `line` on runs of blanks. Operators get no special treatment, so
/// `ls>out` is a single word. `Ok(None)` means the line held nothing but blanks.
pub fn tokenize(line: &str) -> Result<Option<Vec<String>>, TokenizeError> {
	let mut tokenizer = Tokenizer { line: line, i: 0 };
	let mut tokens = vec![];
	loop {
		tokenizer.skip_whitespaces();
		let word = tokenizer.read_word();
		if word.is_empty() {
			break;
		}
		if word.len() > MAX_TOKEN_LEN {
			return Err(TokenizeError::TokenTooLong);
		}
		if tokens.len() == MAX_TOKENS {
			return Err(TokenizeError::TooManyArguments);
		}
		tokens.push(word.to_string());
	}
	if tokens.is_empty() {
		Ok(None)
	} else {
		Ok(Some(tokens))
	}
}

use crate::error::ParseError;
use crate::types::*;

type ParseResult<T> = Result<T, ParseError>;

struct Parser<'a> {
	tokens: &'a [String],
	i: usize,
}

impl<'a> Parser<'a> {
	fn next(&mut self) -> Option<&'a str> {
		let token = self.tokens.get(self.i).map(|s| s.as_str());
		if token.is_some() {
			self.i += 1;
		}
		token
	}

	fn at_end(&self) -> bool {
		self.i >= self.tokens.len()
	}

	fn parse_target(&mut self, op: &'static str, slot: &mut Option<String>) -> ParseResult<()> {
		let target = match self.next() {
			Some(t) => t,
			None => { return Err(ParseError::MissingTarget(op)); },
		};
		if slot.is_some() {
			return Err(ParseError::DuplicateRedirect(op));
		}
		*slot = Some(target.to_string());
		Ok(())
	}

	fn close_stage(stages: &mut Vec<Stage>, argv: Vec<String>) -> ParseResult<()> {
		if argv.is_empty() {
			return Err(ParseError::EmptyStage);
		}
		stages.push(Stage { argv: argv });
		Ok(())
	}

	fn parse_pipeline(&mut self) -> ParseResult<Pipeline> {
		let mut stages: Vec<Stage> = vec![];
		let mut argv: Vec<String> = vec![];
		let mut input = None;
		let mut output = None;
		let mut is_background = false;

		while let Some(token) = self.next() {
			match token {
				"&" => {
					if !self.at_end() {
						return Err(ParseError::MisplacedBackground);
					}
					is_background = true;
				},
				"<" => self.parse_target("<", &mut input)?,
				">" => self.parse_target(">", &mut output)?,
				op if op.len() > 1 && op.bytes().all(|c| c == b'&') => {
					return Err(ParseError::MalformedOperator(op.to_string()));
				},
				"|" => {
					let argv = std::mem::take(&mut argv);
					Parser::close_stage(&mut stages, argv)?;
				},
				word => argv.push(word.to_string()),
			}
		}
		Parser::close_stage(&mut stages, argv)?;

		Ok(Pipeline { stages: stages, input: input, output: output, is_background: is_background })
	}
}

/// Splits tokens into stages on `|`, pulling `<`, `>` and a trailing `&` out
/// of the argument lists.
pub fn parse(tokens: &[String]) -> ParseResult<Pipeline> {
	let mut parser = Parser { tokens: tokens, i: 0 };
	parser.parse_pipeline()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tokenizer::tokenize;

	fn parse_line(line: &str) -> ParseResult<Pipeline> {
		parse(&tokenize(line).unwrap().unwrap())
	}

	fn argvs(p: &Pipeline) -> Vec<Vec<&str>> {
		p.stages.iter().map(|s| s.argv.iter().map(|a| a.as_str()).collect()).collect()
	}

	#[test]
	fn three_stage_pipeline() {
		let p = parse_line("a | b | c").unwrap();
		assert_eq!(argvs(&p), vec![vec!["a"], vec!["b"], vec!["c"]]);
		assert_eq!(p.input, None);
		assert_eq!(p.output, None);
		assert!(!p.is_background);
	}

	#[test]
	fn redirections_are_stripped() {
		let p = parse_line("sort < in.txt > out.txt").unwrap();
		assert_eq!(argvs(&p), vec![vec!["sort"]]);
		assert_eq!(p.input.as_deref(), Some("in.txt"));
		assert_eq!(p.output.as_deref(), Some("out.txt"));
	}

	#[test]
	fn redirections_bind_by_position() {
		// `>` written in the first stage still belongs to the last one.
		let p = parse_line("cat > out.txt | tr a-z A-Z | sort < in.txt").unwrap();
		assert_eq!(argvs(&p), vec![vec!["cat"], vec!["tr", "a-z", "A-Z"], vec!["sort"]]);
		assert_eq!(p.input.as_deref(), Some("in.txt"));
		assert_eq!(p.output.as_deref(), Some("out.txt"));
	}

	#[test]
	fn trailing_ampersand() {
		let p = parse_line("sleep 5 &").unwrap();
		assert_eq!(argvs(&p), vec![vec!["sleep", "5"]]);
		assert!(p.is_background);
	}

	#[test]
	fn ampersand_must_be_last() {
		assert_eq!(parse_line("a & b"), Err(ParseError::MisplacedBackground));
		assert_eq!(parse_line("false & & echo ok"), Err(ParseError::MisplacedBackground));
		assert_eq!(parse_line("a & &"), Err(ParseError::MisplacedBackground));
	}

	#[test]
	fn double_ampersand_is_rejected() {
		assert_eq!(parse_line("false && echo ok"), Err(ParseError::MalformedOperator("&&".to_string())));
		assert_eq!(parse_line("sleep 1 &&"), Err(ParseError::MalformedOperator("&&".to_string())));
		assert_eq!(parse_line("a &&& b"), Err(ParseError::MalformedOperator("&&&".to_string())));
		// Only whole-token runs of `&` are operators.
		assert!(parse_line("echo a&b").is_ok());
	}

	#[test]
	fn empty_stages() {
		assert_eq!(parse_line("| a"), Err(ParseError::EmptyStage));
		assert_eq!(parse_line("a |"), Err(ParseError::EmptyStage));
		assert_eq!(parse_line("a | | b"), Err(ParseError::EmptyStage));
		assert_eq!(parse_line("&"), Err(ParseError::EmptyStage));
		assert_eq!(parse_line("< in.txt"), Err(ParseError::EmptyStage));
	}

	#[test]
	fn missing_or_duplicate_targets() {
		assert_eq!(parse_line("cat <"), Err(ParseError::MissingTarget("<")));
		assert_eq!(parse_line("cat >"), Err(ParseError::MissingTarget(">")));
		assert_eq!(parse_line("cat > a > b"), Err(ParseError::DuplicateRedirect(">")));
		assert_eq!(parse_line("cat < a | cat < b"), Err(ParseError::DuplicateRedirect("<")));
	}
}

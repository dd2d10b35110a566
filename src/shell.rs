use std::io::Write;

use log::debug;

use crate::config::MAX_LINE_LEN;
use crate::error::{ShellError, ShellResult};
use crate::eval::{self, Outcome};
use crate::global;
use crate::parser;
use crate::tokenizer;

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
	/// Keep reading; carries the status of the line.
	Status(i32),
	Exit,
}

/// Turns the raw bytes of one input line into text. Bytes that are not UTF-8
/// are refused rather than rewritten, so arguments reach programs unchanged.
pub fn decode_line(mut bytes: Vec<u8>) -> ShellResult<String> {
	while bytes.last() == Some(&b'\n') || bytes.last() == Some(&b'\r') {
		bytes.pop();
	}
	String::from_utf8(bytes).map_err(|_| ShellError::InvalidUtf8)
}

/// Runs one input line: history reference, alias expansion, parsing,
/// `$NAME` substitution, then the pipeline or built-in itself.
pub fn run_line(state: &mut global::State, line: &str, out: &mut dyn Write) -> ShellResult<Flow> {
	if line.len() > MAX_LINE_LEN {
		return Err(ShellError::LineTooLong);
	}
	let line = match state.history.resolve(line)? {
		Some(replay) => {
			debug!("replaying `{}`", replay);
			replay.to_string()
		},
		None => {
			if !line.trim().is_empty() {
				state.history.record(line);
			}
			line.to_string()
		},
	};

	let tokens = match tokenizer::tokenize(&line)? {
		Some(tokens) => tokens,
		None => { return Ok(Flow::Status(0)); },
	};
	let tokens = state.aliases.expand(tokens)?;
	if tokens.is_empty() {
		return Ok(Flow::Status(0));
	}

	let mut pipeline = parser::parse(&tokens)?;
	state.vars.substitute_pipeline(&mut pipeline)?;
	match eval::eval(state, &pipeline, line.trim(), out)? {
		Outcome::Done(status) => Ok(Flow::Status(status)),
		Outcome::Background { .. } => Ok(Flow::Status(0)),
		Outcome::Exit => Ok(Flow::Exit),
	}
}

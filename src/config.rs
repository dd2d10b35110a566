use clap::Parser;

/// Longest accepted input line, newline excluded.
pub const MAX_LINE_LEN: usize = 512;
pub const MAX_TOKENS: usize = 64;
pub const MAX_TOKEN_LEN: usize = 128;

pub const ALIAS_CAPACITY: usize = 10;
pub const VAR_CAPACITY: usize = 100;
pub const JOB_CAPACITY: usize = 32;

/// A small pipeline shell.
#[derive(Parser, Debug, Clone)]
#[command(name = "psh", version, about)]
pub struct Config {
	/// Prompt printed before each line is read.
	#[arg(long, env = "PSH_PROMPT", default_value = "psh> ")]
	pub prompt: String,

	/// Number of command lines kept for `!N` and `!-1`.
	#[arg(long, env = "PSH_HISTSIZE", default_value_t = 10,
	      value_parser = clap::value_parser!(u16).range(1..))]
	pub history_size: u16,

	/// Report the exit status of every foreground stage.
	#[arg(short, long)]
	pub verbose: bool,

	/// Run a single command line and exit.
	#[arg(short = 'c', value_name = "COMMAND")]
	pub command: Option<String>,
}

impl Default for Config {
	fn default() -> Config {
		Config {
			prompt: "psh> ".to_string(),
			history_size: 10,
			verbose: false,
			command: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_flags() {
		let config = Config::try_parse_from(["psh", "--prompt", "$ ", "--history-size", "3", "-v"]).unwrap();
		assert_eq!(config.prompt, "$ ");
		assert_eq!(config.history_size, 3);
		assert!(config.verbose);
		assert!(config.command.is_none());
	}

	#[test]
	fn rejects_zero_history() {
		assert!(Config::try_parse_from(["psh", "--history-size", "0"]).is_err());
	}

	#[test]
	fn one_shot_command() {
		let config = Config::try_parse_from(["psh", "-c", "echo hi"]).unwrap();
		assert_eq!(config.command.as_deref(), Some("echo hi"));
	}
}

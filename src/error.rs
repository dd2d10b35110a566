use std::{ffi, io};

use thiserror::Error;

use crate::config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
	#[error("token too long (limit is {} bytes)", config::MAX_TOKEN_LEN)]
	TokenTooLong,
	#[error("too many arguments (limit is {})", config::MAX_TOKENS)]
	TooManyArguments,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
	#[error("expected filename after `{0}`")]
	MissingTarget(&'static str),
	#[error("duplicate `{0}` redirection")]
	DuplicateRedirect(&'static str),
	#[error("background operator must terminate the command")]
	MisplacedBackground,
	#[error("unsupported operator `{0}`")]
	MalformedOperator(String),
	#[error("empty command in pipeline")]
	EmptyStage,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
	#[error("{0} limit reached")]
	Full(&'static str),
	#[error("{0} `{1}` not found")]
	NotFound(&'static str, String),
	#[error("invalid {0} format: expected name=value")]
	Malformed(&'static str),
	#[error("alias `{0}` refers to itself")]
	SelfReferential(String),
	#[error("usage: {0}")]
	Usage(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
	#[error("no commands in history")]
	Empty,
	#[error("no such command in history")]
	OutOfRange,
}

#[derive(Debug, Error)]
pub enum ExecError {
	#[error("{0}")]
	Nix(#[from] nix::Error),
	#[error("{0}")]
	Io(#[from] io::Error),
	#[error("argument contains a nul byte: {0}")]
	Nul(#[from] ffi::NulError),
	#[error("{path}: {source}")]
	Open { path: String, source: nix::Error },
	#[error("pipe failed: {0}")]
	Pipe(nix::Error),
	#[error("fork failed: {0}")]
	Fork(nix::Error),
	#[error("cd: {path}: {source}")]
	Chdir { path: String, source: nix::Error },
	#[error("kill: {pid}: {source}")]
	Signal { pid: nix::unistd::Pid, source: nix::Error },
	#[error("{0}: cannot be used inside a pipeline")]
	BuiltinInPipeline(String),
}

#[derive(Debug, Error)]
pub enum ShellError {
	#[error(transparent)]
	Tokenize(#[from] TokenizeError),
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error(transparent)]
	Table(#[from] TableError),
	#[error(transparent)]
	History(#[from] HistoryError),
	#[error(transparent)]
	Exec(#[from] ExecError),
	#[error("line too long (limit is {} bytes)", config::MAX_LINE_LEN)]
	LineTooLong,
	#[error("input is not valid UTF-8")]
	InvalidUtf8,
}

pub type ShellResult<T> = Result<T, ShellError>;

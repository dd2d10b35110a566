//! `psh`, a line-oriented shell: tokenizes a line, expands aliases, history
//! references and variables, then runs it as a pipeline of external commands
//! with optional `<`/`>` redirection and background jobs.

pub mod alias;
pub mod builtin;
pub mod config;
pub mod error;
pub mod eval;
pub mod global;
pub mod history;
pub mod job;
pub mod parser;
pub mod reaper;
pub mod shell;
pub mod tokenizer;
pub mod types;
pub mod vars;

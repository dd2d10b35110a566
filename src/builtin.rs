use std::env;
use std::io::Write;

use log::debug;
use nix::sys::signal::{self, Signal};
use nix::unistd;

use crate::error::{ExecError, ShellResult, TableError};
use crate::global;
use crate::vars::Scope;

pub type Builtin = fn(&mut global::State, &[String], &mut dyn Write) -> ShellResult<i32>;

const HELP: &str = "\
built-in commands:
  cd [dir]          change the working directory (default $HOME)
  exit              leave the shell
  jobs              list background jobs
  kill <job>        terminate a background job (`N` or `%N`)
  alias [name=cmd]  define an alias, or list them
  unalias <name>    remove an alias
  set [name=value]  set a shell variable, or list them
  export name=value set a variable passed to commands
  history           list recent command lines
  help              show this text
operators: `|` pipe, `<` input file, `>` output file, trailing `&` background.
history: `!-1` repeats the last line, `!N` the Nth.
";

/// Joins the operands of `alias`/`set`/`export` back into one `name=value`.
fn operand(args: &[String]) -> Option<String> {
	if args.len() < 2 {
		None
	} else {
		Some(args[1 ..].join(" "))
	}
}

pub fn builtin_cd(_: &mut global::State, args: &[String], _: &mut dyn Write) -> ShellResult<i32> {
	let path = match args.get(1) {
		Some(p) => p.clone(),
		None => env::var("HOME").map_err(|_| TableError::Usage("cd <dir>"))?,
	};
	unistd::chdir(path.as_str()).map_err(|e| ExecError::Chdir { path: path.clone(), source: e })?;
	debug!("cwd is now {}", path);
	Ok(0)
}

pub fn builtin_jobs(state: &mut global::State, _: &[String], out: &mut dyn Write) -> ShellResult<i32> {
	state.reap_jobs(out);
	for job in state.job_table.list() {
		writeln!(out, "[{}] {}\t{}", job.id, job.pid, job.command).map_err(ExecError::from)?;
	}
	Ok(0)
}

fn parse_job_id(arg: &str) -> Option<usize> {
	arg.strip_prefix('%').unwrap_or(arg).parse().ok()
}

pub fn builtin_kill(state: &mut global::State, args: &[String], _: &mut dyn Write) -> ShellResult<i32> {
	let arg = args.get(1).ok_or(TableError::Usage("kill <job>"))?;
	let job = parse_job_id(arg)
		.and_then(|id| state.job_table.find(id))
		.ok_or_else(|| TableError::NotFound("job", arg.clone()))?;
	let pid = job.pid;
	signal::kill(pid, Signal::SIGTERM).map_err(|e| ExecError::Signal { pid: pid, source: e })?;
	state.job_table.remove(pid);
	debug!("sent SIGTERM to {}", pid);
	Ok(0)
}

pub fn builtin_help(_: &mut global::State, _: &[String], out: &mut dyn Write) -> ShellResult<i32> {
	out.write_all(HELP.as_bytes()).map_err(ExecError::from)?;
	Ok(0)
}

pub fn builtin_alias(state: &mut global::State, args: &[String], out: &mut dyn Write) -> ShellResult<i32> {
	let raw = match operand(args) {
		Some(raw) => raw,
		None => {
			for alias in state.aliases.list() {
				writeln!(out, "alias {}='{}'", alias.name, alias.expansion).map_err(ExecError::from)?;
			}
			return Ok(0);
		},
	};
	let (name, expansion) = raw.split_once('=').ok_or(TableError::Malformed("alias"))?;
	state.aliases.set(name, expansion)?;
	Ok(0)
}

pub fn builtin_unalias(state: &mut global::State, args: &[String], _: &mut dyn Write) -> ShellResult<i32> {
	let name = args.get(1).ok_or(TableError::Usage("unalias <name>"))?;
	state.aliases.remove(name)?;
	Ok(0)
}

pub fn builtin_set(state: &mut global::State, args: &[String], out: &mut dyn Write) -> ShellResult<i32> {
	match operand(args) {
		Some(raw) => state.vars.set(&raw, Scope::Local)?,
		None => {
			for raw in state.vars.list() {
				writeln!(out, "{}", raw).map_err(ExecError::from)?;
			}
		},
	}
	Ok(0)
}

pub fn builtin_export(state: &mut global::State, args: &[String], _: &mut dyn Write) -> ShellResult<i32> {
	let raw = operand(args).ok_or(TableError::Usage("export name=value"))?;
	state.vars.set(&raw, Scope::Exported)?;
	Ok(0)
}

pub fn builtin_history(state: &mut global::State, _: &[String], out: &mut dyn Write) -> ShellResult<i32> {
	for (n, line) in state.history.iter() {
		writeln!(out, "{:5}  {}", n, line).map_err(ExecError::from)?;
	}
	Ok(0)
}

/// Built-ins run in the shell process in place of a single-stage pipeline.
/// `exit` is handled by the orchestrator itself.
pub fn match_builtin(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"jobs" => Some(builtin_jobs),
		"kill" => Some(builtin_kill),
		"help" => Some(builtin_help),
		"alias" => Some(builtin_alias),
		"unalias" => Some(builtin_unalias),
		"set" => Some(builtin_set),
		"export" => Some(builtin_export),
		"history" => Some(builtin_history),
		_ => None,
	}
}

use std::convert::Infallible;
use std::env;
use std::ffi::{self, CString};
use std::fs;
use std::io::{self, Write};
use std::os::unix::io::{FromRawFd, RawFd};

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::builtin;
use crate::error::{ExecError, ShellResult, TableError};
use crate::global;
use crate::job::{Process, WaitStatusExt};
use crate::types::Pipeline;
use crate::vars::VarStore;

const STATUS_NOT_FOUND: libc::c_int = 127;
const STATUS_NOT_EXECUTABLE: libc::c_int = 126;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
	/// Built-in or foreground pipeline finished; status of the last stage.
	Done(i32),
	Background { job_id: usize, pid: Pid },
	Exit,
}

/// Descriptors the parent opened for one pipeline. All of them are closed
/// when this goes out of scope, whichever way spawning ended.
struct Descriptors {
	fds: Vec<RawFd>,
}

impl Descriptors {
	fn push(&mut self, fd: RawFd) -> RawFd {
		self.fds.push(fd);
		fd
	}
}

impl Drop for Descriptors {
	fn drop(&mut self) {
		for fd in self.fds.drain(..) {
			let _ = unistd::close(fd);
		}
	}
}

fn open_redirect(path: &str, flags: OFlag) -> Result<RawFd, ExecError> {
	fcntl::open(path, flags | OFlag::O_CLOEXEC, Mode::from_bits_truncate(0o644))
		.map_err(|e| ExecError::Open { path: path.to_string(), source: e })
}

/// The shell's environment with exported variables layered on top.
fn child_environment(vars: &VarStore) -> Result<Vec<CString>, ffi::NulError> {
	use std::os::unix::ffi::OsStrExt;
	use std::os::unix::ffi::OsStringExt;

	let exported: Vec<_> = vars.exported().collect();
	let mut envp = vec![];
	for (mut k, v) in env::vars_os() {
		if exported.iter().any(|var| var.name.as_bytes() == k.as_bytes()) {
			continue;
		}
		k.push("=");
		k.push(v);
		envp.push(CString::new(k.into_vec())?);
	}
	for var in exported {
		envp.push(CString::new(var.raw())?);
	}
	Ok(envp)
}

fn do_exec_stage(argv: &[CString], envp: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>,
                 fds: &[RawFd]) -> nix::Result<Infallible> {
	if let Some(fd) = stdin {
		unistd::dup2(fd, libc::STDIN_FILENO)?;
	}
	if let Some(fd) = stdout {
		unistd::dup2(fd, libc::STDOUT_FILENO)?;
	}
	for &fd in fds {
		let _ = unistd::close(fd);
	}
	unistd::execvpe(&argv[0], argv, envp)
}

/// Runs in the forked child; never returns.
fn exec_stage(argv: &[CString], envp: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>,
              fds: &[RawFd]) -> ! {
	let e = match do_exec_stage(argv, envp, stdin, stdout, fds) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	let name = argv[0].to_string_lossy();
	let mut stderr = io::stderr();
	let status = if e == Errno::ENOENT {
		let _ = writeln!(stderr, "{}: command not found", name);
		STATUS_NOT_FOUND
	} else {
		let _ = writeln!(stderr, "{}: {}", name, e.desc());
		STATUS_NOT_EXECUTABLE
	};
	unsafe { libc::_exit(status) }
}

fn run_builtin(state: &mut global::State, func: builtin::Builtin, pipeline: &Pipeline,
               out: &mut dyn Write) -> ShellResult<i32> {
	if let Some(ref path) = pipeline.input {
		let _ = unistd::close(open_redirect(path, OFlag::O_RDONLY)?);
	}
	let args = &pipeline.stages[0].argv;
	match pipeline.output {
		Some(ref path) => {
			let fd = open_redirect(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC)?;
			let mut file = unsafe { fs::File::from_raw_fd(fd) };
			func(state, args, &mut file)
		},
		None => {
			let r = func(state, args, out);
			let _ = out.flush();
			r
		},
	}
}

fn wait_stage(pid: Pid) -> Option<Process> {
	loop {
		match wait::waitpid(pid, None) {
			Ok(status) if status.is_terminated() => {
				return Some(Process { pid: pid, status: status });
			},
			Ok(_) | Err(Errno::EINTR) => continue,
			Err(e) => {
				warn!("waitpid({}) failed: {}", pid, e);
				return None;
			},
		}
	}
}

fn report(state: &global::State, processes: &[Process]) {
	for process in processes {
		if process.status.code() != 0 {
			warn!("{}", process);
		}
		if state.config.verbose || matches!(process.status, WaitStatus::Signaled(..)) {
			eprintln!("{}", process);
		}
	}
}

/// Spawns every stage of `pipeline` with its descriptors wired, then waits for
/// all of them or, for a background pipeline, registers the last stage as a job.
/// `text` is the command line remembered for `jobs`.
fn spawn_pipeline(state: &mut global::State, pipeline: &Pipeline, text: &str,
                  out: &mut dyn Write) -> ShellResult<Outcome> {
	let stages = &pipeline.stages;
	let last = stages.len() - 1;

	let argvs = stages.iter()
		.map(|s| s.argv.iter().map(|a| CString::new(a.as_str())).collect::<Result<Vec<_>, _>>())
		.collect::<Result<Vec<_>, ffi::NulError>>()
		.map_err(ExecError::from)?;
	let envp = child_environment(&state.vars).map_err(ExecError::from)?;

	let mut fds = Descriptors { fds: vec![] };
	let input = match pipeline.input {
		Some(ref path) => Some(fds.push(open_redirect(path, OFlag::O_RDONLY)?)),
		None => None,
	};
	let output = match pipeline.output {
		Some(ref path) => Some(fds.push(open_redirect(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC)?)),
		None => None,
	};
	let mut pipes = Vec::with_capacity(last);
	for _ in 0 .. last {
		let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;
		pipes.push((fds.push(read), fds.push(write)));
	}

	let mut pids = Vec::with_capacity(stages.len());
	for (i, argv) in argvs.iter().enumerate() {
		let stdin = if i == 0 { input } else { Some(pipes[i - 1].0) };
		let stdout = if i == last { output } else { Some(pipes[i].1) };
		match unsafe { unistd::fork() } {
			Ok(ForkResult::Parent { child }) => {
				debug!("spawned {} for `{}`", child, stages[i].name());
				pids.push(child);
			},
			Ok(ForkResult::Child) => exec_stage(argv, &envp, stdin, stdout, &fds.fds),
			Err(e) => {
				warn!("fork failed after {} of {} stages", pids.len(), stages.len());
				drop(fds);
				for pid in pids {
					state.reaper.track(pid);
				}
				return Err(ExecError::Fork(e).into());
			},
		}
	}
	drop(fds);

	if pipeline.is_background {
		let pid = pids[last];
		for &pid in &pids {
			state.reaper.track(pid);
		}
		let job_id = state.job_table.add(pid, text)?;
		writeln!(out, "[{}] {}", job_id, pid).map_err(ExecError::from)?;
		return Ok(Outcome::Background { job_id: job_id, pid: pid });
	}

	let processes: Vec<Process> = pids.into_iter().filter_map(wait_stage).collect();
	report(state, &processes);
	let status = processes.last().map_or(1, |p| p.status.code());
	Ok(Outcome::Done(status))
}

pub fn eval(state: &mut global::State, pipeline: &Pipeline, text: &str, out: &mut dyn Write) -> ShellResult<Outcome> {
	let stages = &pipeline.stages;
	assert!(!stages.is_empty());

	if stages.iter().any(|s| s.name() == "exit") {
		return Ok(Outcome::Exit);
	}
	if stages.len() == 1 {
		if let Some(func) = builtin::match_builtin(stages[0].name()) {
			return run_builtin(state, func, pipeline, out).map(Outcome::Done);
		}
	}
	let name = stages.iter().map(|s| s.name()).find(|n| builtin::match_builtin(n).is_some());
	if let Some(name) = name {
		return Err(ExecError::BuiltinInPipeline(name.to_string()).into());
	}
	if pipeline.is_background && state.job_table.is_full() {
		return Err(TableError::Full("job").into());
	}
	spawn_pipeline(state, pipeline, text, out)
}

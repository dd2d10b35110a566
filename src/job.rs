use std::fmt;

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use crate::error::TableError;

pub trait WaitStatusExt {
	fn is_terminated(&self) -> bool;
	fn code(&self) -> i32;
}

impl WaitStatusExt for WaitStatus {
	fn is_terminated(&self) -> bool {
		matches!(*self, WaitStatus::Exited(..) | WaitStatus::Signaled(..))
	}

	/// Shell-style status: the exit code, or 128 plus the signal number.
	fn code(&self) -> i32 {
		match *self {
			WaitStatus::Exited(_, code) => code,
			WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
			_ => 0,
		}
	}
}

/// Status of one foreground stage once it has been collected.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	pub status: WaitStatus,
}

impl fmt::Display for Process {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.status {
			WaitStatus::Signaled(_, signal, _) => write!(f, "[{}] killed by {}", self.pid, signal),
			status => write!(f, "[{}] exited with status {}", self.pid, status.code()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
	pub id: usize,
	pub pid: Pid,
	pub command: String,
}

/// Background jobs in launch order. Ids come from a counter owned by the
/// table and are never handed out twice.
#[derive(Debug)]
pub struct JobTable {
	jobs: Vec<Job>,
	next_id: usize,
	capacity: usize,
}

impl JobTable {
	pub fn new(capacity: usize) -> JobTable {
		JobTable { jobs: vec![], next_id: 1, capacity: capacity }
	}

	pub fn is_full(&self) -> bool {
		self.jobs.len() >= self.capacity
	}

	pub fn add(&mut self, pid: Pid, command: &str) -> Result<usize, TableError> {
		if self.is_full() {
			return Err(TableError::Full("job"));
		}
		let id = self.next_id;
		self.next_id += 1;
		self.jobs.push(Job { id: id, pid: pid, command: command.to_string() });
		Ok(id)
	}

	pub fn remove(&mut self, pid: Pid) -> Option<Job> {
		let i = self.jobs.iter().position(|j| j.pid == pid)?;
		Some(self.jobs.remove(i))
	}

	pub fn find(&self, id: usize) -> Option<&Job> {
		self.jobs.iter().find(|j| j.id == id)
	}

	pub fn list(&self) -> &[Job] {
		&self.jobs
	}
}

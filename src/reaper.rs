//! Collection of background children.
//!
//! The SIGCHLD handler only raises a flag. The actual `waitpid` calls happen
//! in `Reaper::reap`, which the main loop runs between commands, and only for
//! pids that belong to background pipelines so foreground waits never lose a
//! status to the reaper.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::job::WaitStatusExt;

static CHILD_EXITED: AtomicBool = AtomicBool::new(false);

extern "C" fn note_child_exit(_: libc::c_int) {
	CHILD_EXITED.store(true, Ordering::SeqCst);
}

/// Installs the SIGCHLD handler. Stop notifications are not requested.
pub fn install_handler() -> nix::Result<()> {
	let action = SigAction::new(
		SigHandler::Handler(note_child_exit),
		SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
		SigSet::empty(),
	);
	unsafe { signal::sigaction(Signal::SIGCHLD, &action) }?;
	Ok(())
}

#[derive(Debug, Default)]
pub struct Reaper {
	detached: Vec<Pid>,
}

impl Reaper {
	pub fn new() -> Reaper {
		Reaper { detached: vec![] }
	}

	pub fn track(&mut self, pid: Pid) {
		self.detached.push(pid);
	}

	pub fn tracked(&self) -> usize {
		self.detached.len()
	}

	/// True when a child has exited since the last sweep.
	pub fn pending() -> bool {
		CHILD_EXITED.load(Ordering::SeqCst)
	}

	/// Non-blocking sweep over tracked pids. Returns the ones that ended; the
	/// status is `None` when someone else already collected the child.
	pub fn reap(&mut self) -> Vec<(Pid, Option<WaitStatus>)> {
		CHILD_EXITED.store(false, Ordering::SeqCst);
		let mut reaped = vec![];
		self.detached.retain(|&pid| {
			match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
				Ok(WaitStatus::StillAlive) => true,
				Ok(status) if status.is_terminated() => {
					debug!("reaped {} ({:?})", pid, status);
					reaped.push((pid, Some(status)));
					false
				},
				Ok(_) => true,
				Err(Errno::ECHILD) => {
					debug!("{} was already collected", pid);
					reaped.push((pid, None));
					false
				},
				Err(e) => {
					warn!("waitpid({}) failed: {}", pid, e);
					true
				},
			}
		});
		reaped
	}
}

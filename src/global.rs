use std::io::Write;

use crate::alias::AliasTable;
use crate::config::{self, Config};
use crate::history::History;
use crate::job::JobTable;
use crate::reaper::Reaper;
use crate::vars::VarStore;

/// Everything a command line may read or change. Owned by the main loop and
/// handed down explicitly.
pub struct State {
	pub config: Config,
	pub aliases: AliasTable,
	pub vars: VarStore,
	pub history: History,
	pub job_table: JobTable,
	pub reaper: Reaper,
}

impl State {
	pub fn new(config: Config) -> State {
		let history = History::new(config.history_size as usize);
		State {
			config: config,
			aliases: AliasTable::new(config::ALIAS_CAPACITY),
			vars: VarStore::new(config::VAR_CAPACITY),
			history: history,
			job_table: JobTable::new(config::JOB_CAPACITY),
			reaper: Reaper::new(),
		}
	}

	/// Collects finished background children. Jobs whose pid ended are removed
	/// from the table right away and announced on `out`.
	pub fn reap_jobs(&mut self, out: &mut dyn Write) {
		for (pid, _) in self.reaper.reap() {
			if let Some(job) = self.job_table.remove(pid) {
				let _ = writeln!(out, "[{}]+ Done\t{}", job.id, job.command);
			}
		}
	}
}

use std::collections::VecDeque;

use crate::error::HistoryError;

/// Fixed-capacity ring of command lines; the oldest entry is dropped first.
#[derive(Debug)]
pub struct History {
	lines: VecDeque<String>,
	capacity: usize,
}

impl History {
	pub fn new(capacity: usize) -> History {
		History { lines: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
	}

	pub fn record(&mut self, line: &str) {
		if self.lines.len() == self.capacity {
			self.lines.pop_front();
		}
		self.lines.push_back(line.to_string());
	}

	/// 1-based, oldest first.
	pub fn get(&self, index: usize) -> Option<&str> {
		index.checked_sub(1).and_then(|i| self.lines.get(i)).map(|s| s.as_str())
	}

	pub fn last(&self) -> Option<&str> {
		self.lines.back().map(|s| s.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
		self.lines.iter().enumerate().map(|(i, s)| (i + 1, s.as_str()))
	}

	/// Resolves a `!-1` or `!N` reference. `Ok(None)` when `line` is not a
	/// history reference at all.
	pub fn resolve(&self, line: &str) -> Result<Option<&str>, HistoryError> {
		let reference = match line.trim().strip_prefix('!') {
			Some(r) => r,
			None => { return Ok(None); },
		};
		if reference == "-1" {
			return self.last().map(Some).ok_or(HistoryError::Empty);
		}
		reference.parse::<usize>().ok()
			.and_then(|n| self.get(n))
			.map(Some)
			.ok_or(HistoryError::OutOfRange)
	}
}

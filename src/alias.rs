use crate::error::{TableError, TokenizeError};
use crate::tokenizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
	pub name: String,
	pub expansion: String,
}

/// Insertion-ordered alias definitions, bounded by `capacity`.
#[derive(Debug)]
pub struct AliasTable {
	entries: Vec<Alias>,
	capacity: usize,
}

impl AliasTable {
	pub fn new(capacity: usize) -> AliasTable {
		AliasTable { entries: Vec::with_capacity(capacity), capacity: capacity }
	}

	pub fn set(&mut self, name: &str, expansion: &str) -> Result<(), TableError> {
		if name.is_empty() {
			return Err(TableError::Malformed("alias"));
		}
		if expansion.split_whitespace().next() == Some(name) {
			return Err(TableError::SelfReferential(name.to_string()));
		}
		if let Some(alias) = self.entries.iter_mut().find(|a| a.name == name) {
			alias.expansion = expansion.to_string();
			return Ok(());
		}
		if self.entries.len() >= self.capacity {
			return Err(TableError::Full("alias"));
		}
		self.entries.push(Alias { name: name.to_string(), expansion: expansion.to_string() });
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.iter().find(|a| a.name == name).map(|a| a.expansion.as_str())
	}

	pub fn remove(&mut self, name: &str) -> Result<Alias, TableError> {
		match self.entries.iter().position(|a| a.name == name) {
			Some(i) => Ok(self.entries.remove(i)),
			None => Err(TableError::NotFound("alias", name.to_string())),
		}
	}

	pub fn list(&self) -> &[Alias] {
		&self.entries
	}

	/// Replaces the first token with its alias, once. Words produced by the
	/// expansion are not looked up again.
	pub fn expand(&self, tokens: Vec<String>) -> Result<Vec<String>, TokenizeError> {
		let expansion = match tokens.first().and_then(|t| self.get(t)) {
			Some(e) => e,
			None => { return Ok(tokens); },
		};
		let mut expanded = tokenizer::tokenize(expansion)?.unwrap_or_default();
		expanded.extend(tokens.into_iter().skip(1));
		if expanded.len() > crate::config::MAX_TOKENS {
			return Err(TokenizeError::TooManyArguments);
		}
		Ok(expanded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(line: &str) -> Vec<String> {
		line.split_whitespace().map(|s| s.to_string()).collect()
	}

	#[test]
	fn round_trip() {
		let mut table = AliasTable::new(4);
		table.set("ll", "ls -l").unwrap();
		assert_eq!(table.get("ll"), Some("ls -l"));
		assert_eq!(table.remove("ll").unwrap().expansion, "ls -l");
		assert_eq!(table.get("ll"), None);
		assert_eq!(table.remove("ll"), Err(TableError::NotFound("alias", "ll".to_string())));
	}

	#[test]
	fn upsert_keeps_order() {
		let mut table = AliasTable::new(4);
		table.set("a", "echo a").unwrap();
		table.set("b", "echo b").unwrap();
		table.set("a", "echo A").unwrap();
		let names: Vec<&str> = table.list().iter().map(|a| a.name.as_str()).collect();
		assert_eq!(names, vec!["a", "b"]);
		assert_eq!(table.get("a"), Some("echo A"));
		assert_eq!(table.get("A"), None);
	}

	#[test]
	fn capacity_rejects_new_names_only() {
		let mut table = AliasTable::new(1);
		table.set("a", "echo a").unwrap();
		assert_eq!(table.set("b", "echo b"), Err(TableError::Full("alias")));
		assert!(table.set("a", "echo again").is_ok());
	}

	#[test]
	fn self_reference_is_rejected() {
		let mut table = AliasTable::new(4);
		assert_eq!(table.set("ls", "ls -l"), Err(TableError::SelfReferential("ls".to_string())));
		assert!(table.list().is_empty());
	}

	#[test]
	fn expands_first_token_once() {
		let mut table = AliasTable::new(4);
		table.set("ll", "ls -l").unwrap();
		table.set("x", "ll -a").unwrap();
		assert_eq!(table.expand(words("ll /tmp")).unwrap(), words("ls -l /tmp"));
		// `ll` produced by `x` is left alone.
		assert_eq!(table.expand(words("x")).unwrap(), words("ll -a"));
		assert_eq!(table.expand(words("echo ll")).unwrap(), words("echo ll"));
	}
}

use crate::error::{ParseError, TableError};
use crate::types::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope { Local, Exported }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
	pub name: String,
	pub value: String,
	pub scope: Scope,
}

impl Var {
	/// `name=value`, the form `set` lists and children receive.
	pub fn raw(&self) -> String {
		format!("{}={}", self.name, self.value)
	}
}

#[derive(Debug)]
pub struct VarStore {
	vars: Vec<Var>,
	capacity: usize,
}

impl VarStore {
	pub fn new(capacity: usize) -> VarStore {
		VarStore { vars: vec![], capacity: capacity }
	}

	/// Binds `raw` (split at the first `=`). Re-setting a name replaces both its
	/// value and its scope.
	pub fn set(&mut self, raw: &str, scope: Scope) -> Result<(), TableError> {
		let (name, value) = match raw.find('=') {
			Some(0) | None => { return Err(TableError::Malformed("variable")); },
			Some(i) => (&raw[.. i], &raw[i + 1 ..]),
		};
		if let Some(var) = self.vars.iter_mut().find(|v| v.name == name) {
			var.value = value.to_string();
			var.scope = scope;
			return Ok(());
		}
		if self.vars.len() >= self.capacity {
			return Err(TableError::Full("variable"));
		}
		self.vars.push(Var { name: name.to_string(), value: value.to_string(), scope: scope });
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.vars.iter().find(|v| v.name == name).map(|v| v.value.as_str())
	}

	pub fn list(&self) -> impl Iterator<Item = String> + '_ {
		self.vars.iter().map(Var::raw)
	}

	pub fn exported(&self) -> impl Iterator<Item = &Var> {
		self.vars.iter().filter(|v| v.scope == Scope::Exported)
	}

	/// Replaces whole `$NAME` words with the bound value, falling back to the
	/// process environment. Unknown names drop the word. A value always becomes
	/// exactly one argument: it is not split on blanks.
	pub fn substitute(&self, tokens: Vec<String>) -> Vec<String> {
		tokens.into_iter().filter_map(|token| {
			let name = match token.strip_prefix('$') {
				Some(n) if !n.is_empty() => n,
				_ => { return Some(token); },
			};
			match self.get(name) {
				Some(v) => Some(v.to_string()),
				None => std::env::var(name).ok(),
			}
		}).filter(|t| !t.is_empty()).collect()
	}

	/// Substitutes the argument lists of an already parsed pipeline, so a value
	/// such as `|` or `>` stays a plain argument. Redirection targets are taken
	/// literally. A stage left with no words is an error.
	pub fn substitute_pipeline(&self, pipeline: &mut Pipeline) -> Result<(), ParseError> {
		for stage in &mut pipeline.stages {
			stage.argv = self.substitute(std::mem::take(&mut stage.argv));
			if stage.argv.is_empty() {
				return Err(ParseError::EmptyStage);
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser;

	#[test]
	fn set_and_get() {
		let mut store = VarStore::new(8);
		store.set("greeting=hello world", Scope::Local).unwrap();
		store.set("path=/a=b", Scope::Exported).unwrap();
		assert_eq!(store.get("greeting"), Some("hello world"));
		assert_eq!(store.get("path"), Some("/a=b"));
		assert_eq!(store.get("greet"), None);
		assert_eq!(store.list().collect::<Vec<_>>(), vec!["greeting=hello world", "path=/a=b"]);
	}

	#[test]
	fn names_match_exactly() {
		let mut store = VarStore::new(8);
		store.set("ab=1", Scope::Local).unwrap();
		store.set("a=2", Scope::Local).unwrap();
		assert_eq!(store.get("ab"), Some("1"));
		assert_eq!(store.get("a"), Some("2"));
	}

	#[test]
	fn malformed_is_user_error() {
		let mut store = VarStore::new(8);
		assert_eq!(store.set("novalue", Scope::Local), Err(TableError::Malformed("variable")));
		assert_eq!(store.set("=x", Scope::Local), Err(TableError::Malformed("variable")));
		assert_eq!(store.list().count(), 0);
	}

	#[test]
	fn export_promotes_scope() {
		let mut store = VarStore::new(8);
		store.set("x=1", Scope::Local).unwrap();
		assert_eq!(store.exported().count(), 0);
		store.set("x=2", Scope::Exported).unwrap();
		let exported: Vec<String> = store.exported().map(Var::raw).collect();
		assert_eq!(exported, vec!["x=2"]);
	}

	#[test]
	fn capacity() {
		let mut store = VarStore::new(1);
		store.set("a=1", Scope::Local).unwrap();
		assert_eq!(store.set("b=1", Scope::Local), Err(TableError::Full("variable")));
		assert!(store.set("a=2", Scope::Local).is_ok());
	}

	#[test]
	fn substitutes_whole_words() {
		let mut store = VarStore::new(8);
		store.set("dir=/tmp", Scope::Local).unwrap();
		let tokens = vec!["ls", "$dir", "x$dir", "$", "$psh_surely_unset_name"];
		let tokens = tokens.into_iter().map(String::from).collect();
		assert_eq!(store.substitute(tokens), vec!["ls", "/tmp", "x$dir", "$"]);
	}

	#[test]
	fn values_stay_single_arguments() {
		let mut store = VarStore::new(8);
		store.set("c=ls -l", Scope::Local).unwrap();
		store.set("p=|", Scope::Local).unwrap();
		let tokens: Vec<String> = vec!["$c", "$p", "x"].into_iter().map(String::from).collect();
		let mut pipeline = parser::parse(&tokens).unwrap();
		store.substitute_pipeline(&mut pipeline).unwrap();
		assert_eq!(pipeline.stages.len(), 1);
		assert_eq!(pipeline.stages[0].argv, vec!["ls -l", "|", "x"]);
	}

	#[test]
	fn stage_emptied_by_substitution() {
		let store = VarStore::new(8);
		let tokens: Vec<String> = vec!["echo", "|", "$psh_surely_unset_name"].into_iter().map(String::from).collect();
		let mut pipeline = parser::parse(&tokens).unwrap();
		assert_eq!(store.substitute_pipeline(&mut pipeline), Err(ParseError::EmptyStage));
	}
}

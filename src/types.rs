/// One command of a pipeline. `argv[0]` is the program name; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
	pub argv: Vec<String>,
}

impl Stage {
	pub fn name(&self) -> &str {
		&self.argv[0]
	}
}

/// `input` always feeds the first stage and `output` always receives the
/// last stage, wherever the operators appeared on the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
	pub stages: Vec<Stage>,
	pub input: Option<String>,
	pub output: Option<String>,
	pub is_background: bool,
}

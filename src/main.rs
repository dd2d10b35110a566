use std::io;
use std::io::{BufRead, Write};
use std::process;

use clap::Parser;
use log::{debug, error};

use psh::config::Config;
use psh::global::State;
use psh::reaper::{self, Reaper};
use psh::shell::{self, Flow};

fn run_once(state: &mut State, line: &str) -> i32 {
	match shell::run_line(state, line, &mut io::stdout()) {
		Ok(Flow::Status(status)) => status,
		Ok(Flow::Exit) => 0,
		Err(e) => {
			eprintln!("psh: {}", e);
			1
		},
	}
}

fn main() {
	let config = Config::parse();
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("PSH_LOG", "warn")).init();

	if let Err(e) = reaper::install_handler() {
		error!("cannot install SIGCHLD handler: {}", e);
		process::exit(1);
	}

	let mut state = State::new(config.clone());
	if let Some(ref line) = config.command {
		process::exit(run_once(&mut state, line));
	}

	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	loop {
		if Reaper::pending() {
			state.reap_jobs(&mut stdout);
		}
		let _ = stdout.write_all(state.config.prompt.as_bytes());
		let _ = stdout.flush();

		let mut line: Vec<u8> = vec![];
		match stdin_locked.read_until(b'\n', &mut line) {
			Ok(0) => break,
			Ok(_) => {},
			Err(e) => {
				error!("reading input failed: {}", e);
				break;
			},
		}
		let line = match shell::decode_line(line) {
			Ok(line) => line,
			Err(e) => {
				eprintln!("psh: {}", e);
				continue;
			},
		};

		match shell::run_line(&mut state, &line, &mut stdout) {
			Ok(Flow::Status(status)) => debug!("status {}", status),
			Ok(Flow::Exit) => process::exit(0),
			Err(e) => eprintln!("psh: {}", e),
		}
	}
	let _ = writeln!(stdout);
}

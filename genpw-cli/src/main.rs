use std::io::{self, Write};
use std::process::ExitCode;

use clap::CommandFactory;
use genpw_cli::{Args, Error, Session, run, run_interactive};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse_normalized(std::env::args_os());

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = if args.interactive {
        let mut session = Session::new();
        run_interactive(&mut session, io::stdin().lock(), &mut io::stdout().lock())
    } else {
        run(&args, &mut io::stdout().lock())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &Error) -> ExitCode {
    let mut stderr = io::stderr().lock();
    if e.is_usage() {
        let _ = Args::command().write_help(&mut stderr);
        let _ = writeln!(stderr);
    }
    let _ = writeln!(stderr, "genpw: {e}");
    e.exit_code()
}

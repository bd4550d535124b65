use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vision::cgi::Request;
use vision::cli::{CliArgs, Input};
use vision::error::{Error, Result};
use vision::script::Interpreter;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "vision=error".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let args = match CliArgs::try_parse() {
        Ok(a) => a,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("Invalid command line:\n{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_internal() {
                eprintln!("Internal error:\n{e}");
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let mut options = args.options().with_env();

    // A POST body is read before the template, which may also be on stdin.
    let request = Request::from_env(&mut io::stdin().lock())
        .map_err(|source| Error::Io { context: "Unable to read request body".into(), source })?;
    if request.forces_head() {
        options.mode.head = true;
    }

    let input = args.source();
    let source = read_source(&input).map_err(|e| e.in_source(input.to_string()))?;

    let mut interp = Interpreter::new(options);
    request.define_into(&mut interp);
    let result = interp.run_to_string(&source);
    for diagnostic in interp.diagnostics() {
        eprintln!("{diagnostic}");
    }
    let page = result.map_err(|e| e.in_source(input.to_string()))?;

    let mut out = io::stdout().lock();
    out.write_all(page.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| Error::Io { context: "Unable to write output".into(), source })
}

fn read_source(input: &Input) -> Result<String> {
    let bytes = match input {
        Input::Stdin => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map(|_| buf)
                .map_err(|source| Error::Io { context: "Unable to read standard input".into(), source })?
        }
        Input::File(path) => fs::read(path).map_err(|source| Error::Io {
            context: format!("Unable to open \"{}\"", path.display()),
            source,
        })?,
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

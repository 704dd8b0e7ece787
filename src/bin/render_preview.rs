//! Render a stored payload into a standalone preview document.
//!
//! Usage: `render_preview <payload.json> [<out.html>]`
//!
//! Accepts either a debug payload or a note request. Image placeholders are
//! replaced by the raw image URLs. Without an output path the document goes
//! to stdout.

use std::env;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

use notes_clipper::preview::{parse_payload, render_preview};

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let input = args
        .next()
        .ok_or("usage: render_preview <payload.json> [<out.html>]")?;
    let output = args.next();

    let request = parse_payload(&fs::read_to_string(&input)?)?;
    let document = render_preview(&request, None);

    match output {
        Some(path) => {
            fs::write(&path, document)?;
            tracing::info!(%path, title = %request.title, "wrote preview");
        }
        None => println!("{document}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

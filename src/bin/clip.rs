//! Capture a saved page and print the debug payload as JSON.
//!
//! Usage: `clip <url> <html-file> [--mode reader|selection] [--selection-file <file>] [--folder <path>]`
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::env;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

use chrono::Utc;
use notes_clipper::note::{choose_folder, DebugPayload, FolderRef, FolderSettings, NoteRequest};
use notes_clipper::page::{Page, SelectionRange};
use notes_clipper::{extractor, CaptureMode, Options};

struct Args {
    url: String,
    html_path: String,
    mode: CaptureMode,
    selection_path: Option<String>,
    folder: Option<String>,
    with_request: bool,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut positional = Vec::new();
    let mut mode = CaptureMode::Reader;
    let mut selection_path = None;
    let mut folder = None;
    let mut with_request = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                let value = args.next().ok_or("--mode needs a value")?;
                mode = serde_json::from_value(serde_json::Value::String(value.clone()))
                    .map_err(|_| format!("unknown mode: {value}"))?;
            }
            "--selection-file" => {
                selection_path = Some(args.next().ok_or("--selection-file needs a path")?);
            }
            "--folder" => folder = Some(args.next().ok_or("--folder needs a path")?),
            "--request" => with_request = true,
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(url), Some(html_path)) = (positional.next(), positional.next()) else {
        return Err("usage: clip <url> <html-file> [--mode reader|selection] [--selection-file <file>] [--folder <path>] [--request]".into());
    };

    Ok(Args {
        url,
        html_path,
        mode,
        selection_path,
        folder,
        with_request,
    })
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    let html = fs::read(&args.html_path)?;
    let mut page = Page::from_bytes(&args.url, &html)?;
    if let Some(path) = &args.selection_path {
        page = page.with_selection(vec![SelectionRange::new(fs::read_to_string(path)?)]);
    }

    let options = Options {
        mode: args.mode,
        ..Options::default()
    };
    let captured_at = Utc::now();
    let document = extractor::capture(
        &page,
        &Options {
            captured_at: Some(captured_at),
            ..options.clone()
        },
    )?;
    tracing::info!(title = %document.title, images = document.images.len(), "captured");

    let folder = choose_folder(
        args.folder.map(FolderRef::in_default_account),
        &FolderSettings::default(),
        document.suggested_folder_path.as_deref(),
    );

    let output = if args.with_request {
        serde_json::to_string_pretty(&NoteRequest::from_document(
            &document,
            folder,
            options.title_max_chars,
        ))?
    } else {
        serde_json::to_string_pretty(&DebugPayload::new(document, options.mode, folder, captured_at))?
    };
    println!("{output}");
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
            tracing::error!(error = %err, "clip failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

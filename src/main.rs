//! bionify - Bionic reading for HTML documents

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;

use bionify::{Document, Error, Options, Response, Result, invoke};

#[derive(Parser)]
#[command(name = "bionify")]
#[command(version, about = "Bionic reading for HTML documents", long_about = None)]
#[command(after_help = "EXAMPLES:
    bionify page.html -o out.html        Rewrite page.html into out.html
    bionify --prefers-dark page.html     Print the rewritten page to stdout
    cat page.html | bionify - --json     Read stdin, report counts as JSON")]
struct Cli {
    /// Input HTML file, or - for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file, or - for stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Host prefers a dark color scheme
    #[arg(long, env = "BIONIFY_PREFERS_DARK")]
    prefers_dark: bool,

    /// Extra stylesheet applied after the document's own (repeatable)
    #[arg(long = "css", value_name = "FILE")]
    css: Vec<String>,

    /// Print the command response as JSON on stderr
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut options = Options::default().with_prefers_dark(cli.prefers_dark);
    for path in &cli.css {
        let css = fs::read_to_string(path).map_err(|e| at_path(path, e))?;
        options = options.with_css(css);
    }

    let input = read_input(&cli.input).map_err(|e| at_path(&cli.input, e))?;
    let mut doc = Document::parse_bytes(&input);
    let outcome = invoke::process_page(&mut doc, &options);

    if cli.json {
        let response = match &outcome {
            Ok(report) => Response::success(*report),
            Err(err) => Response::error(err),
        };
        eprintln!("{}", serde_json::to_string(&response)?);
    }

    let report = outcome?;
    let html = doc.to_html()?;
    write_output(cli.output.as_deref(), &html)?;
    if !cli.quiet && !cli.json {
        eprintln!(
            "Processed {} text nodes ({} modified, {} words)",
            report.attempted, report.modified, report.words
        );
    }
    Ok(())
}

/// Prefix an I/O error with the path it concerns.
fn at_path(path: &str, err: io::Error) -> Error {
    Error::Io(io::Error::new(err.kind(), format!("{path}: {err}")))
}

fn read_input(path: &str) -> io::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
    }
}

fn write_output(path: Option<&str>, html: &str) -> Result<()> {
    match path {
        None | Some("-") => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
        Some(path) => fs::write(path, html).map_err(|e| at_path(path, e))?,
    }
    Ok(())
}

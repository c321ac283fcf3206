use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typespec::gen::{python::Python, ts::TypeScript};
use typespec::parser::Recovery;
use typespec::{ParseOptions, TypeSpecParser};

#[derive(Parser)]
#[command(name = "tspc", version, about = "Generate Python dataclasses or TypeScript types from TypeSpec models")]
struct Opts {
    /// Input TypeSpec file
    input: PathBuf,
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Lang::Python)]
    lang: Lang,
    /// Fail a statement-level mismatch instead of skipping the statement
    #[arg(long)]
    strict: bool,
    /// Do not fall back to the line scanner when the grammar fails
    #[arg(long)]
    no_fallback: bool,
    /// Skip formatting the output
    #[arg(long)]
    no_format: bool,
    /// Formatter command reading stdin and writing stdout (default: `black -` for python)
    #[arg(long)]
    formatter: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Lang {
    Python,
    #[value(alias = "ts")]
    Typescript,
}

impl Lang {
    fn default_formatter(self) -> Option<&'static str> {
        match self {
            Lang::Python => Some("black -"),
            Lang::Typescript => None,
        }
    }
}

/// Pipes `code` through `command`. Any failure leaves the code as it was.
fn format_code(command: &str, code: String) -> String {
    let mut words = command.split_whitespace();
    let Some(program) = words.next() else {
        return code;
    };
    match run_formatter(program, words, &code) {
        Ok(formatted) => formatted,
        Err(e) => {
            warn!(formatter = program, "formatting skipped: {:#}", e);
            code
        }
    }
}

fn run_formatter<'a>(program: &str, args: impl Iterator<Item = &'a str>, code: &str) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("{} not found", program))?;
    let mut stdin = child.stdin.take().context("formatter stdin unavailable")?;
    // Feed stdin while the output is drained, or a streaming formatter blocks on a full pipe
    let (written, output) = thread::scope(|s| {
        let writer = s.spawn(move || stdin.write_all(code.as_bytes()));
        let output = child.wait_with_output();
        (writer.join(), output)
    });
    let output = output?;
    if !output.status.success() {
        anyhow::bail!("{} failed: {}", program, String::from_utf8_lossy(&output.stderr).trim());
    }
    written
        .map_err(|_| anyhow::anyhow!("writing to {} panicked", program))?
        .with_context(|| format!("writing to {}", program))?;
    Ok(String::from_utf8(output.stdout)?)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "tspc=info,typespec=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let opts = Opts::parse();
    let content =
        fs::read_to_string(&opts.input).with_context(|| format!("Error reading file '{}'", opts.input.display()))?;

    let options = ParseOptions {
        recovery: if opts.strict { Recovery::Abort } else { Recovery::SkipStatement },
        fallback: !opts.no_fallback,
    };
    let mut parser = TypeSpecParser::new(&options);
    parser.parse(&content);
    let mut output = match opts.lang {
        Lang::Python => parser.generate::<Python>(),
        Lang::Typescript => parser.generate::<TypeScript>(),
    };

    if !opts.no_format {
        if let Some(command) = opts.formatter.as_deref().or_else(|| opts.lang.default_formatter()) {
            output = format_code(command, output);
        }
    }

    match &opts.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("Error writing to file '{}'", path.display()))?;
            info!("Generated code written to '{}'", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glob::glob;
use pcapwrite_core::{OpenPhase, PcapFileWriter, PcapWriteError, WriterStats};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod frames;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PCAPWRITE_BUILD_COMMIT"),
    " ",
    env!("PCAPWRITE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "pcapwrite")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Append link-layer frames to a libpcap capture file.",
    long_about = None,
    after_help = "Examples:\n  pcapwrite append out.pcap --input frames.jsonl\n  generate-frames | pcapwrite append out.pcap --input - --summary\n\nSet PCAPWRITE_LOG=debug for diagnostics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append frames described as JSON Lines, creating the capture if needed.
    #[command(alias = "write")]
    #[command(
        after_help = "Each input line is one frame:\n  {\"ts_us\": 1500000, \"data\": [0, 1, 2, ...]}\n  {\"data\": [69, 0, ...], \"ethernet\": {\"dst\": [255,255,255,255,255,255], \"src\": [2,0,0,0,0,1], \"ethertype\": 2048}}\n\nFrames without \"ethernet\" must be complete; 14 bytes or less are skipped."
    )]
    Append {
        /// Capture file to create or append to
        output: PathBuf,

        /// JSON Lines input: a file, a glob pattern, or - for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Print a JSON summary to stdout
        #[arg(long)]
        summary: bool,

        /// Pretty-print the JSON summary
        #[arg(long, requires = "summary")]
        pretty: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Append {
            output,
            input,
            summary,
            pretty,
            quiet,
        } => cmd_append(output, &input, summary, pretty, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_env("PCAPWRITE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        let hint = err.chain().find_map(|cause| {
            cause
                .downcast_ref::<PcapWriteError>()
                .map(hint_for_write_error)
        });
        CliError::new(format!("{err:#}"), hint)
    }
}

fn hint_for_write_error(err: &PcapWriteError) -> String {
    match err {
        PcapWriteError::Open {
            phase: OpenPhase::Creating,
            ..
        } => "check that the output directory exists and is writable".to_string(),
        PcapWriteError::Open {
            phase: OpenPhase::Appending,
            ..
        } => "check permissions on the existing capture".to_string(),
        PcapWriteError::Write { .. } => {
            "the capture may end with a truncated record; check free space".to_string()
        }
        PcapWriteError::FrameTooLarge { .. } => "split the frame into smaller records".to_string(),
    }
}

/// Where frames are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    fn label(&self) -> String {
        match self {
            InputSource::Stdin => "stdin".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// Summary printed with `--summary`.
#[derive(Debug, Serialize)]
struct WriteSummary {
    output: String,
    created: bool,
    #[serde(flatten)]
    stats: WriterStats,
}

fn cmd_append(
    output: PathBuf,
    input: &str,
    summary: bool,
    pretty: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let sources = resolve_inputs(input)?;
    ensure_output_differs(&output, &sources)?;

    let mut writer = PcapFileWriter::create(&output)
        .with_context(|| format!("cannot open capture {}", output.display()))?;
    debug!(
        "{} {}",
        if writer.was_created() { "created" } else { "appending to" },
        output.display()
    );

    for source in &sources {
        let label = source.label();
        let frames = match source {
            InputSource::Stdin => frames::append_frames(io::stdin().lock(), &label, &mut writer)?,
            InputSource::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to read input file: {}", path.display()))?;
                frames::append_frames(BufReader::new(file), &label, &mut writer)?
            }
        };
        debug!("{label}: {frames} frames");
    }

    let created = writer.was_created();
    let stats = writer.stats();
    writer
        .close()
        .with_context(|| format!("failed to close capture {}", output.display()))?;

    if summary {
        let report = WriteSummary {
            output: output.display().to_string(),
            created,
            stats,
        };
        let json = if pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .context("JSON serialization failed")?;
        println!("{}", json);
    }
    if !quiet {
        eprintln!(
            "OK: {} records written, {} skipped -> {}",
            stats.records_written,
            stats.records_skipped,
            output.display()
        );
    }
    Ok(())
}

fn ensure_output_differs(output: &Path, sources: &[InputSource]) -> Result<(), CliError> {
    let Some(output_abs) = resolve_target(output)? else {
        return Ok(());
    };
    for source in sources {
        let InputSource::File(path) = source else {
            continue;
        };
        let input_abs = fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve input path: {}", path.display()))?;
        if input_abs == output_abs {
            return Err(CliError::new(
                format!("output must differ from input: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

/// Absolute form of `path`, resolved through its parent so the file itself
/// need not exist. `None` when the parent does not exist either.
fn resolve_target(path: &Path) -> Result<Option<PathBuf>, CliError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        return Ok(None);
    }
    let parent_abs = fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve output path: {}", path.display()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", path.display()))?;
    Ok(Some(parent_abs.join(file_name)))
}

fn resolve_inputs(input: &str) -> Result<Vec<InputSource>, CliError> {
    if input == "-" {
        return Ok(vec![InputSource::Stdin]);
    }
    if !is_glob_pattern(input) {
        let path = PathBuf::from(input);
        if !path.is_file() {
            return Err(CliError::new(
                format!("input file not found: {}", path.display()),
                Some("pass a JSON Lines file, a glob pattern, or - for stdin".to_string()),
            ));
        }
        return Ok(vec![InputSource::File(path)]);
    }

    let mut matches = Vec::new();
    let paths = glob(input).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", input),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", input),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", input),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    matches.sort();
    Ok(matches.into_iter().map(InputSource::File).collect())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

//! Edit a column-configured row table in the terminal.
//!
//! The table config (`--table`) and optional seed rows (`--rows`) each
//! accept a file path, an inline payload, or `-` for stdin. The saved rows
//! document goes to stdout unless `--output` names other destinations.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;

use tableui::{DocumentFormat, OutputDestination, OutputOptions, TableUI, parse_document_str};

#[derive(Debug, Parser)]
#[command(
    name = "tableui",
    version,
    about = "Edit column-configured row tables in the terminal"
)]
struct Cli {
    /// Table config: file path, inline payload, or "-" for stdin
    #[arg(short = 't', long = "table", value_name = "SPEC")]
    table: String,

    /// Seed rows: file path, inline payload, or "-" for stdin
    #[arg(short = 'r', long = "rows", value_name = "SPEC")]
    rows: Option<String>,

    /// Title shown above the table
    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let mut report = Diagnostics::default();

    let both_stdin = cli.table == "-" && cli.rows.as_deref() == Some("-");
    if both_stdin {
        report.input(
            "table/rows",
            "the table config and seed rows cannot both come from stdin; \
             pass at least one of them inline or as a file",
        );
    }

    let table_doc = report.collect(Some(cli.table.as_str()), "table config", both_stdin);
    let rows_doc = report.collect(cli.rows.as_deref(), "seed rows", both_stdin);
    let (output, planned_files) = plan_output(&cli, &mut report);
    refuse_to_clobber(&planned_files, cli.force, &mut report);
    report.finish()?;

    let table_doc = table_doc.ok_or_else(|| eyre!("provide a table config via --table"))?;
    let mut ui = TableUI::from_config(&table_doc).map_err(Report::msg)?;
    if let Some(document) = rows_doc.as_ref() {
        ui = ui.with_seed_document(document).map_err(Report::msg)?;
    }
    if let Some(title) = cli.title {
        ui = ui.with_title(title);
    }
    ui = ui.with_output(output);

    let _ = ui.run().map_err(Report::msg)?;
    Ok(())
}

/// Resolve an argument to a document: stdin for `-`, then a file, and if
/// no such file exists, the argument itself as inline content.
fn load_document(spec: &str, label: &str) -> Result<Value> {
    if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err_with(|| format!("failed to read {label} from stdin"))?;
        return parse_payload(&buffer, DocumentFormat::default(), label);
    }

    let path = Path::new(spec);
    match fs::read_to_string(path) {
        Ok(contents) => {
            let hint = DocumentFormat::from_path(path).unwrap_or_default();
            parse_payload(&contents, hint, label)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            parse_payload(spec, DocumentFormat::default(), &format!("inline {label}"))
        }
        Err(err) => {
            Err(err).wrap_err_with(|| format!("failed to read {label} from {}", path.display()))
        }
    }
}

/// Parse with the hinted format first, then let every other compiled-in
/// format have a go before reporting the first failure.
fn parse_payload(contents: &str, hint: DocumentFormat, label: &str) -> Result<Value> {
    let primary = match parse_document_str(contents, hint) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    for fallback in DocumentFormat::available_formats() {
        if fallback == hint {
            continue;
        }
        if let Ok(value) = parse_document_str(contents, fallback) {
            return Ok(value);
        }
    }
    Err(eyre!(
        "could not parse {label} as any of {}: {primary}",
        supported_formats()
    ))
}

fn supported_formats() -> String {
    DocumentFormat::available_formats()
        .into_iter()
        .map(|format| format.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects every problem with the invocation before the terminal is taken
/// over, so one bad run reports all of its mistakes at once.
#[derive(Default)]
struct Diagnostics {
    problems: Vec<String>,
}

impl Diagnostics {
    fn input(&mut self, label: &str, message: impl Into<String>) {
        self.problems.push(format!("{label}: {}", message.into()));
    }

    fn output(&mut self, message: impl Into<String>) {
        self.problems.push(message.into());
    }

    /// Load one document argument, recording a failure instead of aborting
    /// so the remaining arguments still get checked.
    fn collect(&mut self, spec: Option<&str>, label: &str, skip: bool) -> Option<Value> {
        if skip {
            return None;
        }
        match load_document(spec?, label) {
            Ok(value) => Some(value),
            Err(err) => {
                self.input(label, err.to_string());
                None
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.problems.is_empty() {
            return Ok(());
        }
        let mut body = String::from("cannot start the editor:\n");
        for (index, problem) in self.problems.iter().enumerate() {
            let _ = writeln!(body, "  {}. {problem}", index + 1);
        }
        Err(eyre!(body))
    }
}

/// Turn the `--output` flags into emit settings. No destinations means the
/// rows go to stdout; files must agree on one serialization format.
fn plan_output(cli: &Cli, report: &mut Diagnostics) -> (OutputOptions, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    let mut files = Vec::new();

    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            report.output("output destination cannot be empty");
        } else if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            files.push(PathBuf::from(raw));
            destinations.push(OutputDestination::file(raw));
        }
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let options = OutputOptions {
        format: agree_on_format(&files, report).unwrap_or_default(),
        pretty: !cli.no_pretty,
        destinations,
    };
    (options, files)
}

fn agree_on_format(files: &[PathBuf], report: &mut Diagnostics) -> Option<DocumentFormat> {
    let mut agreed = None;
    for path in files {
        let Some(format) = DocumentFormat::from_path(path) else {
            report.output(format!(
                "cannot tell the output format for {}; use a .json/.yaml/.toml extension",
                path.display()
            ));
            continue;
        };
        match agreed {
            None => agreed = Some(format),
            Some(existing) if existing != format => report.output(format!(
                "output file {} wants {format}, but earlier destinations chose {existing}; \
                 all outputs share one format",
                path.display()
            )),
            Some(_) => {}
        }
    }
    agreed
}

fn refuse_to_clobber(files: &[PathBuf], force: bool, report: &mut Diagnostics) {
    if force {
        return;
    }
    for path in files.iter().filter(|path| path.exists()) {
        report.output(format!(
            "output file {} already exists; pass --force to replace it",
            path.display()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_output_extensions_are_reported() {
        let mut report = Diagnostics::default();
        let files = vec![PathBuf::from("rows.json"), PathBuf::from("rows.toml")];
        let agreed = agree_on_format(&files, &mut report);
        assert_eq!(agreed, Some(DocumentFormat::Json));
        assert!(report.finish().is_err());
    }

    #[test]
    fn missing_outputs_default_to_stdout() {
        let cli = Cli::parse_from(["tableui", "--table", "{}"]);
        let mut report = Diagnostics::default();
        let (options, files) = plan_output(&cli, &mut report);
        assert!(files.is_empty());
        assert!(matches!(
            options.destinations.as_slice(),
            [OutputDestination::Stdout]
        ));
        assert!(report.finish().is_ok());
    }

    #[test]
    fn inline_payloads_parse_when_no_file_matches() {
        let value = load_document(r#"{"name":"columns"}"#, "table config").unwrap();
        assert_eq!(value["name"], "columns");
    }
}

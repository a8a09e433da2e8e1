//! lexor command-line front end
//!
//! Reads a document, optionally converts it, and writes it back out:
//! - output goes to stdout
//! - diagnostics go to stderr, colored or as JSON
//!
//! Exit status: 0 on success, 1 with `--strict` when there were
//! diagnostics, 2 when a requested style is not installed.

mod report;

use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use lexor_common::{StyleKind, StyleOptions};
use lexor_core::{Dom, StyleRegistry};
use owo_colors::OwoColorize;

use report::Report;

/// The default style, as written on the command line.
const DEFAULT: &str = "_";

/// Parse, convert and write documents in named languages and styles
#[derive(Parser, Debug)]
#[command(name = "lexor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Normalize an xml file
    lexor note.xml

    # Drop comments and blank text
    lexor --convert clean note.xml

    # Extract the text, wrapped at 60 columns
    lexor --to text --width 60 note.xml

    # Read stdin, fail on any diagnostic
    cat note.xml | lexor --strict

    # List installed styles
    lexor --list
"#)]
struct Cli {
    /// Input file (default: standard input)
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Input language and parser style; `_` means default
    #[arg(short, long, value_name = "LANG[:STYLE]", default_value = "xml")]
    from: StyleSpec,

    /// Output language and writer style (default: the input language)
    #[arg(short, long, value_name = "LANG[:STYLE]")]
    to: Option<StyleSpec>,

    /// Converter style to run between parsing and writing
    #[arg(short, long, value_name = "STYLE")]
    convert: Option<String>,

    /// Wrap width for the writer, 0 to disable wrapping
    #[arg(short, long, value_name = "N")]
    width: Option<usize>,

    /// Style option passed to parser and writer (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Print diagnostics as JSON
    #[arg(long)]
    json: bool,

    /// Do not print diagnostics
    #[arg(short, long, conflicts_with = "json")]
    quiet: bool,

    /// Write nothing and exit 1 if there are diagnostics
    #[arg(long)]
    strict: bool,

    /// List installed styles and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn style_options(&self) -> StyleOptions {
        let mut options: StyleOptions = self.options.iter().cloned().collect();
        if let Some(width) = self.width {
            let _ = options.set("width", width.to_string());
        }
        options
    }

    fn target(&self) -> StyleSpec {
        self.to.clone().unwrap_or_else(|| StyleSpec {
            lang: self.from.lang.clone(),
            style: DEFAULT.to_string(),
        })
    }
}

/// A `LANG[:STYLE]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleSpec {
    lang: String,
    style: String,
}

impl FromStr for StyleSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lang, style) = s.split_once(':').unwrap_or((s, DEFAULT));
        if lang.is_empty() {
            return Err(format!("'{s}' names no language"));
        }
        Ok(Self {
            lang: lang.to_string(),
            style: if style.is_empty() { DEFAULT } else { style }.to_string(),
        })
    }
}

impl fmt::Display for StyleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lang, self.style)
    }
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    StyleOptions::parse_assignment(s).ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "lexor:".red().bold());
            let missing_style = err
                .downcast_ref::<lexor_core::Error>()
                .is_some_and(lexor_core::Error::is_resolve);
            if missing_style {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let registry = StyleRegistry::with_builtins();
    if cli.list {
        print_styles(&registry);
        return Ok(ExitCode::SUCCESS);
    }

    let from = &cli.from;
    let to = cli.target();
    let options = cli.style_options();
    let parser = registry.parser(&from.lang, &from.style).map_err(lexor_core::Error::from)?;
    let _ = registry.writer(&to.lang, &to.style).map_err(lexor_core::Error::from)?;
    let text = read_input(cli.path.as_deref())?;
    let uri = cli.path.as_ref().map(|p| p.display().to_string());

    let mut dom = Dom::new();
    let mut report = Report::new();
    let parsed = lexor_core::parse(
        &registry,
        &mut dom,
        &text,
        uri.as_deref(),
        &from.lang,
        &from.style,
        &options,
    )?;
    report.collect(&dom, parsed.log, parser.message_table());

    let mut root = parsed.document;
    if cli.convert.is_some() || registry.language(&from.lang) != registry.language(&to.lang) {
        let style = cli.convert.as_deref().unwrap_or(DEFAULT);
        let converter = registry
            .converter(&from.lang, &to.lang, style)
            .map_err(lexor_core::Error::from)?;
        let converted =
            lexor_core::convert(&registry, &mut dom, root, &from.lang, &to.lang, style)?;
        report.collect(&dom, converted.log, converter.message_table());
        root = converted.document;
    }

    if cli.json {
        eprintln!("{}", report.to_json()?);
    } else if !cli.quiet {
        report.print();
    }
    if cli.strict && !report.is_empty() {
        eprintln!(
            "{} {} diagnostic(s), nothing written",
            "lexor:".red().bold(),
            report.len()
        );
        return Ok(ExitCode::FAILURE);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    lexor_core::write(&registry, &dom, root, &to.lang, &to.style, &options, &mut out)?;
    out.flush().context("failed to flush output")?;
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            let mut text = String::new();
            let _ = io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            Ok(text)
        }
    }
}

fn print_styles(registry: &StyleRegistry) {
    for kind in [StyleKind::Parser, StyleKind::Writer, StyleKind::Converter] {
        println!("{}", format!("{kind}s:").bold());
        for name in registry.styles(kind) {
            println!("  {name}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lexor").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_style_spec() {
        let spec: StyleSpec = "xml:clean".parse().unwrap();
        assert_eq!(spec.to_string(), "xml:clean");
        assert_eq!("text".parse::<StyleSpec>().unwrap().style, DEFAULT);
        assert_eq!("text:".parse::<StyleSpec>().unwrap().style, DEFAULT);
        assert!(":clean".parse::<StyleSpec>().is_err());
    }

    #[test]
    fn test_target_defaults_to_input_language() {
        assert_eq!(args(&["--from", "xml:strict", "in.xml"]).target().to_string(), "xml:_");
        assert_eq!(args(&["--to", "text"]).target().to_string(), "text:_");
    }

    #[test]
    fn test_options_and_width() {
        let options = args(&["-o", "indent=2", "--option", "mode=a=b", "--width", "40"]).style_options();
        assert_eq!(options.get("indent"), Some("2"));
        assert_eq!(options.get("mode"), Some("a=b"));
        assert_eq!(options.get("width"), Some("40"));
        assert!(Cli::try_parse_from(["lexor", "-o", "novalue"]).is_err());
    }

    #[test]
    fn test_quiet_and_json_conflict() {
        assert!(Cli::try_parse_from(["lexor", "--quiet", "--json"]).is_err());
    }
}

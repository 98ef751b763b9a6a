//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pressmark_core::{
    build_document, extract_outline, first_title, Cover, Settings, DEFAULT_STYLESHEET,
};
use pressmark_pdf::{
    convert, format_size, manual_instructions, BackendConfig, ConvertRequest, RenderEngine,
    RenderOptions, RunState,
};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "pressmark")]
#[command(author, version, about = "Markdown to print-ready PDF", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a markdown file to PDF
    Convert(ConvertArgs),

    /// Compose the printable HTML without rendering a PDF
    Html {
        /// Input markdown file
        input: PathBuf,

        /// Output HTML file (defaults to the input with .html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        document: DocumentArgs,
    },

    /// Print the heading outline of a markdown file
    Outline {
        /// Input markdown file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List configured render backends and whether they can run here
    Backends {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Cover, styling and configuration options shared by commands that compose
#[derive(Debug, Clone, Default, Args)]
pub struct DocumentArgs {
    /// CSS file embedded in the document (overrides the configuration)
    #[arg(long)]
    pub css: Option<PathBuf>,

    /// Cover title (defaults to the first level 1 heading)
    #[arg(long)]
    pub title: Option<String>,

    /// Cover subtitle
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Configuration file (defaults to pressmark.toml beside the input)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Options of the convert command
#[derive(Debug, Clone, Default, Args)]
pub struct ConvertArgs {
    /// Input markdown file
    pub input: PathBuf,

    /// Output PDF file (defaults to the input with .pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub document: DocumentArgs,

    /// Backend to try, in order; repeat to build a chain (overrides the configuration)
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,

    /// Keep the composed HTML next to the PDF
    #[arg(long)]
    pub keep_html: bool,

    /// Time budget in seconds for page loads and converter processes
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format (text or json)
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert(args) => {
            convert_command(&args)?;
        }
        Commands::Html {
            input,
            output,
            document,
        } => {
            html_command(&input, output.as_deref(), &document)?;
        }
        Commands::Outline { input, format } => {
            outline_command(&input, format)?;
        }
        Commands::Backends { config } => {
            backends_command(config.as_deref())?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks warn, info or debug.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level.as_str())
    };

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the convert command
pub fn convert_command(args: &ConvertArgs) -> Result<()> {
    let text = args.format == OutputFormat::Text;
    if text {
        println!("pressmark v{}", pressmark_core::VERSION);
        println!("Converting: {}", args.input.display());
    }

    // Every caller error is reported before any work starts
    let source = read_input(&args.input)?;
    let settings = load_settings(&args.input, args.document.config.as_deref())?;
    let stylesheet = resolve_stylesheet(&args.document, &settings)?;
    let cover = resolve_cover(&args.input, &source, &args.document, &settings);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("pdf"));
    if output.with_extension("html") == output {
        anyhow::bail!(
            "Output {} would be overwritten by the kept HTML; use a .pdf extension",
            output.display()
        );
    }

    let names = if args.backends.is_empty() {
        settings.render.backends.clone()
    } else {
        args.backends.clone()
    };
    let engine = RenderEngine::from_names(&names, &BackendConfig::from_settings(&settings.render))
        .context("Invalid backend configuration")?;

    let mut options = RenderOptions::from_settings(&settings.render);
    if let Some(secs) = args.timeout {
        let budget = Duration::from_secs(secs);
        options = options.with_load_timeout(budget).with_process_timeout(budget);
    }

    if text {
        println!("  Backends: {}", engine.backend_names().join(", "));
    }

    let request = ConvertRequest {
        source: &source,
        cover,
        stylesheet: &stylesheet,
        output: output.clone(),
        keep_html: args.keep_html,
        base_dir: Some(input_dir(&args.input)),
    };
    let conversion = convert(&request, &engine, &options)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    if !text {
        let json = serde_json::json!({
            "input": args.input,
            "output": output,
            "html": conversion.html,
            "bytes": conversion.info.map(|i| i.bytes),
            "pages": conversion.info.and_then(|i| i.pages),
            "report": conversion.report,
        });
        let json = serde_json::to_string_pretty(&json).context("Failed to serialize report to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    let report = &conversion.report;
    println!();
    match &report.state {
        RunState::Succeeded { backend, output, bytes } => {
            println!("PDF created: {}", output.display());
            println!("  Size: {}", format_size(*bytes));
            if let Some(pages) = conversion.info.and_then(|i| i.pages) {
                println!("  Pages: {}", pages);
            }
            println!("  Backend: {}", backend);
            if let Some(html) = &conversion.html {
                println!("  HTML: {}", html.display());
            }
            if report.attempts.len() > 1 {
                println!("  Attempts:");
                println!("{}", report.attempt_table());
            }
        }
        RunState::AllFailed => {
            println!("No backend could produce the PDF.");
            if !report.attempts.is_empty() {
                println!("  Attempts:");
                println!("{}", report.attempt_table());
            }
            println!();
            let html = conversion
                .html
                .clone()
                .unwrap_or_else(|| request.html_path());
            println!("{}", manual_instructions(&html, &output));
        }
        RunState::Cancelled => {
            println!("Conversion cancelled after {} attempt(s).", report.attempts.len());
        }
    }

    Ok(())
}

/// Execute the html command
pub fn html_command(input: &Path, output: Option<&Path>, document: &DocumentArgs) -> Result<()> {
    println!("pressmark v{}", pressmark_core::VERSION);
    println!("Composing: {}", input.display());

    let source = read_input(input)?;
    let settings = load_settings(input, document.config.as_deref())?;
    let stylesheet = resolve_stylesheet(document, &settings)?;
    let cover = resolve_cover(input, &source, document, &settings);

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("html"),
    };

    let built = build_document(&source, &cover, &stylesheet);
    fs::write(&output_path, &built.document.html)
        .with_context(|| format!("Failed to write HTML file: {}", output_path.display()))?;

    println!("  Created: {}", output_path.display());
    let listed = built.outline.iter().filter(|e| e.is_toc_entry()).count();
    println!(
        "  {} headings, {} in the table of contents",
        built.outline.len(),
        listed
    );

    Ok(())
}

/// Execute the outline command
pub fn outline_command(input: &Path, format: OutputFormat) -> Result<()> {
    let source = read_input(input)?;
    let outline = extract_outline(&source);

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&outline).context("Failed to serialize outline to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if outline.is_empty() {
                println!("No headings found in {}", input.display());
            }
            for entry in &outline {
                let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
                println!("{}{}  #{}", indent, entry.title, entry.anchor);
            }
        }
    }

    Ok(())
}

/// Execute the backends command
pub fn backends_command(config: Option<&Path>) -> Result<()> {
    let settings = match config {
        Some(path) => load_config_file(path)?,
        None => Settings::discover(Path::new("."))
            .context("Failed to load pressmark.toml from the current directory")?,
    };

    let engine = RenderEngine::from_names(
        &settings.render.backends,
        &BackendConfig::from_settings(&settings.render),
    )
    .context("Invalid backend configuration")?;

    let status = engine.probe();
    let width = status.iter().map(|s| s.name.len()).max().unwrap_or(0);
    println!("Configured backends (in priority order):");
    for backend in &status {
        match &backend.hint {
            None => println!("  {:<width$}  available", backend.name, width = width),
            Some(hint) => println!(
                "  {:<width$}  unavailable  ({})",
                backend.name,
                hint,
                width = width
            ),
        }
    }

    let ready = status.iter().filter(|s| s.available).count();
    println!();
    println!("{} of {} backends available", ready, status.len());

    Ok(())
}

/// Directory containing the input, "." for a bare file name
fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read the markdown input, failing on a missing file
fn read_input(input: &Path) -> Result<String> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))
}

/// Settings from `--config`, else `pressmark.toml` beside the input
fn load_settings(input: &Path, config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => load_config_file(path),
        None => {
            Settings::discover(&input_dir(input))
                .with_context(|| format!("Failed to load configuration beside {}", input.display()))
        }
    }
}

fn load_config_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }
    Settings::load(path).with_context(|| format!("Failed to load configuration: {}", path.display()))
}

/// CSS from `--css`, the configuration, or the built-in stylesheet
fn resolve_stylesheet(document: &DocumentArgs, settings: &Settings) -> Result<String> {
    let path = document
        .css
        .as_ref()
        .or(settings.document.stylesheet.as_ref());

    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Stylesheet not found: {}", path.display());
            }
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read stylesheet: {}", path.display()))
        }
        None => Ok(DEFAULT_STYLESHEET.to_string()),
    }
}

/// Cover from flags, then configuration, then the document itself
fn resolve_cover(input: &Path, source: &str, document: &DocumentArgs, settings: &Settings) -> Cover {
    let title = document
        .title
        .clone()
        .or_else(|| settings.document.title.clone())
        .or_else(|| first_title(&extract_outline(source)).map(str::to_string))
        .unwrap_or_else(|| {
            input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Document".to_string())
        });

    let mut cover = Cover::new(title);
    if let Some(subtitle) = document
        .subtitle
        .clone()
        .or_else(|| settings.document.subtitle.clone())
    {
        cover = cover.with_subtitle(subtitle);
    }
    cover
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_flags_parse() {
        let cli = Cli::try_parse_from([
            "pressmark",
            "-vv",
            "convert",
            "guide.md",
            "-o",
            "out/guide.pdf",
            "--backend",
            "typst",
            "--backend",
            "chrome",
            "--title",
            "Guide",
            "--keep-html",
            "--timeout",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.backends, vec!["typst", "chrome"]);
        assert_eq!(args.output, Some(PathBuf::from("out/guide.pdf")));
        assert_eq!(args.document.title.as_deref(), Some("Guide"));
        assert!(args.keep_html);
        assert_eq!(args.timeout, Some(5));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_cover_precedence() {
        let settings = Settings::from_toml_str("[document]\ntitle = \"From Config\"\n").unwrap();
        let source = "# From Heading\n";
        let input = Path::new("notes.md");

        let flagged = DocumentArgs {
            title: Some("From Flag".to_string()),
            ..DocumentArgs::default()
        };
        assert_eq!(resolve_cover(input, source, &flagged, &settings).title, "From Flag");

        let plain = DocumentArgs::default();
        assert_eq!(resolve_cover(input, source, &plain, &settings).title, "From Config");
        assert_eq!(
            resolve_cover(input, source, &plain, &Settings::default()).title,
            "From Heading"
        );
        assert_eq!(
            resolve_cover(input, "no headings", &plain, &Settings::default()).title,
            "notes"
        );
    }

    #[test]
    fn test_default_stylesheet() {
        let css = resolve_stylesheet(&DocumentArgs::default(), &Settings::default()).unwrap();
        assert_eq!(css, DEFAULT_STYLESHEET);
    }

    #[test]
    fn test_missing_stylesheet_is_fatal() {
        let args = DocumentArgs {
            css: Some(PathBuf::from("/nonexistent/print.css")),
            ..DocumentArgs::default()
        };
        let err = resolve_stylesheet(&args, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("Stylesheet not found"));
    }
}

//! Integration tests for pressmark CLI
//!
//! These tests drive the command functions against files in a temporary
//! directory: caller errors, configuration lookup, and the AllFailed path
//! that leaves the HTML behind for manual conversion.

use std::fs;

use pressmark_cli::{convert_command, html_command, outline_command, ConvertArgs, DocumentArgs, OutputFormat};
use tempfile::TempDir;

const GUIDE: &str = "# Burrow\n\n## Getting Started\n\nInstall.\n\n### Details\n\nMore.\n";

fn write_guide(dir: &TempDir) -> std::path::PathBuf {
    let input = dir.path().join("guide.md");
    fs::write(&input, GUIDE).unwrap();
    input
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let args = ConvertArgs {
        input: dir.path().join("absent.md"),
        ..ConvertArgs::default()
    };

    let err = convert_command(&args).unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
    assert!(!dir.path().join("absent.html").exists());
}

#[test]
fn test_unknown_backend_rejected_before_work() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    let args = ConvertArgs {
        input: input.clone(),
        backends: vec!["quill".to_string()],
        ..ConvertArgs::default()
    };

    let err = convert_command(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("Unknown backend: quill"));
    assert!(!input.with_extension("html").exists());
    assert!(!input.with_extension("pdf").exists());
}

#[test]
fn test_missing_configured_stylesheet_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    fs::write(
        dir.path().join("pressmark.toml"),
        "[document]\nstylesheet = \"missing.css\"\n",
    )
    .unwrap();

    let args = ConvertArgs {
        input,
        ..ConvertArgs::default()
    };
    let err = convert_command(&args).unwrap_err();
    assert!(err.to_string().contains("Stylesheet not found"));
}

#[test]
fn test_all_failed_is_not_fatal_and_keeps_html() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    // An empty chain can never succeed
    fs::write(dir.path().join("pressmark.toml"), "[render]\nbackends = []\n").unwrap();

    let args = ConvertArgs {
        input: input.clone(),
        ..ConvertArgs::default()
    };
    convert_command(&args).unwrap();

    assert!(!input.with_extension("pdf").exists());
    let html = fs::read_to_string(input.with_extension("html")).unwrap();
    assert!(html.contains("<h2 id=\"getting-started\">Getting Started</h2>"));
}

#[test]
fn test_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    let config = dir.path().join("ci.toml");
    fs::write(&config, "[render]\nbackends = []\n").unwrap();

    let args = ConvertArgs {
        input: input.clone(),
        output: Some(dir.path().join("out.pdf")),
        document: DocumentArgs {
            config: Some(config),
            ..DocumentArgs::default()
        },
        format: OutputFormat::Json,
        ..ConvertArgs::default()
    };
    convert_command(&args).unwrap();

    assert!(dir.path().join("out.html").exists());
}

#[test]
fn test_html_command_uses_flags() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    let css = dir.path().join("print.css");
    fs::write(&css, "body { color: #123456; }").unwrap();
    let output = dir.path().join("composed.html");

    let document = DocumentArgs {
        css: Some(css),
        title: Some("Handbook".to_string()),
        subtitle: Some("Internal".to_string()),
        config: None,
    };
    html_command(&input, Some(&output), &document).unwrap();

    let html = fs::read_to_string(output).unwrap();
    assert!(html.contains("color: #123456"));
    assert!(html.contains("<h1>Handbook</h1>"));
    assert!(html.contains("Internal"));
    assert!(html.contains("href=\"#getting-started\""));
    assert!(!html.contains("href=\"#details\""));
}

#[test]
fn test_outline_command() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    outline_command(&input, OutputFormat::Json).unwrap();
    outline_command(&input, OutputFormat::Text).unwrap();
    assert!(outline_command(&dir.path().join("none.md"), OutputFormat::Text).is_err());
}

#[test]
fn test_html_output_name_rejected_before_work() {
    let dir = TempDir::new().unwrap();
    let input = write_guide(&dir);
    let args = ConvertArgs {
        input,
        output: Some(dir.path().join("guide-out.html")),
        keep_html: true,
        ..ConvertArgs::default()
    };

    let err = convert_command(&args).unwrap_err();
    assert!(err.to_string().contains("would be overwritten by the kept HTML"));
    assert!(!dir.path().join("guide-out.html").exists());
}

//! resume-render CLI: export a resume document to PDF or DOCX
//!
//! Run with: cargo run --features cli -- resume.json --format docx --template modern

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use resume_render::{render_with, Format, ResourcePool, ResumeDocument, StyleConfig, Template};

#[derive(Parser, Debug)]
#[command(name = "resume-render")]
#[command(version)]
#[command(about = "Render a JSON resume document to PDF or DOCX", long_about = None)]
struct Cli {
    /// Input resume document (JSON)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format: pdf or docx
    #[arg(short, long, default_value = "pdf")]
    format: Format,

    /// Template id, overriding the document's own
    #[arg(short, long)]
    template: Option<String>,

    /// Style settings (TOML) replacing the document's saved style
    #[arg(short, long, value_name = "FILE")]
    style: Option<PathBuf>,

    /// Output file (defaults to the input name with the format's extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List the built-in templates and exit
    #[arg(long)]
    list_templates: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("resume_render=info"))
        .init();

    let cli = Cli::parse();

    if cli.list_templates {
        for template in Template::all() {
            let defaults = template.defaults();
            println!(
                "{:<10} {} column(s), accent {}",
                template.id(),
                defaults.layout.columns,
                defaults.theme.accent_color
            );
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(path) => {
            println!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf, String> {
    let input = cli
        .input
        .as_deref()
        .ok_or_else(|| "no input file given (see --help)".to_string())?;

    let json = fs::read_to_string(input)
        .map_err(|e| format!("cannot read {}: {e}", input.display()))?;
    let mut doc = ResumeDocument::from_json(&json).map_err(|e| e.to_string())?;

    if let Some(style_path) = &cli.style {
        let toml = fs::read_to_string(style_path)
            .map_err(|e| format!("cannot read {}: {e}", style_path.display()))?;
        doc.metadata.style = StyleConfig::from_toml(&toml).map_err(|e| e.to_string())?;
    }

    if let Some(id) = cli.template.as_deref() {
        if Template::try_from_id(id).is_none() {
            log::warn!("unknown template {id:?}, rendering with {}", Template::DEFAULT.id());
        }
    }

    let bytes = render_with(&doc, cli.template.as_deref(), cli.format, &ResourcePool::new())
        .map_err(|e| e.to_string())?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(input, cli.format));
    fs::write(&output, &bytes).map_err(|e| format!("cannot write {}: {e}", output.display()))?;
    Ok(output)
}

fn default_output(input: &Path, format: Format) -> PathBuf {
    input.with_extension(format.extension())
}

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use resume_pdf::{RenderConfig, TemplateId, export_text, export_visual, normalize_str};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Image-backed pages with clickable links
    Visual,
    /// Selectable vector text
    Text,
    Both,
}

#[derive(Parser)]
#[command(name = "resume-pdf")]
#[command(version)]
#[command(about = "Render a résumé record (JSON) to PDF", long_about = None)]
struct Cli {
    /// Résumé record as JSON
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value = "visual")]
    mode: Mode,

    /// Overrides the record's template (harvard, classic, modern, minimal)
    #[arg(short, long)]
    template: Option<String>,

    /// Overrides the record's compact setting
    #[arg(long)]
    compact: bool,

    /// Record id used in the visual export's file name
    #[arg(long)]
    id: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> resume_pdf::Result<()> {
    let json = std::fs::read_to_string(&cli.input)?;
    let mut record = normalize_str(&json)?;
    if let Some(name) = &cli.template {
        record.template = TemplateId::resolve(name);
    }
    if cli.compact {
        record.compact_mode = true;
    }

    std::fs::create_dir_all(&cli.output)?;

    if matches!(cli.mode, Mode::Visual | Mode::Both) {
        let export = export_visual(&record, cli.id.as_deref(), &RenderConfig::from_env())?;
        let path = export.write_to(&cli.output)?;
        println!("Wrote {}", path.display());
    }
    if matches!(cli.mode, Mode::Text | Mode::Both) {
        let path = export_text(&record).write_to(&cli.output)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use pbireport::config::GeneratorConfig;
use pbireport::error::ReportError;
use pbireport::GenerationSummary;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pbireport")]
#[command(about = "Generate the procedure online-availability report definition (report.json)", long_about = None)]
struct Args {
    /// Generator settings as JSON (output path, theme, palette, canvas)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Destination report.json; overrides the config file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build and validate only, write nothing
    #[arg(long)]
    check: bool,
}

fn print_summary(summary: &GenerationSummary) {
    match &summary.path {
        Some(path) => println!("Wrote: {}", path.display()),
        None => println!("Check only, nothing written"),
    }
    println!("  Pages: {}", summary.pages.len());
    for (i, page) in summary.pages.iter().enumerate() {
        println!("  Page {} '{}': {} visuals", i + 1, page.display_name, page.visuals);
    }
    println!("  JSON size: {} bytes", summary.bytes);
    println!("  All embedded JSON validated OK.");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(output) = args.output {
        config = config.with_output(output);
    }

    let result = if args.check {
        pbireport::check(&config)
    } else {
        pbireport::generate(&config)
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(ReportError::Validation(violations)) => {
            eprintln!("VALIDATION ERRORS:");
            for v in &violations {
                eprintln!("  - {}", v);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to generate report"),
    };

    print_summary(&summary);
    Ok(())
}

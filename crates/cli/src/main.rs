use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use shuttergen_core::metadata::DESCRIPTION_LIMIT;
use shuttergen_core::{Config, CopyTarget, GeneratedMetadata, Overrides, ShutterGen, clipboard, init};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate stock photo titles, descriptions and keywords with Gemini", long_about = None)]
struct Args {
    /// Photo to analyze (preloaded into the window unless --headless)
    image: Option<PathBuf>,

    /// Override the model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Print the metadata to the terminal instead of opening a window
    #[arg(long, requires = "image")]
    headless: bool,

    /// Print the metadata as JSON (headless only)
    #[arg(long, requires = "headless")]
    json: bool,

    /// Copy one field to the clipboard after generating (headless only)
    #[arg(short, long, value_enum, requires = "headless")]
    copy: Option<CopyField>,

    /// Accept any readable file regardless of size or type
    #[arg(long)]
    no_upload_limits: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CopyField {
    Title,
    Description,
    Keywords,
}

impl From<CopyField> for CopyTarget {
    fn from(field: CopyField) -> Self {
        match field {
            CopyField::Title => CopyTarget::Title,
            CopyField::Description => CopyTarget::Description,
            CopyField::Keywords => CopyTarget::Keywords,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup
    init();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    // The window lets the key be entered in Settings, so only headless mode requires it up front
    let config = if args.headless {
        Config::load().context("Failed to load configuration")?
    } else {
        Config::load_lenient().context("Failed to load configuration")?
    };
    let overrides = Overrides {
        model: args.model.clone(),
        enforce_upload_limits: args.no_upload_limits.then_some(false),
    };

    let app = ShutterGen::with_config(config).with_overrides(overrides);

    if args.headless {
        if let Some(path) = &args.image {
            return run_headless(&app, path, &args).await;
        }
    }

    let initial_image = match &args.image {
        Some(path) => Some(
            app.load_image(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => None,
    };

    tracing::info!(model = %app.effective_config().model_name, "starting ShutterGen");
    app.run_interactive(initial_image)?;
    Ok(())
}

async fn run_headless(app: &ShutterGen, path: &Path, args: &Args) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Analyzing photo with {}...", app.effective_config().model_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = app.analyze_path(path).await;
    spinner.finish_and_clear();

    let metadata = result.with_context(|| format!("Failed to generate metadata for {}", path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        print_metadata(&metadata);
    }

    // Copy to clipboard if requested
    if let Some(field) = args.copy {
        match clipboard::copy_text(&metadata.copy_text(field.into())) {
            Ok(()) => eprintln!("(Copied {:?} to clipboard)", field),
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    Ok(())
}

fn print_metadata(metadata: &GeneratedMetadata) {
    println!("Title / Caption");
    println!("  {}", metadata.title);
    println!();

    println!(
        "Description ({} / {} characters)",
        metadata.description_len(),
        DESCRIPTION_LIMIT
    );
    println!("  {}", metadata.description);
    if metadata.description_exceeds_limit() {
        eprintln!(
            "Warning: description is longer than {} characters",
            DESCRIPTION_LIMIT
        );
    }
    println!();

    println!("Keywords ({})", metadata.keywords.len());
    println!("  {}", metadata.keywords_text());
}

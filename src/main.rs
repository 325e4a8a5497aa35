use clap::Parser;
use imgtidy::config::{self, TidyConfig};
use imgtidy::imaging::{OrientationSupport, RustBackend};
use imgtidy::normalize::{Normalizer, Policy};
use imgtidy::{output, process};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgtidy")]
#[command(about = "Strip image metadata and shrink images for README usage")]
#[command(long_about = "\
Strip image metadata and shrink images for README usage

Every .jpg, .jpeg, .png and .webp file in the directory is checked. Files that
carry metadata (EXIF, color profiles, text chunks, ...) or are larger than the
bounding box are re-encoded in place; all others are left untouched.

  CHANGED images/hero.jpg: stripped metadata, resized 3000x2000 -> 1600x1067
  OK images/logo.png: ok (no changes needed)

  Done. changed=1, ok=1, errors=0, total=2

Run 'imgtidy --gen-config' to print a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Folder containing images
    #[arg(default_value = "images")]
    path: PathBuf,

    /// Max width/height in pixels [default: 1600]
    #[arg(long)]
    max_size: Option<u32>,

    /// JPEG/WebP quality, 1-100 [default: 85]
    #[arg(long)]
    quality: Option<u32>,

    /// Disable encoder optimizations
    #[arg(long)]
    no_optimize: bool,

    /// Disable progressive JPEG
    #[arg(long)]
    no_progressive: bool,

    /// Show what would change without writing files
    #[arg(long)]
    dry_run: bool,

    /// Process images recursively
    #[arg(long)]
    recursive: bool,

    /// TOML config file; flags given on the command line win over it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a stock config file with all options documented, then exit
    #[arg(long)]
    gen_config: bool,

    /// Log per-file decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer command-line values on top of the file/stock config.
    fn apply_to(&self, config: &mut TidyConfig) {
        if let Some(max_size) = self.max_size {
            config.max_size = max_size.max(1);
        }
        if let Some(quality) = self.quality {
            config.quality = quality.clamp(1, 100);
        }
        if self.no_optimize {
            config.optimize = false;
        }
        if self.no_progressive {
            config.progressive = false;
        }
        if self.recursive {
            config.recursive = true;
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "imgtidy=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => TidyConfig::default(),
    };
    cli.apply_to(&mut config);

    let orientation = OrientationSupport::detect();
    if orientation == OrientationSupport::Unavailable {
        warn!("built without EXIF orientation support; rotated photos keep their stored orientation");
    }

    let normalizer = Normalizer::new(
        RustBackend::new(),
        Policy::from_config(&config, cli.dry_run),
        orientation,
    );
    let summary = process::process_directory(&normalizer, &cli.path, output::print_report)?;

    if summary.total == 0 {
        output::print_no_images(&cli.path);
    } else {
        output::print_summary(&summary);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

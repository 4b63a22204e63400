use clap::{Parser, Subcommand};
use firmware_page::config::{self, SiteConfig};
use firmware_page::publish::{self, Layout};
use firmware_page::{output, render};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "firmware-page")]
#[command(about = "Build the static firmware download page")]
#[command(long_about = "\
Build the static firmware download page

For each product, the lexicographically greatest file matching its pattern is
published, so firmware versions must be zero-padded (v010 > v009).

Source structure:

  oxocard_binaries/
  ├── common/
  │   ├── bootloader.bin             # Shared by all products
  │   └── partition-table.bin
  ├── artwork/
  │   ├── oxocard_mini_artwork_v011.bin
  │   └── oxocard_mini_artwork_v012.bin   # Published
  └── connect/                       # Directories can hold several products
      ├── oxocard_mini_connect_v005.bin
      └── oxocard_mini_connect_make_v002.bin

Output:

  webpage/
  ├── index.html                     # templates/index.html
  ├── manifest_artwork.json          # templates/manifest.json, per product
  └── firmware/
      ├── common/{bootloader,partition-table}.bin
      └── oxocard_mini_artwork_v012.bin

Run 'firmware-page gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file; stock Oxocard products are used when it is absent
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Firmware source directory (overrides `source_root`)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides `output_root`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Templates directory (overrides `templates_dir`)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Log every copy and candidate list
    #[arg(long, global = true, conflicts_with = "quiet")]
    debug: bool,

    /// Only log warnings and errors, skip the summary
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Copy the latest firmware and render manifests and index
    Build,
    /// Validate config, templates and sources without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", error_chain(&*err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Build => {
            let site = load_site_config(cli)?;
            let layout = Layout::new(&site.source_root, &site.output_root);
            let templates = render::Templates::load(&site.templates_dir)?;

            info!("Building webpage...");
            let report = publish::publish(&layout, &templates, &site.products)?;
            if !cli.quiet {
                output::print_publish_output(&report, &layout);
            }
            info!("Build finished.");
        }
        Command::Check => {
            let site = load_site_config(cli)?;
            let layout = Layout::new(&site.source_root, &site.output_root);
            render::Templates::load(&site.templates_dir)?;

            info!("Checking {}", layout.source_root.display());
            let report = publish::check(&layout, &site.products)?;
            if !cli.quiet {
                output::print_check_output(&report, &layout);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply the command-line path overrides.
fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    if cli.config.exists() {
        debug!("Loading {}", cli.config.display());
    } else {
        debug!(
            "{} not found, using stock products",
            cli.config.display()
        );
    }
    let mut site = config::load_config(&cli.config)?;

    if let Some(source) = &cli.source {
        site.source_root = source.clone();
    }
    if let Some(output) = &cli.output {
        site.output_root = output.clone();
    }
    if let Some(templates) = &cli.templates {
        site.templates_dir = templates.clone();
    }
    Ok(site)
}

/// Set up the fmt subscriber; `FIRMWARE_PAGE_LOG` overrides the flags.
fn init_tracing(debug: bool, quiet: bool) {
    let level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        std::env::var("FIRMWARE_PAGE_LOG").unwrap_or_else(|_| format!("firmware_page={level}"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}

/// Render an error with its causes, skipping causes already in the message.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str("\n  caused by: ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

//! CLI entry point for matterlint

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matterlint::content::Delimiter;

#[derive(Parser)]
#[command(name = "matterlint")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Check front-matter of static site content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderFormat {
    /// `+++` fenced TOML
    Toml,
    /// `---` fenced YAML
    Yaml,
}

impl From<HeaderFormat> for Delimiter {
    fn from(format: HeaderFormat) -> Self {
        match format {
            HeaderFormat::Toml => Delimiter::Toml,
            HeaderFormat::Yaml => Delimiter::Yaml,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every document and report problems
    #[command(alias = "c")]
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// List site information
    List {
        /// Type of content to list (post, draft, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Write publish-ready documents as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include drafts
        #[arg(long)]
        drafts: bool,
    },

    /// Create a new document
    New {
        /// Title of the new document
        title: String,

        /// Front-matter format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: HeaderFormat,

        /// File name (without extension) for the new document
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "matterlint=debug,info"
    } else {
        "matterlint=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Check { strict } => {
            let site = matterlint::Site::new(&base_dir)?;
            let strict = strict || site.config.strict;
            tracing::info!("Checking {:?}", site.content_dir);
            let report = matterlint::commands::check::run(&site, strict)?;
            if report.has_errors(strict) {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::List { r#type } => {
            let site = matterlint::Site::new(&base_dir)?;
            matterlint::commands::list::run(&site, &r#type)?;
        }

        Commands::Export { output, drafts } => {
            let site = matterlint::Site::new(&base_dir)?;
            matterlint::commands::export::run(&site, output.as_deref(), drafts)?;
        }

        Commands::New {
            title,
            format,
            path,
        } => {
            let site = matterlint::Site::new(&base_dir)?;
            tracing::info!("Creating new document with title: {}", title);
            matterlint::commands::new::run(&site, &title, format.into(), path.as_deref())?;
        }

        Commands::Version => {
            println!("matterlint version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(ExitCode::SUCCESS)
}

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use seofix::cli::fix::FixOptions;
use seofix::Result;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seofix")]
#[command(author = "Chris Cheng <chris.cheng@shopee.com>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Block-addressable SEO scoring with LLM-driven auto-fix", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log analyzer and fix-loop decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an article and list its issues
    Score {
        /// Article JSON file
        article: PathBuf,

        /// Industry whose threshold overrides apply
        #[arg(short, long)]
        industry: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Iteratively rewrite the article until it reaches the target score
    Fix {
        /// Article JSON file
        article: PathBuf,

        /// Write the fixed article JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum fix rounds (overrides seofix.toml)
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Target score (overrides seofix.toml)
        #[arg(long)]
        min_score: Option<f64>,

        /// Industry whose threshold overrides apply
        #[arg(short, long)]
        industry: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write seofix.toml and editable scoring tables in the current directory
    Init {
        /// Overwrite the scoring tables if already initialized
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "seofix=debug" } else { "seofix=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: Failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score {
            article,
            industry,
            json,
        } => {
            seofix::cli::score::run(&article, industry.as_deref(), json)?;
        }

        Commands::Fix {
            article,
            output,
            max_iterations,
            min_score,
            industry,
            json,
        } => {
            let options = FixOptions {
                industry: industry.as_deref(),
                output: output.as_deref(),
                max_iterations,
                min_score,
                json,
            };
            seofix::cli::fix::run(&article, options).await?;
        }

        Commands::Init { force } => {
            seofix::cli::init::run(force)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "seofix", &mut io::stdout());
        }
    }

    Ok(())
}

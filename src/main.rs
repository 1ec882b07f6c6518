use clap::{Parser, Subcommand};
use ragdex::commands::{build, init_config, query, serve, show_config, show_status};
use ragdex::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragdex")]
#[command(about = "Retrieval-augmented generation over local text corpora")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vector index and chunk store from a folder of .txt documents
    Build {
        /// Folder containing plain-text documents
        docs_dir: PathBuf,
    },
    /// Run a single query against the built index
    Query {
        /// The question to retrieve context for
        text: String,
        /// Number of chunks to retrieve (defaults to the configured top_k)
        #[arg(long)]
        top_k: Option<usize>,
        /// Also generate an answer with the completion endpoint
        #[arg(long)]
        answer: bool,
    },
    /// Serve queries interactively, one per line on stdin
    Serve {
        /// Also generate an answer for each query
        #[arg(long)]
        answer: bool,
    },
    /// Inspect or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Show the state of the built index and chunk store
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { docs_dir } => {
            build(&docs_dir)?;
        }
        Commands::Query {
            text,
            top_k,
            answer,
        } => {
            query(&text, top_k, answer)?;
        }
        Commands::Serve { answer } => {
            serve(answer)?;
        }
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                init_config()?;
            }
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}

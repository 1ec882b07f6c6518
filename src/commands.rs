use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{error, info};

use crate::completion::CompletionClient;
use crate::config::{get_config_dir, Config, EmbeddingBackend};
use crate::embeddings::OllamaEmbedder;
use crate::indexer::build_corpus;
use crate::prompt::build_prompt;
use crate::retriever::Retriever;
use crate::store::FlatIndex;

/// Build the index and chunk store from a folder of text documents
#[inline]
pub fn build(docs_dir: &Path) -> Result<()> {
    let config = load_config()?;

    info!("Building corpus from {}", docs_dir.display());

    // Preflight the local backend so a dead server fails fast with a clear
    // message instead of midway through the embedding pass.
    if config.embedding.backend == EmbeddingBackend::Ollama {
        OllamaEmbedder::new(&config)?
            .health_check()
            .context("Ollama health check failed")?;
    }

    let stats = build_corpus(&config, docs_dir)?;

    println!("Index built successfully!");
    println!("  Documents: {}", stats.documents);
    println!("  Chunks: {}", stats.chunks);
    println!("  Dimension: {}", stats.dimension);
    println!("  Index: {}", config.index_path().display());
    println!("  Chunk store: {}", config.chunks_path().display());

    Ok(())
}

/// Run a single query against the loaded index
#[inline]
pub fn query(text: &str, top_k: Option<usize>, answer: bool) -> Result<()> {
    let config = load_config()?;
    let retriever = Retriever::open(&config)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let chunks = retriever.retrieve(text, top_k)?;

    if chunks.is_empty() {
        println!("No chunks retrieved.");
        return Ok(());
    }

    println!("Top {} chunks:", chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        println!("{}. [score {:.4}] {}", i + 1, chunk.score, chunk.text);
    }

    if answer {
        let client = CompletionClient::new(&config)?;
        let prompt = build_prompt(&chunks, text);
        let response = client.generate(&prompt)?;
        println!();
        println!("Answer: {response}");
    }

    Ok(())
}

/// Long-lived serving loop: one query per stdin line.
///
/// Per-query failures are printed and the loop continues; they never tear
/// down the process or the loaded index.
#[inline]
pub fn serve(answer: bool) -> Result<()> {
    let config = load_config()?;
    let retriever = Retriever::open(&config)?;
    let completion = if answer {
        Some(CompletionClient::new(&config)?)
    } else {
        None
    };

    println!(
        "Serving queries over {} chunks (empty line to exit)",
        retriever.chunk_count()
    );

    let stdin = io::stdin();
    loop {
        print!("query> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query_text = line.trim();
        if query_text.is_empty() {
            break;
        }

        match serve_one(&retriever, completion.as_ref(), query_text, &config) {
            Ok(()) => {}
            Err(e) => {
                error!("Query failed: {e}");
                println!("Query failed: {e}");
            }
        }
    }

    Ok(())
}

fn serve_one(
    retriever: &Retriever,
    completion: Option<&CompletionClient>,
    query_text: &str,
    config: &Config,
) -> Result<()> {
    let chunks = retriever.retrieve(query_text, config.retrieval.top_k)?;

    for (i, chunk) in chunks.iter().enumerate() {
        println!("{}. [score {:.4}] {}", i + 1, chunk.score, chunk.text);
    }

    if let Some(client) = completion {
        let prompt = build_prompt(&chunks, query_text);
        let response = client.generate(&prompt)?;
        println!();
        println!("Answer: {response}");
    }

    Ok(())
}

/// Print the active configuration as TOML
#[inline]
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;

    println!("Config directory: {}", config.base_dir.display());
    println!();
    print!("{content}");

    Ok(())
}

/// Write a default config file if none exists yet
#[inline]
pub fn init_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config = Config::load(&config_dir)?;

    if config.config_file_path().exists() {
        println!(
            "Config already exists at {}",
            config.config_file_path().display()
        );
        return Ok(());
    }

    config.save()?;
    println!("Wrote default config to {}", config.config_file_path().display());

    Ok(())
}

/// Show the state of the built artifacts
#[inline]
pub fn show_status() -> Result<()> {
    let config = load_config()?;

    println!("Config directory: {}", config.base_dir.display());
    println!(
        "Embedding backend: {:?} ({}, {} dimensions)",
        config.embedding.backend, config.embedding.model, config.embedding.dimension
    );

    let index_path = config.index_path();
    if !index_path.exists() {
        println!("Index: not built (run `ragdex build <docs-dir>`)");
        return Ok(());
    }

    let index = FlatIndex::load(&index_path)?;
    println!(
        "Index: {} vectors, {} dimensions, {:?} metric ({})",
        index.len(),
        index.dimension(),
        index.metric(),
        index_path.display()
    );

    let chunks_path = config.chunks_path();
    if chunks_path.exists() {
        let chunks = crate::store::ChunkStore::load(&chunks_path)?;
        println!("Chunk store: {} chunks ({})", chunks.len(), chunks_path.display());
        if chunks.len() != index.len() {
            println!(
                "WARNING: chunk store and index sizes disagree ({} vs {})",
                chunks.len(),
                index.len()
            );
        }
    } else {
        println!("Chunk store: missing ({})", chunks_path.display());
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(config_dir)
}

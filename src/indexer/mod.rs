
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Config, EmbeddingBackend};
use crate::embeddings::{chunk_with_config, embedder_from_config, Embedder};
use crate::store::{ChunkStore, FlatIndex};
use crate::{RagError, Result};

/// Summary of a completed corpus build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
}

/// Build the index + chunk store pair from a folder of plain-text documents.
///
/// The build is all-or-nothing: both artifacts are written to temporary
/// files and moved into place only after both serialize successfully, so a
/// failed build never leaves a partial or mismatched pair behind.
#[inline]
pub fn build_corpus(config: &Config, docs_dir: &Path) -> Result<BuildStats> {
    let embedder = embedder_from_config(config)?;
    build_corpus_with(config, docs_dir, embedder.as_ref())
}

/// Same as [`build_corpus`] with an explicit embedder, for callers that
/// already constructed one.
#[inline]
pub fn build_corpus_with(
    config: &Config,
    docs_dir: &Path,
    embedder: &dyn Embedder,
) -> Result<BuildStats> {
    let documents = load_documents(docs_dir)?;
    info!("Loaded {} documents from {}", documents.len(), docs_dir.display());

    let mut texts = Vec::new();
    for (name, text) in &documents {
        let before = texts.len();
        for chunk in chunk_with_config(text, &config.chunking)?.with_source(name) {
            texts.push(chunk.text);
        }
        debug!("Document {} produced {} chunks", name, texts.len() - before);
    }

    if texts.is_empty() {
        return Err(RagError::Config(format!(
            "no chunks produced from {} (empty corpus?)",
            docs_dir.display()
        )));
    }

    let batch_size = match config.embedding.backend {
        EmbeddingBackend::Ollama => config.embedding.ollama.batch_size,
        EmbeddingBackend::Hosted => config.embedding.hosted.batch_size,
    };

    info!("Embedding {} chunks", texts.len());
    let vectors = embed_with_progress(embedder, &texts, batch_size)?;

    let index = FlatIndex::build(config.retrieval.metric, &vectors)?;
    let chunks = ChunkStore::from_chunks(texts);

    persist_artifacts(config, &index, &chunks)?;

    Ok(BuildStats {
        documents: documents.len(),
        chunks: chunks.len(),
        dimension: index.dimension(),
    })
}

/// Read every `*.txt` file in the folder, sorted by file name so chunk
/// ordering (and therefore row ids) is deterministic across rebuilds.
fn load_documents(dir: &Path) -> Result<Vec<(String, String)>> {
    if !dir.is_dir() {
        return Err(RagError::Config(format!(
            "document folder not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(RagError::Config(format!(
            "no .txt documents found in {}",
            dir.display()
        )));
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = fs::read_to_string(&path)?;
        documents.push((name, text));
    }

    Ok(documents)
}

fn embed_with_progress(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: u32,
) -> Result<Vec<Vec<f32>>> {
    let bar = ProgressBar::new(texts.len() as u64);
    let mut vectors = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size as usize) {
        vectors.extend(embedder.embed_batch(batch)?);
        bar.inc(batch.len() as u64);
    }

    bar.finish_and_clear();
    Ok(vectors)
}

/// Write both artifacts to temp files, then move them into place.
fn persist_artifacts(config: &Config, index: &FlatIndex, chunks: &ChunkStore) -> Result<()> {
    fs::create_dir_all(&config.base_dir)?;

    let index_path = config.index_path();
    let chunks_path = config.chunks_path();
    let index_tmp = index_path.with_extension("json.tmp");
    let chunks_tmp = chunks_path.with_extension("json.tmp");

    if let Err(err) = index
        .save(&index_tmp)
        .and_then(|()| chunks.save(&chunks_tmp))
    {
        let _ = fs::remove_file(&index_tmp);
        let _ = fs::remove_file(&chunks_tmp);
        return Err(err);
    }

    fs::rename(&index_tmp, &index_path)?;
    fs::rename(&chunks_tmp, &chunks_path)?;

    info!(
        "Persisted index to {} and chunk store to {}",
        index_path.display(),
        chunks_path.display()
    );
    Ok(())
}

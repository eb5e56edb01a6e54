use crate::cache::IndexCache;
use crate::error::{Result, RetrieverError};
use coach_vector_store::{sha256_hex, IndexStore, ScoredChunk, SearchIndex};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Chunks returned per query unless the caller asks otherwise.
pub const DEFAULT_TOP_K: usize = 3;

/// Cached indexes are trusted for a day before they are rebuilt.
pub const DEFAULT_INDEX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where the corpus lives, where its index persists, and how it is chunked.
#[derive(Clone, Debug)]
pub struct RetrieverConfig {
    pub corpus_path: PathBuf,
    pub index_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub index_ttl: Duration,

    /// Rebuild when the corpus on disk no longer matches the fingerprint
    /// stored with the index. Off by default: the corpus is treated as
    /// static between explicit reindex runs.
    pub refresh_on_corpus_change: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/interview_guide.txt"),
            index_dir: PathBuf::from("data/index"),
            chunk_size: 400,
            chunk_overlap: 80,
            index_ttl: DEFAULT_INDEX_TTL,
            refresh_on_corpus_change: false,
        }
    }
}

impl RetrieverConfig {
    #[must_use]
    pub fn new(corpus_path: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            index_dir: index_dir.into(),
            ..Self::default()
        }
    }
}

/// Serves context chunks for chat queries from a lazily built index.
///
/// The first query loads the persisted index, or builds and saves one from
/// the corpus when none exists. Later queries reuse the cached index until
/// its TTL lapses. Retrieval never interrupts a conversation: any failure is
/// logged and collapses to an empty context string.
pub struct Retriever {
    store: IndexStore,
    cache: Arc<IndexCache>,
    config: RetrieverConfig,
}

impl Retriever {
    /// Retriever backed by the process-wide cache.
    #[must_use]
    pub fn new(store: IndexStore, config: RetrieverConfig) -> Self {
        Self::with_cache(store, config, IndexCache::shared())
    }

    /// Retriever backed by a caller-owned cache. Tests use this to observe
    /// build counts in isolation.
    #[must_use]
    pub fn with_cache(store: IndexStore, config: RetrieverConfig, cache: Arc<IndexCache>) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// The `k` most relevant chunks joined into one prompt-ready string.
    ///
    /// This is the boundary the chat loop calls on every user turn, so it
    /// never fails: a blank query, a missing corpus, a corrupt index, or an
    /// embedding error all degrade to `""` and the conversation proceeds
    /// without retrieved context.
    pub async fn retrieve_context(&self, query: &str, k: usize) -> String {
        match self.try_retrieve(query, k).await {
            Ok(hits) => hits
                .iter()
                .map(|hit| hit.chunk.content.as_str())
                .filter(|content| !content.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(RetrieverError::CorpusNotFound(path)) => {
                log::warn!(
                    "Corpus file missing at {}; answering without retrieved context",
                    path.display()
                );
                String::new()
            }
            Err(e) => {
                log::warn!("Context retrieval failed, continuing without context: {e}");
                String::new()
            }
        }
    }

    /// Ranked chunks for `query`, with errors intact. Blank queries and
    /// `k == 0` return no chunks without touching the index.
    pub async fn try_retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(vec![]);
        }

        let index = self
            .cache
            .get_or_build(&self.config.index_dir, self.config.index_ttl, || {
                self.acquire()
            })
            .await?;

        let hits = self.store.search(&index, query, k).await?;
        log::debug!("Retrieved {} chunks for query", hits.len());
        Ok(hits)
    }

    /// Load the persisted index, or build and save one from the corpus.
    async fn acquire(&self) -> Result<SearchIndex> {
        if IndexStore::exists(&self.config.index_dir).await {
            let index = self.store.load(&self.config.index_dir).await?;
            if self.config.refresh_on_corpus_change {
                match self.read_corpus().await {
                    Ok(corpus) if sha256_hex(&corpus) != index.corpus_sha256() => {
                        log::info!("Corpus changed on disk, rebuilding index");
                        return self.rebuild_from(&corpus).await;
                    }
                    Ok(_) => {}
                    Err(e) => log::debug!("Skipping corpus staleness check: {e}"),
                }
            }
            return Ok(index);
        }

        let corpus = self.read_corpus().await?;
        self.rebuild_from(&corpus).await
    }

    async fn rebuild_from(&self, corpus: &str) -> Result<SearchIndex> {
        let index = self
            .store
            .build(corpus, self.config.chunk_size, self.config.chunk_overlap)
            .await?;
        self.store.save(&index, &self.config.index_dir).await?;
        Ok(index)
    }

    async fn read_corpus(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.config.corpus_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                RetrieverError::CorpusNotFound(self.config.corpus_path.clone()),
            ),
            Err(e) => Err(e.into()),
        }
    }
}

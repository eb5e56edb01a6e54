use crate::embeddings::Embedder;
use crate::error::{Result, VectorStoreError};
use crate::index::VectorIndex;
use crate::types::ScoredChunk;
use coach_text_chunker::{TextChunk, TextSplitter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

pub const INDEX_SCHEMA_VERSION: u32 = 1;

const INDEX_FILE_NAME: &str = "index.json";

/// Builds, persists, and reloads search indexes with a shared embedder.
pub struct IndexStore {
    embedder: Arc<Embedder>,
}

/// In-memory index over one corpus: chunk texts plus their vectors.
#[derive(Debug)]
pub struct SearchIndex {
    chunks: Vec<TextChunk>,
    vectors: VectorIndex,
    model_id: String,
    corpus_sha256: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    schema_version: u32,
    model_id: String,
    dimension: usize,
    corpus_sha256: String,
    chunks: Vec<TextChunk>,
    vectors: Vec<Vec<f32>>,
}

impl SearchIndex {
    /// Up to `k` chunks ranked by ascending distance to the query vector.
    pub fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let neighbors = self.vectors.search(query, k)?;
        Ok(neighbors
            .into_iter()
            .filter_map(|(position, distance)| {
                self.chunks.get(position).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    distance,
                })
            })
            .collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// SHA-256 of the corpus this index was built from.
    #[must_use]
    pub fn corpus_sha256(&self) -> &str {
        &self.corpus_sha256
    }
}

impl IndexStore {
    #[must_use]
    pub fn new(embedder: Arc<Embedder>) -> Self {
        Self { embedder }
    }

    #[must_use]
    pub fn embedder(&self) -> &Arc<Embedder> {
        &self.embedder
    }

    /// Split the corpus and embed every chunk in one batch call.
    pub async fn build(
        &self,
        corpus: &str,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<SearchIndex> {
        let splitter = TextSplitter::new(chunk_size, chunk_overlap)?;
        let chunks = splitter.split(corpus);
        log::info!(
            "Building index: {} chunks (chunk_size {}, overlap {})",
            chunks.len(),
            chunk_size,
            chunk_overlap
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(texts).await?;

        let mut vectors = VectorIndex::new(self.embedder.dimension());
        for vector in embeddings {
            vectors.add(vector)?;
        }

        Ok(SearchIndex {
            chunks,
            vectors,
            model_id: self.embedder.model_id().to_string(),
            corpus_sha256: sha256_hex(corpus),
        })
    }

    /// Embed the query and rank chunks against it.
    pub async fn search(
        &self,
        index: &SearchIndex,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let query_vector = self.embedder.embed_query(query).await?;
        index.search_vector(&query_vector, k)
    }

    /// Persist the index to a directory, creating parents as needed and
    /// overwriting prior contents. The payload is staged in a sibling
    /// directory and renamed into place, so a concurrent reader never
    /// observes a half-written index.
    pub async fn save(&self, index: &SearchIndex, dir: &Path) -> Result<()> {
        let persisted = PersistedIndex {
            schema_version: INDEX_SCHEMA_VERSION,
            model_id: index.model_id.clone(),
            dimension: index.vectors.dimension(),
            corpus_sha256: index.corpus_sha256.clone(),
            chunks: index.chunks.clone(),
            vectors: index.vectors.to_rows(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;

        if let Some(parent) = dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = staging_dir(dir);
        if tokio::fs::metadata(&staging).await.is_ok() {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        tokio::fs::create_dir_all(&staging).await?;
        tokio::fs::write(staging.join(INDEX_FILE_NAME), bytes).await?;

        if tokio::fs::metadata(dir).await.is_ok() {
            tokio::fs::remove_dir_all(dir).await?;
        }
        tokio::fs::rename(&staging, dir).await?;

        log::info!(
            "Saved index to {} ({} chunks)",
            dir.display(),
            index.chunks.len()
        );
        Ok(())
    }

    /// Reload a persisted index. A missing directory and an unusable payload
    /// are distinct failures: callers rebuild on the former and surface the
    /// latter.
    pub async fn load(&self, dir: &Path) -> Result<SearchIndex> {
        if tokio::fs::metadata(dir).await.is_err() {
            return Err(VectorStoreError::IndexMissing(dir.to_path_buf()));
        }

        let path = dir.join(INDEX_FILE_NAME);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| VectorStoreError::corrupt(dir, format!("missing {INDEX_FILE_NAME}: {e}")))?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)
            .map_err(|e| VectorStoreError::corrupt(dir, format!("unreadable payload: {e}")))?;

        if persisted.schema_version != INDEX_SCHEMA_VERSION {
            return Err(VectorStoreError::corrupt(
                dir,
                format!(
                    "unsupported schema_version {} (expected {INDEX_SCHEMA_VERSION})",
                    persisted.schema_version
                ),
            ));
        }
        if persisted.model_id != self.embedder.model_id() {
            return Err(VectorStoreError::corrupt(
                dir,
                format!(
                    "built with model '{}' but embedder is '{}'",
                    persisted.model_id,
                    self.embedder.model_id()
                ),
            ));
        }
        if persisted.dimension != self.embedder.dimension() {
            return Err(VectorStoreError::corrupt(
                dir,
                format!(
                    "dimension {} does not match embedder dimension {}",
                    persisted.dimension,
                    self.embedder.dimension()
                ),
            ));
        }
        if persisted.chunks.len() != persisted.vectors.len() {
            return Err(VectorStoreError::corrupt(
                dir,
                format!(
                    "{} chunks but {} vectors",
                    persisted.chunks.len(),
                    persisted.vectors.len()
                ),
            ));
        }

        let mut vectors = VectorIndex::new(persisted.dimension);
        for vector in persisted.vectors {
            vectors
                .add(vector)
                .map_err(|e| VectorStoreError::corrupt(dir, e.to_string()))?;
        }

        log::info!(
            "Loaded index from {} ({} chunks)",
            dir.display(),
            persisted.chunks.len()
        );
        Ok(SearchIndex {
            chunks: persisted.chunks,
            vectors,
            model_id: persisted.model_id,
            corpus_sha256: persisted.corpus_sha256,
        })
    }

    /// True iff the directory exists and holds at least one entry.
    pub async fn exists(dir: &Path) -> bool {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return false;
        };
        matches!(entries.next_entry().await, Ok(Some(_)))
    }
}

fn staging_dir(dir: &Path) -> std::path::PathBuf {
    dir.with_extension("staging")
}

/// Hex SHA-256 of the corpus text, stored with the index for staleness
/// checks.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbedderConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn hashed_store() -> IndexStore {
        let embedder = Embedder::load(&EmbedderConfig::hashed()).expect("hashed backend loads");
        IndexStore::new(Arc::new(embedder))
    }

    const GUIDE: &str =
        "The capital of France is Paris. Python is a programming language.";

    #[tokio::test]
    async fn build_embeds_all_chunks_in_one_batch() {
        let store = hashed_store();
        let index = store.build(GUIDE, 40, 10).await.unwrap();

        assert!(index.len() >= 2);
        assert_eq!(store.embedder().hashed_batch_calls(), Some(1));
        assert_eq!(index.model_id(), "hashed");
        assert_eq!(index.corpus_sha256(), sha256_hex(GUIDE));
    }

    #[tokio::test]
    async fn build_on_empty_corpus_yields_empty_index() {
        let store = hashed_store();
        let index = store.build("", 40, 10).await.unwrap();

        assert!(index.is_empty());
        let results = store.search(&index, "anything", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn build_rejects_overlap_at_chunk_size() {
        let store = hashed_store();
        let err = store.build(GUIDE, 10, 10).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Chunker(_)));
    }

    #[tokio::test]
    async fn search_returns_at_most_k_in_distance_order() {
        let store = hashed_store();
        let index = store.build(GUIDE, 20, 5).await.unwrap();
        let total = index.len();

        let results = store.search(&index, "paris", total + 10).await.unwrap();
        assert_eq!(results.len(), total);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }

        let top = store.search(&index, "paris", 1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn exists_distinguishes_missing_empty_and_populated() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index");

        assert!(!IndexStore::exists(&dir).await);

        tokio::fs::create_dir_all(&dir).await.unwrap();
        assert!(!IndexStore::exists(&dir).await);

        tokio::fs::write(dir.join(INDEX_FILE_NAME), b"{}").await.unwrap();
        assert!(IndexStore::exists(&dir).await);
    }

    #[tokio::test]
    async fn load_missing_directory_is_not_corrupt() {
        let tmp = TempDir::new().unwrap();
        let store = hashed_store();

        let err = store.load(&tmp.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::IndexMissing(_)));
    }

    #[tokio::test]
    async fn load_garbage_payload_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(INDEX_FILE_NAME), b"not json at all")
            .await
            .unwrap();

        let store = hashed_store();
        let err = store.load(&dir).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::IndexCorrupt { .. }));
    }

    #[tokio::test]
    async fn load_rejects_schema_version_drift() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index");
        let store = hashed_store();

        let index = store.build(GUIDE, 40, 10).await.unwrap();
        store.save(&index, &dir).await.unwrap();

        let path = dir.join(INDEX_FILE_NAME);
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let bumped = raw.replacen("\"schema_version\": 1", "\"schema_version\": 99", 1);
        tokio::fs::write(&path, bumped).await.unwrap();

        let err = store.load(&dir).await.unwrap_err();
        assert!(err.to_string().contains("schema_version"));
    }

    #[tokio::test]
    async fn save_is_idempotent_and_leaves_no_staging_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("index");
        let store = hashed_store();
        let index = store.build(GUIDE, 40, 10).await.unwrap();

        store.save(&index, &dir).await.unwrap();
        store.save(&index, &dir).await.unwrap();

        assert!(IndexStore::exists(&dir).await);
        assert!(tokio::fs::metadata(staging_dir(&dir)).await.is_err());
    }
}

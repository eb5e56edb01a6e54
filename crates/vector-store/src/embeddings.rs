use crate::error::{Result, VectorStoreError};
use fastembed::{EmbeddingModel as FastembedModel, InitOptions, TextEmbedding};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::spawn_blocking;

/// Default model: the same MiniLM sentence encoder the study corpus was
/// tuned against.
pub const DEFAULT_MODEL_ID: &str = "all-minilm-l6-v2";

/// Deterministic offline backend for tests and air-gapped runs.
pub const HASHED_MODEL_ID: &str = "hashed";

/// BGE models encode queries behind an instruction prefix.
const BGE_QUERY_PREFIX: &str = "Represent this sentence for searching relevant passages: ";

const HASHED_DIMENSION: usize = 384;

/// Embedder configuration. The model id is supplied by configuration so call
/// sites never hardcode it.
#[derive(Clone, Debug)]
pub struct EmbedderConfig {
    /// Model identifier, e.g. `all-minilm-l6-v2`, `bge-small-en-v1.5`, or
    /// `hashed`.
    pub model: String,

    /// Cache directory for downloaded model assets. `None` uses the
    /// fastembed default.
    pub cache_dir: Option<PathBuf>,

    /// Show a progress bar while model assets download on first use.
    pub show_download_progress: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_ID.to_string(),
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

impl EmbedderConfig {
    #[must_use]
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Configuration for the deterministic hashed backend.
    #[must_use]
    pub fn hashed() -> Self {
        Self::for_model(HASHED_MODEL_ID)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ModelId(String);

impl ModelId {
    fn from_raw(raw: &str) -> Self {
        let name = raw.trim().to_ascii_lowercase();
        let normalized = match name.as_str() {
            "sentence-transformers/all-minilm-l6-v2" | "all-minilm-l6-v2" | "minilm" => {
                DEFAULT_MODEL_ID
            }
            "baai/bge-small-en-v1.5" | "bge-small-en-v1.5" | "bge-small" => "bge-small-en-v1.5",
            "hashed" | "stub" => HASHED_MODEL_ID,
            other => other,
        };
        Self(normalized.to_string())
    }

    fn spec(&self) -> Result<ModelSpec> {
        let spec = match self.0.as_str() {
            DEFAULT_MODEL_ID => ModelSpec {
                backend: BackendKind::Fastembed(FastembedModel::AllMiniLML6V2),
                dimension: 384,
                query_prefix: None,
            },
            "bge-small-en-v1.5" => ModelSpec {
                backend: BackendKind::Fastembed(FastembedModel::BGESmallENV15),
                dimension: 384,
                query_prefix: Some(BGE_QUERY_PREFIX),
            },
            HASHED_MODEL_ID => ModelSpec {
                backend: BackendKind::Hashed,
                dimension: HASHED_DIMENSION,
                query_prefix: None,
            },
            other => {
                return Err(VectorStoreError::ModelLoad(format!(
                    "Unknown embedding model id '{other}'. \
                     Available: {DEFAULT_MODEL_ID}, bge-small-en-v1.5, {HASHED_MODEL_ID}"
                )))
            }
        };
        Ok(spec)
    }
}

impl Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct ModelSpec {
    backend: BackendKind,
    dimension: usize,
    query_prefix: Option<&'static str>,
}

enum BackendKind {
    Fastembed(FastembedModel),
    Hashed,
}

struct FastembedBackend {
    // fastembed sessions are not shared across threads without a lock.
    model: Mutex<TextEmbedding>,
}

impl FastembedBackend {
    fn embed_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut vectors = self
            .model
            .lock()
            .map_err(|_| VectorStoreError::Embedding("Failed to lock embedding session".into()))?
            .embed(texts, None)
            .map_err(|e| VectorStoreError::Embedding(format!("Batch embedding failed: {e}")))?;
        for vector in &mut vectors {
            normalize(vector);
        }
        Ok(vectors)
    }
}

#[derive(Clone)]
struct HashedBackend {
    dimension: usize,
    batch_calls: Arc<AtomicUsize>,
}

impl HashedBackend {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            batch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        self.batch_calls.fetch_add(1, Ordering::Relaxed);
        texts
            .iter()
            .map(|text| hashed_embedding(text, self.dimension))
            .collect()
    }

    fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::Relaxed)
    }
}

/// Sentence embedder shared by the index build and query paths, so chunk and
/// query vectors live in one embedding space.
///
/// Construct it once near the entry point and pass it down; loading is the
/// expensive step (the fastembed backends download model assets on first
/// use).
pub struct Embedder {
    backend: EmbedderBackend,
    id: ModelId,
    dimension: usize,
    query_prefix: Option<&'static str>,
}

enum EmbedderBackend {
    Fastembed(Arc<FastembedBackend>),
    Hashed(HashedBackend),
}

// Manual impl: fastembed's `TextEmbedding` session is not `Debug`.
impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("query_prefix", &self.query_prefix)
            .finish_non_exhaustive()
    }
}

impl Embedder {
    /// Initialize the configured model. Failure here is fatal for retrieval:
    /// there is no degraded embedding mode.
    pub fn load(config: &EmbedderConfig) -> Result<Self> {
        let id = ModelId::from_raw(&config.model);
        let spec = id.spec()?;

        let backend = match spec.backend {
            BackendKind::Hashed => EmbedderBackend::Hashed(HashedBackend::new(spec.dimension)),
            BackendKind::Fastembed(model) => {
                let mut options = InitOptions::new(model)
                    .with_show_download_progress(config.show_download_progress);
                if let Some(dir) = &config.cache_dir {
                    options = options.with_cache_dir(dir.clone());
                }
                let session = TextEmbedding::try_new(options).map_err(|e| {
                    VectorStoreError::ModelLoad(format!(
                        "Embedding model '{id}' failed to initialize: {e}"
                    ))
                })?;
                log::info!("Loaded embedding model '{}' (dim {})", id, spec.dimension);
                EmbedderBackend::Fastembed(Arc::new(FastembedBackend {
                    model: Mutex::new(session),
                }))
            }
        };

        Ok(Self {
            backend,
            id,
            dimension: spec.dimension,
            query_prefix: spec.query_prefix,
        })
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.id.0
    }

    /// Batch-embed chunk texts in a single backend call, one vector per
    /// input, order preserved.
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let expected = texts.len();
        let vectors = match &self.backend {
            EmbedderBackend::Hashed(hashed) => hashed.embed_batch(&texts),
            EmbedderBackend::Fastembed(backend) => {
                let backend = backend.clone();
                spawn_blocking(move || backend.embed_blocking(texts))
                    .await
                    .map_err(|e| VectorStoreError::Embedding(format!("Join error: {e}")))??
            }
        };

        if vectors.len() != expected {
            return Err(VectorStoreError::Embedding(format!(
                "Backend returned {} vectors for {expected} inputs",
                vectors.len()
            )));
        }
        for vector in &vectors {
            ensure_dimension(vector, self.dimension)?;
        }
        Ok(vectors)
    }

    /// Embed a single query with the same model as the chunks. Models that
    /// want an instruction prefix on queries get it here.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let prepared = match self.query_prefix {
            Some(prefix) => format!("{prefix}{text}"),
            None => text.to_string(),
        };
        let mut vectors = self.embed(vec![prepared]).await?;
        vectors
            .pop()
            .ok_or_else(|| VectorStoreError::Embedding("Empty embedding result".to_string()))
    }

    /// Number of batch calls the hashed backend has served. `None` for real
    /// models; used by tests asserting batch behavior.
    #[must_use]
    pub fn hashed_batch_calls(&self) -> Option<usize> {
        match &self.backend {
            EmbedderBackend::Hashed(hashed) => Some(hashed.batch_calls()),
            EmbedderBackend::Fastembed(_) => None,
        }
    }
}

fn ensure_dimension(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(VectorStoreError::InvalidDimension {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

/// Feature-hash embedding: each token contributes a deterministic
/// pseudo-random unit vector, summed and normalized. Queries and chunks that
/// share tokens land close together, which is all the tests need.
fn hashed_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut sum = vec![0.0f32; dimension];
    if tokens.is_empty() {
        accumulate_token(&mut sum, &lowered, dimension);
    } else {
        for token in tokens {
            accumulate_token(&mut sum, token, dimension);
        }
    }
    normalize(&mut sum);
    sum
}

fn accumulate_token(sum: &mut [f32], token: &str, dimension: usize) {
    let mut state =
        fnv1a_64(token.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for slot in sum.iter_mut() {
        let bits = splitmix64(&mut state);
        // Top 23 bits become a float in [1.0, 2.0); shift to [-1.0, 1.0).
        let mantissa = (bits >> 41) as u32;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        *slot += unit * 2.0 - 1.0;
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

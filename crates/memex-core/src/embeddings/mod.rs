//! Embedding Provider (spec §4.2)
//!
//! Local embedding generation via fastembed (ONNX-based, nomic-embed-text-v1.5,
//! Matryoshka-truncated to 256 dimensions). No external API calls required.
//!
//! [`contextualize`] builds the header text prepended to a chunk's body
//! before embedding — the embedding provider always embeds
//! `contextualize(memory)`, never raw content, so a bare "returns true"
//! chunk still embeds near other error-handling content from the same file.

mod cache;
mod local;

pub use cache::EmbeddingCache;
pub use local::{
    cosine_similarity, dot_product, euclidean_distance, matryoshka_truncate, Embedding,
    EmbeddingError, EmbeddingService, BATCH_SIZE, EMBEDDING_DIMENSIONS, MAX_TEXT_LENGTH,
};

use crate::memory::Memory;

/// Build the text actually handed to the embedding model: a short header
/// (kind, primary file, tags) followed by the memory's content. Keeps two
/// memories with near-identical bodies but different kinds/files from
/// collapsing onto the same point in embedding space.
pub fn contextualize(memory: &Memory) -> String {
    let mut header = format!("[{}]", memory.kind);
    if let Some(file) = memory.primary_file() {
        header.push_str(&format!(" {file}"));
    }
    if !memory.tags.is_empty() {
        header.push_str(&format!(" ({})", memory.tags.join(", ")));
    }
    format!("{header}\n{}", memory.content)
}
